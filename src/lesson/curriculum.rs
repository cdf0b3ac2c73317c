/// One stop on the learning path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurriculumEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub native_title: &'static str,
    pub icon: &'static str,
}

pub const CURRICULUM: &[CurriculumEntry] = &[
    CurriculumEntry {
        id: "1",
        title: "Saudações",
        native_title: "基础问候",
        icon: "👋",
    },
    CurriculumEntry {
        id: "2",
        title: "No Café",
        native_title: "在咖啡馆点餐",
        icon: "☕",
    },
    CurriculumEntry {
        id: "3",
        title: "O Comboio",
        native_title: "交通工具 (欧葡称谓)",
        icon: "🚆",
    },
    CurriculumEntry {
        id: "4",
        title: "O Telemóvel",
        native_title: "手机与数字",
        icon: "📱",
    },
    CurriculumEntry {
        id: "5",
        title: "Supermercado",
        native_title: "超市购物",
        icon: "🛒",
    },
    CurriculumEntry {
        id: "6",
        title: "A Morada",
        native_title: "问路与地址",
        icon: "📍",
    },
    CurriculumEntry {
        id: "7",
        title: "Certificado",
        native_title: "第一阶段通关复习",
        icon: "🎓",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonStatus {
    Locked,
    Available,
    Completed,
}

impl LessonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LessonStatus::Locked => "locked",
            LessonStatus::Available => "available",
            LessonStatus::Completed => "completed",
        }
    }
}

impl CurriculumEntry {
    /// Topic line handed to the lesson generator.
    pub fn topic(&self) -> String {
        format!("第 {} 天课程: {} ({})", self.id, self.title, self.native_title)
    }
}

pub fn find(id: &str) -> Option<&'static CurriculumEntry> {
    CURRICULUM.iter().find(|e| e.id == id)
}

pub fn next_after(id: &str) -> Option<&'static CurriculumEntry> {
    let idx = CURRICULUM.iter().position(|e| e.id == id)?;
    CURRICULUM.get(idx + 1)
}

/// Status of every curriculum entry given the ids completed so far.
/// An entry unlocks once its predecessor is completed.
pub fn statuses(completed: &[String]) -> Vec<(&'static CurriculumEntry, LessonStatus)> {
    let done = |id: &str| completed.iter().any(|c| c == id);
    CURRICULUM
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let status = if done(entry.id) {
                LessonStatus::Completed
            } else if i > 0 && !done(CURRICULUM[i - 1].id) {
                LessonStatus::Locked
            } else {
                LessonStatus::Available
            };
            (entry, status)
        })
        .collect()
}

pub fn status_of(id: &str, completed: &[String]) -> Option<LessonStatus> {
    statuses(completed)
        .into_iter()
        .find(|(e, _)| e.id == id)
        .map(|(_, s)| s)
}
