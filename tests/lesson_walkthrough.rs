use rand::SeedableRng;
use rand::rngs::SmallRng;

use lusodrill::error::DrillError;
use lusodrill::lesson::Lesson;
use lusodrill::lesson::bundled::BundledLessons;
use lusodrill::session::compiler::{compile, expected_len};
use lusodrill::session::controller::{AdvanceResult, PairSide, SessionController};
use lusodrill::session::drill::{DrillKind, DrillQueue};
use lusodrill::session::result::{LessonSummary, Verdict};

const GREETING_LESSON: &str = r#"{
  "id": "e2e",
  "title": "Saudações",
  "chineseTitle": "基础问候",
  "situation": "在里斯本的街头遇到邻居。",
  "dialogue": [
    { "speaker": "Ana", "text": "Olá! Como está?", "translation": "你好！你好吗？" }
  ],
  "vocabulary": [
    { "pt": "Olá", "cn": "你好" },
    { "pt": "Obrigado", "cn": "谢谢" },
    { "pt": "Adeus", "cn": "再见" },
    { "pt": "Sumo", "cn": "果汁" }
  ],
  "grammar": {
    "point": "Tu 与 Você",
    "explanation": "欧葡日常用 Tu。",
    "example": "Tu estás bem?"
  },
  "quiz": [
    {
      "question": "“果汁”在欧葡里怎么说？",
      "options": ["Suco", "Sumo"],
      "correctIndex": 1,
      "explanation": "Suco 是巴葡用法。"
    }
  ],
  "challenge": "用葡语向邻居打招呼。"
}"#;

/// Answer the current drill correctly where an answer is needed.
fn answer_correctly(session: &mut SessionController) {
    match session.current().unwrap().kind.clone() {
        DrillKind::Pairing(set) => {
            for pair in &set.pairs {
                session
                    .submit_pairing_selection(PairSide::Target, &pair.target)
                    .unwrap();
                session
                    .submit_pairing_selection(PairSide::Native, &pair.native)
                    .unwrap();
            }
        }
        DrillKind::Scramble(bag) => {
            for pos in bag.solution_positions() {
                session.submit_token(pos).unwrap();
            }
            session.check().unwrap();
        }
        DrillKind::Choice(set) | DrillKind::Quiz(set) => {
            session.submit_selection(set.answer_index().unwrap()).unwrap();
            session.check().unwrap();
        }
        DrillKind::Intro | DrillKind::Challenge => {}
    }
}

/// Walk the whole queue, returning the summary and the number of advances.
fn walk(queue: DrillQueue) -> (LessonSummary, usize) {
    let mut session = SessionController::new(queue);
    let mut advances = 0;
    loop {
        answer_correctly(&mut session);
        advances += 1;
        match session.advance().unwrap() {
            AdvanceResult::Next(index) => assert_eq!(index, advances),
            AdvanceResult::Completed(summary) => {
                assert!(session.is_complete());
                assert_eq!(
                    session.advance().unwrap_err(),
                    DrillError::SessionAlreadyComplete
                );
                return (summary, advances);
            }
        }
    }
}

#[test]
fn greeting_lesson_compiles_to_eleven_drills() {
    let lesson = Lesson::from_json(GREETING_LESSON).unwrap();
    let mut rng = SmallRng::seed_from_u64(2026);
    let queue = compile(&lesson, &mut rng).unwrap();

    // intro, pairing, line intro + scramble, 4 choices, grammar, quiz, challenge
    assert_eq!(queue.len(), 11);
    assert_eq!(queue.len(), expected_len(1, 4, 1));
    let kinds: Vec<&str> = queue.iter().map(|d| d.kind.name()).collect();
    assert_eq!(
        kinds,
        [
            "intro",
            "pairing",
            "intro",
            "scramble",
            "choice",
            "choice",
            "choice",
            "choice",
            "intro",
            "quiz",
            "challenge"
        ]
    );
}

#[test]
fn greeting_lesson_walks_to_completion() {
    let lesson = Lesson::from_json(GREETING_LESSON).unwrap();
    let mut rng = SmallRng::seed_from_u64(7);
    let queue = compile(&lesson, &mut rng).unwrap();
    let len = queue.len();

    let (summary, advances) = walk(queue);
    assert_eq!(advances, len);
    assert_eq!(summary.lesson_id, "e2e");
    assert_eq!(summary.total_drills, len);
    // pairing, scramble, 4 choices, quiz
    assert_eq!(summary.checked, 7);
    assert_eq!(summary.correct, summary.checked);
}

#[test]
fn bundled_first_lesson_walks_to_completion() {
    let lesson = BundledLessons::get("1").unwrap().unwrap();
    let mut rng = SmallRng::seed_from_u64(99);
    let queue = compile(&lesson, &mut rng).unwrap();
    assert_eq!(queue.len(), 17);

    let (summary, advances) = walk(queue);
    assert_eq!(advances, 17);
    assert_eq!(summary.correct, summary.checked);
}

#[test]
fn scramble_tokens_keep_attached_punctuation() {
    let lesson = Lesson::from_json(GREETING_LESSON).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut session = SessionController::new(compile(&lesson, &mut rng).unwrap());
    while session.current().unwrap().kind.name() != "scramble" {
        answer_correctly(&mut session);
        session.advance().unwrap();
    }
    let DrillKind::Scramble(bag) = session.current().unwrap().kind.clone() else {
        unreachable!()
    };
    for pos in bag.solution_positions() {
        session.submit_token(pos).unwrap();
    }
    assert_eq!(session.placed_tokens(), ["Olá!", "Como", "está?"]);
    assert_eq!(session.check().unwrap(), Verdict::Correct);
}
