use std::fmt::Write;

use rust_i18n::t;

use crate::lesson::curriculum::{CurriculumEntry, LessonStatus};
use crate::session::controller::{PairSide, SessionController};
use crate::session::drill::{Drill, DrillKind, OptionSet, PairingSet, ScrambleBag};
use crate::session::result::{LessonSummary, Verdict};
use crate::store::schema::ProgressRecord;

const BAR_WIDTH: usize = 20;

pub fn progress_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Text view of the current drill, its answer state and, once checked, the
/// feedback footer.
pub fn render_drill(session: &SessionController) -> String {
    let mut out = String::new();
    let Ok(drill) = session.current() else {
        return t!("drill.finished").into_owned();
    };

    let _ = writeln!(
        out,
        "{} {}/{}  {}",
        progress_bar(session.progress()),
        session.index() + 1,
        session.len(),
        kind_label(&drill.kind)
    );
    out.push('\n');

    match &drill.kind {
        DrillKind::Intro => render_intro(&mut out, drill),
        DrillKind::Pairing(set) => render_pairing(&mut out, session, set),
        DrillKind::Scramble(bag) => render_scramble(&mut out, session, drill, bag),
        DrillKind::Choice(set) => {
            let _ = writeln!(out, "{}", t!("drill.choice_prompt"));
            let _ = writeln!(out, "  {}\n", drill.text.target.as_deref().unwrap_or(""));
            render_options(&mut out, session, set);
        }
        DrillKind::Quiz(set) => {
            let _ = writeln!(out, "{}\n", drill.text.target.as_deref().unwrap_or(""));
            render_options(&mut out, session, set);
        }
        DrillKind::Challenge => {
            let _ = writeln!(out, "🏆 {}", t!("drill.challenge_title"));
            let _ = writeln!(out, "  {}", drill.text.explanation.as_deref().unwrap_or(""));
        }
    }

    out.push('\n');
    match session.verdict() {
        Verdict::Unknown => {
            let _ = writeln!(out, "{}", hints(&drill.kind));
        }
        verdict => render_feedback(&mut out, drill, verdict),
    }
    out
}

fn kind_label(kind: &DrillKind) -> String {
    match kind {
        DrillKind::Intro => t!("kind.intro"),
        DrillKind::Pairing(_) => t!("kind.pairing"),
        DrillKind::Scramble(_) => t!("kind.scramble"),
        DrillKind::Choice(_) => t!("kind.choice"),
        DrillKind::Quiz(_) => t!("kind.quiz"),
        DrillKind::Challenge => t!("kind.challenge"),
    }
    .into_owned()
}

fn status_label(status: LessonStatus) -> String {
    match status {
        LessonStatus::Locked => t!("status.locked"),
        LessonStatus::Available => t!("status.available"),
        LessonStatus::Completed => t!("status.completed"),
    }
    .into_owned()
}

fn render_intro(out: &mut String, drill: &Drill) {
    let text = &drill.text;
    match (&text.speaker, &text.target) {
        (Some(speaker), Some(target)) => {
            let _ = writeln!(out, "  {speaker}: {target}");
        }
        (None, Some(target)) => {
            let _ = writeln!(out, "  {target}");
        }
        _ => {}
    }
    if let Some(native) = &text.native {
        let _ = writeln!(out, "  {native}");
    }
    if let Some(explanation) = &text.explanation {
        let _ = writeln!(out, "\n💡 {explanation}");
    }
}

fn render_pairing(out: &mut String, session: &SessionController, set: &PairingSet) {
    let _ = writeln!(out, "{}", t!("drill.pairing_prompt"));
    let (pending_target, pending_native) = session.pending_pair();
    let natives = set.natives_sorted();
    for (i, pair) in set.pairs.iter().enumerate() {
        let left = pair_cell(
            &pair.target,
            session.is_pair_key_matched(PairSide::Target, &pair.target),
            pending_target == Some(pair.target.as_str()),
        );
        let right = natives
            .get(i)
            .map(|native| {
                pair_cell(
                    native,
                    session.is_pair_key_matched(PairSide::Native, native),
                    pending_native == Some(*native),
                )
            })
            .unwrap_or_default();
        let _ = writeln!(out, "  {}. {left:<24} {}. {right}", i + 1, i + 1);
    }
    let _ = writeln!(
        out,
        "\n  {}",
        t!("drill.pairing_count", matched = session.matched_count(), total = set.pairs.len())
    );
}

fn pair_cell(label: &str, matched: bool, pending: bool) -> String {
    if matched {
        format!("✓ {label}")
    } else if pending {
        format!("[{label}]")
    } else {
        label.to_string()
    }
}

fn render_scramble(out: &mut String, session: &SessionController, drill: &Drill, bag: &ScrambleBag) {
    let _ = writeln!(out, "{}", t!("drill.scramble_prompt"));
    if let Some(native) = &drill.text.native {
        let _ = writeln!(out, "  {native}\n");
    }
    let _ = writeln!(out, "  > {}", session.placed_tokens().join(" "));
    out.push('\n');
    let cells: Vec<String> = bag
        .tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            if session.is_token_used(i) {
                format!("{}. ___", i + 1)
            } else {
                format!("{}. {token}", i + 1)
            }
        })
        .collect();
    let _ = writeln!(out, "  {}", cells.join("   "));
}

fn render_options(out: &mut String, session: &SessionController, set: &OptionSet) {
    let selected = session.selected_option();
    for (i, option) in set.options.iter().enumerate() {
        let marker = if selected == Some(i) { ">" } else { " " };
        let _ = writeln!(out, " {marker} {}. {option}", i + 1);
    }
}

fn render_feedback(out: &mut String, drill: &Drill, verdict: Verdict) {
    if verdict == Verdict::Correct {
        let _ = writeln!(out, "✅ {}", t!("feedback.correct"));
    } else {
        let _ = writeln!(out, "❌ {}", t!("feedback.incorrect"));
        if let Some(answer) = drill.kind.correct_answer() {
            let _ = writeln!(out, "   {}", t!("feedback.answer_was", answer = answer));
        }
    }
    if let (DrillKind::Quiz(_), Some(explanation)) = (&drill.kind, &drill.text.explanation) {
        let _ = writeln!(out, "   💡 {explanation}");
    }
    let _ = writeln!(out, "{}", t!("hint.continue"));
}

fn hints(kind: &DrillKind) -> String {
    match kind {
        DrillKind::Intro | DrillKind::Challenge => t!("hint.continue").into_owned(),
        DrillKind::Pairing(_) => t!("hint.pairing").into_owned(),
        DrillKind::Scramble(_) => t!("hint.scramble").into_owned(),
        DrillKind::Choice(_) | DrillKind::Quiz(_) => t!("hint.select").into_owned(),
    }
}

pub fn render_summary(summary: &LessonSummary, record: &ProgressRecord, gems: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🏆 {}", t!("summary.title"));
    let _ = writeln!(
        out,
        "  {}",
        t!(
            "summary.accuracy",
            correct = summary.correct,
            checked = summary.checked,
            percent = format!("{:.0}", summary.accuracy)
        )
    );
    let _ = writeln!(out, "  🔥 {}", t!("summary.streak", days = record.streak));
    let _ = writeln!(out, "  💎 {gems}");
    out
}

pub fn render_curriculum(
    entries: &[(&CurriculumEntry, LessonStatus)],
    record: &ProgressRecord,
    gems: u32,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🔥 {}   💎 {gems}\n",
        t!("summary.streak", days = record.streak)
    );
    for (entry, status) in entries {
        let mark = match status {
            LessonStatus::Completed => "⭐",
            LessonStatus::Available => entry.icon,
            LessonStatus::Locked => "🔒",
        };
        let _ = writeln!(
            out,
            "  {mark} {:>2}. {} ({})  {}",
            entry.id,
            entry.title,
            entry.native_title,
            status_label(*status)
        );
    }
    out
}
