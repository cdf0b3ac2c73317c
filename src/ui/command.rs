use crate::session::drill::DrillKind;

/// One line of learner input, resolved against the current drill kind.
/// Indices are zero-based; the learner types them one-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Select(usize),
    Place(usize),
    Retract(usize),
    PairTarget(usize),
    PairNative(usize),
    Check,
    /// Enter on an empty line: check if the drill still needs it, else move on.
    Continue,
    Speak,
    Quit,
    Unknown,
}

pub fn parse(line: &str, kind: &DrillKind) -> Command {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("");
    let arg = words.next();
    if words.next().is_some() {
        return Command::Unknown;
    }

    match (head, arg) {
        ("", None) => Command::Continue,
        ("c" | "check" | "检查", None) => Command::Check,
        ("n" | "next" | "继续", None) => Command::Continue,
        ("s" | "speak" | "听", None) => Command::Speak,
        ("q" | "quit" | "退出", None) => Command::Quit,
        ("r" | "retract", Some(n)) if matches!(kind, DrillKind::Scramble(_)) => {
            one_based(n).map_or(Command::Unknown, Command::Retract)
        }
        ("p", Some(n)) if matches!(kind, DrillKind::Pairing(_)) => {
            one_based(n).map_or(Command::Unknown, Command::PairTarget)
        }
        ("z", Some(n)) if matches!(kind, DrillKind::Pairing(_)) => {
            one_based(n).map_or(Command::Unknown, Command::PairNative)
        }
        (n, None) => match (one_based(n), kind) {
            (Some(i), DrillKind::Choice(_) | DrillKind::Quiz(_)) => Command::Select(i),
            (Some(i), DrillKind::Scramble(_)) => Command::Place(i),
            _ => Command::Unknown,
        },
        _ => Command::Unknown,
    }
}

fn one_based(text: &str) -> Option<usize> {
    text.parse::<usize>().ok()?.checked_sub(1)
}
