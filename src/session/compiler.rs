use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::DrillError;
use crate::lesson::{Lesson, VocabularyItem};
use crate::session::drill::{
    Drill, DrillKind, DrillQueue, DrillText, OptionSet, Pair, PairingSet, ScrambleBag,
};

const PAIRING_SIZE: usize = 4;
const CHOICE_DISTRACTORS: usize = 2;

/// Expand a lesson into its drill queue.
///
/// Order is fixed: situation intro, vocabulary pairing, an intro + scramble for
/// every dialogue line, a choice for every vocabulary item, the grammar intro,
/// every quiz question, and the closing challenge. The only nondeterminism is
/// option and token order, drawn from `rng`.
pub fn compile<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Result<DrillQueue, DrillError> {
    lesson.validate()?;

    let mut queue = Vec::with_capacity(
        5 + 2 * lesson.dialogue.len() + lesson.vocabulary.len() + lesson.quiz.len(),
    );

    queue.push(Drill::new(
        DrillKind::Intro,
        DrillText {
            explanation: Some(lesson.situation.clone()),
            ..DrillText::default()
        },
    ));

    queue.push(Drill::new(
        DrillKind::Pairing(pairing_set(&lesson.vocabulary)),
        DrillText::default(),
    ));

    for line in &lesson.dialogue {
        let text = DrillText {
            target: Some(line.text.clone()),
            native: Some(line.translation.clone()),
            explanation: None,
            speaker: Some(line.speaker.clone()),
        };
        queue.push(Drill::new(DrillKind::Intro, text.clone()));

        let mut tokens: Vec<String> = line.tokens().into_iter().map(str::to_string).collect();
        tokens.shuffle(rng);
        queue.push(Drill::new(
            DrillKind::Scramble(ScrambleBag {
                answer: line.text.clone(),
                tokens,
            }),
            DrillText {
                speaker: None,
                ..text
            },
        ));
    }

    for (i, item) in lesson.vocabulary.iter().enumerate() {
        let mut options = vec![item.native.clone()];
        for other in lesson
            .vocabulary
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, v)| &v.native)
        {
            if options.len() > CHOICE_DISTRACTORS {
                break;
            }
            if !options.contains(other) {
                options.push(other.clone());
            }
        }
        options.shuffle(rng);
        queue.push(Drill::new(
            DrillKind::Choice(OptionSet {
                answer: item.native.clone(),
                options,
            }),
            DrillText {
                target: Some(item.target.clone()),
                native: Some(item.native.clone()),
                explanation: item.pronunciation.clone(),
                speaker: None,
            },
        ));
    }

    queue.push(Drill::new(
        DrillKind::Intro,
        DrillText {
            target: Some(lesson.grammar.point.clone()),
            native: Some(lesson.grammar.example.clone()),
            explanation: Some(lesson.grammar.explanation.clone()),
            speaker: None,
        },
    ));

    for q in &lesson.quiz {
        // validate() guarantees the index is in range
        let answer = q.options[q.correct_index].clone();
        queue.push(Drill::new(
            DrillKind::Quiz(OptionSet {
                answer,
                options: q.options.clone(),
            }),
            DrillText {
                target: Some(q.question.clone()),
                explanation: Some(q.explanation.clone()),
                ..DrillText::default()
            },
        ));
    }

    queue.push(Drill::new(
        DrillKind::Challenge,
        DrillText {
            explanation: Some(lesson.challenge.clone()),
            ..DrillText::default()
        },
    ));

    debug!(
        lesson = %lesson.id,
        drills = queue.len(),
        "compiled drill queue"
    );
    Ok(DrillQueue::new(lesson.id.clone(), queue))
}

/// Expected queue length for a lesson of the given shape.
pub fn expected_len(dialogue: usize, vocabulary: usize, quiz: usize) -> usize {
    1 + 1 + 2 * dialogue + vocabulary + 1 + quiz + 1
}

/// First vocabulary items with unseen target and native, up to `PAIRING_SIZE`.
fn pairing_set(vocabulary: &[VocabularyItem]) -> PairingSet {
    let mut set = PairingSet { pairs: Vec::new() };
    for item in vocabulary.iter().take(PAIRING_SIZE) {
        if set.contains_target(&item.target) || set.contains_native(&item.native) {
            continue;
        }
        set.pairs.push(Pair {
            target: item.target.clone(),
            native: item.native.clone(),
        });
    }
    set
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::lesson::fixtures::{greeting_lesson, line, vocab};

    fn compile_seeded(lesson: &Lesson, seed: u64) -> DrillQueue {
        let mut rng = SmallRng::seed_from_u64(seed);
        compile(lesson, &mut rng).unwrap()
    }

    #[test]
    fn queue_length_follows_lesson_shape() {
        let lesson = greeting_lesson();
        let queue = compile_seeded(&lesson, 42);
        assert_eq!(queue.len(), expected_len(1, 4, 1));
        assert_eq!(queue.len(), 11);
        assert_eq!(queue.lesson_id(), "t1");
    }

    #[test]
    fn section_order_is_fixed() {
        let queue = compile_seeded(&greeting_lesson(), 1);
        let kinds: Vec<&str> = queue.iter().map(|d| d.kind.name()).collect();
        assert_eq!(
            kinds,
            vec![
                "intro", "pairing", "intro", "scramble", "choice", "choice", "choice", "choice",
                "intro", "quiz", "challenge"
            ]
        );
        let counts = queue.kind_counts();
        assert_eq!(counts["intro"], 3);
        assert_eq!(counts["choice"], 4);
        assert_eq!(counts.values().sum::<usize>(), queue.len());
        let grammar = queue.get(8).unwrap();
        assert_eq!(grammar.text.target.as_deref(), Some("Tu 与 Você"));
        assert_eq!(grammar.text.native.as_deref(), Some("Estou a comer."));
    }

    #[test]
    fn every_option_set_holds_its_answer_once() {
        for seed in 0..50 {
            let queue = compile_seeded(&greeting_lesson(), seed);
            for drill in queue.iter() {
                if let DrillKind::Choice(set) | DrillKind::Quiz(set) = &drill.kind {
                    let hits = set.options.iter().filter(|o| **o == set.answer).count();
                    assert_eq!(hits, 1, "seed {seed}: {set:?}");
                }
            }
        }
    }

    #[test]
    fn choice_distractors_are_distinct_other_glosses() {
        let mut lesson = greeting_lesson();
        lesson.vocabulary.push(vocab("Olá!", "你好"));
        let queue = compile_seeded(&lesson, 7);
        for drill in queue.iter() {
            if let DrillKind::Choice(set) = &drill.kind {
                assert!(set.options.len() <= 3);
                let mut sorted = set.options.clone();
                sorted.sort();
                sorted.dedup();
                assert_eq!(sorted.len(), set.options.len(), "duplicate option in {set:?}");
            }
        }
    }

    #[test]
    fn single_vocabulary_item_has_no_distractors() {
        let mut lesson = greeting_lesson();
        lesson.vocabulary.truncate(1);
        let queue = compile_seeded(&lesson, 3);
        let choice = queue
            .iter()
            .find_map(|d| match &d.kind {
                DrillKind::Choice(set) => Some(set.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(choice.options, vec!["你好".to_string()]);
    }

    #[test]
    fn scramble_bag_is_permutation_of_answer() {
        let mut lesson = greeting_lesson();
        lesson.dialogue.push(line("Tu", "não não sei bem", "我不太知道"));
        for seed in 0..20 {
            let queue = compile_seeded(&lesson, seed);
            for drill in queue.iter() {
                if let DrillKind::Scramble(bag) = &drill.kind {
                    let mut expected: Vec<&str> = bag.answer.split_whitespace().collect();
                    let mut got: Vec<&str> = bag.tokens.iter().map(String::as_str).collect();
                    let rebuilt: Vec<&str> = bag
                        .solution_positions()
                        .into_iter()
                        .map(|p| bag.tokens[p].as_str())
                        .collect();
                    assert_eq!(rebuilt.join(" "), bag.answer);
                    expected.sort_unstable();
                    got.sort_unstable();
                    assert_eq!(expected, got);
                }
            }
        }
    }

    #[test]
    fn pairing_takes_first_four_unique_items() {
        let mut lesson = greeting_lesson();
        lesson.vocabulary.insert(1, vocab("Olá", "哈喽"));
        lesson.vocabulary.push(vocab("Tu", "你"));
        let queue = compile_seeded(&lesson, 0);
        let DrillKind::Pairing(set) = &queue.get(1).unwrap().kind else {
            panic!("second drill must be pairing");
        };
        let targets: Vec<&str> = set.pairs.iter().map(|p| p.target.as_str()).collect();
        assert_eq!(targets, vec!["Olá", "Obrigado", "Adeus"]);
    }

    #[test]
    fn empty_vocabulary_gives_empty_pairing() {
        let mut lesson = greeting_lesson();
        lesson.vocabulary.clear();
        let queue = compile_seeded(&lesson, 0);
        assert_eq!(queue.len(), expected_len(1, 0, 1));
        assert!(matches!(&queue.get(1).unwrap().kind, DrillKind::Pairing(s) if s.pairs.is_empty()));
    }

    #[test]
    fn quiz_keeps_declared_option_order() {
        let queue = compile_seeded(&greeting_lesson(), 9);
        let DrillKind::Quiz(set) = &queue.get(9).unwrap().kind else {
            panic!("expected quiz");
        };
        assert_eq!(set.options, vec!["Suco".to_string(), "Sumo".to_string()]);
        assert_eq!(set.answer, "Sumo");
    }

    #[test]
    fn same_seed_same_queue() {
        let lesson = greeting_lesson();
        assert_eq!(compile_seeded(&lesson, 5), compile_seeded(&lesson, 5));
    }

    #[test]
    fn malformed_lesson_is_rejected() {
        let mut lesson = greeting_lesson();
        lesson.quiz[0].correct_index = 10;
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            compile(&lesson, &mut rng),
            Err(DrillError::MalformedLesson(_))
        ));
    }

    #[test]
    fn quiz_answer_listed_twice_never_compiles() {
        let mut lesson = greeting_lesson();
        lesson.quiz[0].options = vec!["Sumo".to_string(), "Suco".to_string(), "Sumo".to_string()];
        lesson.quiz[0].correct_index = 0;
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            compile(&lesson, &mut rng),
            Err(DrillError::MalformedLesson(_))
        ));
    }
}
