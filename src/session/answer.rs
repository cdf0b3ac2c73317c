use icu_normalizer::ComposingNormalizerBorrowed;

/// Punctuation ignored when comparing assembled sentences.
const IGNORED_PUNCTUATION: [char; 4] = ['.', '?', '!', ','];

/// Canonical form of a sentence for scramble comparison: NFC, without
/// `. ? ! ,`, single-spaced and trimmed. Case is preserved.
pub fn normalize_sentence(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    let composed = nfc.normalize(text);
    let stripped: String = composed
        .chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn sentences_match(submitted: &str, expected: &str) -> bool {
    normalize_sentence(submitted) == normalize_sentence(expected)
}

pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_tokens_are_ignored() {
        let submitted = join_tokens(&["Olá", ",", "como", "está", "?"]);
        assert_eq!(submitted, "Olá , como está ?");
        assert!(sentences_match(&submitted, "Olá, como está?"));
    }

    #[test]
    fn attached_punctuation_is_ignored() {
        assert!(sentences_match("Olá! Como está?", "Olá Como está"));
    }

    #[test]
    fn word_order_matters() {
        assert!(!sentences_match("está Como Olá", "Olá! Como está?"));
    }

    #[test]
    fn case_is_significant() {
        assert!(!sentences_match("olá como está", "Olá, como está?"));
    }

    #[test]
    fn decomposed_accents_match_composed() {
        let decomposed = "Olá e\u{301}"; // "é" as e + combining acute
        assert!(sentences_match(decomposed, "Olá é"));
    }

    #[test]
    fn other_punctuation_is_kept() {
        assert_eq!(normalize_sentence("Estou a comer."), "Estou a comer");
        assert_eq!(normalize_sentence("'Tu' ou 'Você'"), "'Tu' ou 'Você'");
    }
}
