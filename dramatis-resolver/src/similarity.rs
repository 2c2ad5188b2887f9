//! Similarity scoring between structured names.
//!
//! Each field present in *both* names contributes one component to the
//! score. A title or suffix present on only one side contributes a 0
//! component; a first, middle, or last name present on only one side is
//! skipped. The final score is the mean of the collected components, or
//! 0 when none were collected.
//!
//! First/last names use Jaro-Winkler, which tolerates transpositions
//! and favors shared prefixes. Title and suffix are exact-match 0/1.
//! Phonetic matching uses the Metaphone encoding.

use rphonetic::{Encoder, Metaphone};
use strsim::jaro_winkler;

use crate::name::StructuredName;

/// Fixed bonus callers may add to the similarity score on a phonetic
/// match, capped at 1.0.
pub const PHONETIC_BONUS: f64 = 0.1;

impl StructuredName {
    /// Continuous similarity between two names, in [0, 1].
    pub fn similarity(&self, other: &StructuredName) -> f64 {
        let mut scores = Vec::new();

        match (&self.title, &other.title) {
            (None, None) => {}
            (Some(a), Some(b)) => scores.push(if a == b { 1.0 } else { 0.0 }),
            _ => scores.push(0.0),
        }

        match (&self.suffix, &other.suffix) {
            (None, None) => {}
            (Some(a), Some(b)) => scores.push(if a == b { 1.0 } else { 0.0 }),
            _ => scores.push(0.0),
        }

        if let (Some(a), Some(b)) = (&self.first, &other.first) {
            scores.push(jaro_winkler(a, b));
        }

        if let (Some(a), Some(b)) = (&self.last, &other.last) {
            scores.push(jaro_winkler(a, b));
        }

        if let (Some(a), Some(b)) = (&self.middle, &other.middle) {
            let pairs: Vec<f64> = a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| jaro_winkler(x, y))
                .collect();
            if !pairs.is_empty() {
                scores.push(pairs.iter().sum::<f64>() / pairs.len() as f64);
            }
        }

        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }

    /// Whether the two names sound alike: true when the Metaphone
    /// encodings of the first names match, or those of the last names
    /// match. Each comparison requires the field on both sides.
    pub fn phonetic_match(&self, other: &StructuredName) -> bool {
        let metaphone = Metaphone::default();

        if let (Some(a), Some(b)) = (&self.first, &other.first) {
            if metaphone.encode(a) == metaphone.encode(b) {
                return true;
            }
        }

        if let (Some(a), Some(b)) = (&self.last, &other.last) {
            if metaphone.encode(a) == metaphone.encode(b) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> StructuredName {
        StructuredName::parse(raw).unwrap()
    }

    #[test]
    fn test_identical_names_score_one() {
        let a = parse("Jerry Seinfeld");
        let b = parse("Jerry Seinfeld");
        assert_eq!(a.similarity(&b), 1.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = parse("Jerry Seinfeld");
        let b = parse("Jery Seinfeld");
        assert_eq!(a.similarity(&b), b.similarity(&a));
    }

    #[test]
    fn test_close_misspelling_scores_high() {
        let a = parse("Jery Seinfeld");
        let b = parse("Jerry Seinfeld");
        assert!(a.similarity(&b) > 0.9);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let a = parse("Jerry Seinfeld");
        let b = parse("Newman");
        assert!(a.similarity(&b) < 0.6);
    }

    #[test]
    fn test_one_sided_field_penalizes() {
        // Same first name, but only one side carries a title.
        let with_title = parse("Dr. John Smith");
        let without = parse("John Smith");
        let both = parse("John Smith");
        assert!(with_title.similarity(&without) < both.similarity(&without));
    }

    #[test]
    fn test_mismatched_suffix_penalizes() {
        let jr = parse("John Smith Jr.");
        let sr = parse("John Smith Sr.");
        let same = parse("John Smith Jr.");
        assert!(jr.similarity(&sr) < jr.similarity(&same));
        assert_eq!(jr.similarity(&same), 1.0);
    }

    #[test]
    fn test_phonetic_match() {
        let a = parse("Jon Smith");
        let b = parse("John Smyth");
        assert!(a.phonetic_match(&b));

        let c = parse("Elaine Benes");
        assert!(!a.phonetic_match(&c));
    }

    #[test]
    fn test_phonetic_match_requires_both_sides() {
        let single = parse("Smith");
        let full = parse("John Smith");
        // `single` has no last name, so only first names are compared.
        assert!(!full.phonetic_match(&parse("Benes")));
        // "smith" (first) vs "john" (first) do not match phonetically.
        assert!(!single.phonetic_match(&full));
    }
}
