//! Structured name parsing.
//!
//! [`StructuredName::parse`] deterministically normalizes a raw mention
//! into title/first/middle/last/suffix parts. The same input always
//! yields the same output, which makes results memoizable upstream.
//!
//! Role tagging is a closed-wordlist heuristic: a token counts as
//! noun-like unless it appears in the fixed function-word list below.

/// Honorifics stripped from the front of a name (optional period).
pub const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "rev", "fr", "sgt", "capt", "lt", "col", "gen",
    "officer", "judge", "sir", "madam", "lady", "lord", "uncle", "aunt", "cousin", "grandma",
    "grandpa",
];

/// Generational and professional suffixes stripped from the end.
pub const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "v", "esq", "phd", "md", "dds",
];

/// Function words that end a name: determiners, pronouns, prepositions,
/// conjunctions, auxiliaries, and common adverbs.
const FUNCTION_WORDS: &[&str] = &[
    // determiners
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "every", "no",
    // pronouns
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your",
    "his", "its", "our", "their", "who", "whom", "whose", "which", "what",
    // prepositions
    "of", "in", "on", "at", "by", "for", "with", "from", "to", "into", "onto", "over", "under",
    "about", "after", "before", "between", "through", "during", "without",
    // conjunctions
    "and", "or", "but", "nor", "so", "yet", "if", "while", "because", "as",
    // auxiliaries
    "is", "am", "are", "was", "were", "be", "been", "being", "do", "does", "did", "have", "has",
    "had", "will", "would", "can", "could", "shall", "should", "may", "might", "must",
    // common adverbs
    "not", "very", "just", "then", "there", "here", "now", "again", "also", "too", "only",
];

fn is_noun_like(token: &str) -> bool {
    !FUNCTION_WORDS.contains(&token)
}

/// A name normalized into its structural parts.
///
/// All parts are lowercased; absent parts are `None`. `middle` is only
/// present for names of three or more tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuredName {
    pub title: Option<String>,
    pub first: Option<String>,
    pub middle: Option<Vec<String>>,
    pub last: Option<String>,
    pub suffix: Option<String>,
}

impl StructuredName {
    /// Parse a raw mention into a structured name.
    ///
    /// Returns `None` when nothing name-like survives normalization.
    ///
    /// ```
    /// use dramatis_resolver::StructuredName;
    ///
    /// let name = StructuredName::parse("Dr. John Q. Public Jr.").unwrap();
    /// assert_eq!(name.title.as_deref(), Some("dr"));
    /// assert_eq!(name.first.as_deref(), Some("john"));
    /// assert_eq!(name.last.as_deref(), Some("public"));
    /// assert_eq!(name.suffix.as_deref(), Some("jr"));
    /// ```
    pub fn parse(raw: &str) -> Option<StructuredName> {
        // Normalize: lowercase, hyphens to spaces, strip everything
        // outside letters, spaces, and periods, collapse whitespace.
        let cleaned: String = raw
            .to_lowercase()
            .replace('-', " ")
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || *c == ' ' || *c == '.')
            .collect();
        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

        // A leading honorific only counts when something follows it.
        let title = match tokens.first() {
            Some(first) if tokens.len() > 1 => {
                let bare = first.trim_end_matches('.');
                if HONORIFICS.contains(&bare) {
                    tokens.remove(0);
                    Some(bare.to_string())
                } else {
                    None
                }
            }
            _ => None,
        };

        // Symmetrically, a trailing suffix needs a name before it.
        let suffix = match tokens.last() {
            Some(last) if tokens.len() > 1 => {
                let bare = last.trim_end_matches('.');
                if SUFFIXES.contains(&bare) {
                    tokens.pop();
                    Some(bare.to_string())
                } else {
                    None
                }
            }
            _ => None,
        };

        // Drop a leading run of function words, then keep the maximal
        // leading run of noun-like tokens; everything after the first
        // function word is discarded.
        let parts: Vec<String> = tokens
            .iter()
            .map(|t| t.trim_end_matches('.'))
            .filter(|t| !t.is_empty())
            .skip_while(|t| !is_noun_like(t))
            .take_while(|t| is_noun_like(t))
            .map(|t| t.to_string())
            .collect();

        if parts.is_empty() {
            return None;
        }

        let first = Some(parts[0].clone());
        let last = if parts.len() > 1 {
            Some(parts[parts.len() - 1].clone())
        } else {
            None
        };
        let middle = if parts.len() > 2 {
            Some(parts[1..parts.len() - 1].to_vec())
        } else {
            None
        };

        Some(StructuredName {
            title,
            first,
            middle,
            last,
            suffix,
        })
    }
}
