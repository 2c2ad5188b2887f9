//! Mention hygiene.
//!
//! Script speaker credits sometimes name several people on one line
//! ("JERRY AND GEORGE", "ELAINE & KRAMER", "JERRY, GEORGE"). Each
//! individual mention is resolved separately and shares the originating
//! line number.

/// Separator characters that join speaker credits.
const JOIN_CHARS: [char; 4] = ['&', '+', '/', ','];

/// Split a joined speaker credit into individual mentions.
///
/// Splits on `&`, `+`, `/`, `,`, and a standalone `and` token
/// (case-insensitive), trimming whitespace and dropping blanks. A
/// credit with no separators comes back as a single mention.
pub fn split_speakers(raw: &str) -> Vec<String> {
    let merged = raw.replace(JOIN_CHARS, "\u{1}");

    let mut mentions = Vec::new();
    for part in merged.split('\u{1}') {
        let mut current: Vec<&str> = Vec::new();
        for token in part.split_whitespace() {
            if token.eq_ignore_ascii_case("and") {
                push_mention(&mut mentions, &current);
                current.clear();
            } else {
                current.push(token);
            }
        }
        push_mention(&mut mentions, &current);
    }

    mentions
}

fn push_mention(mentions: &mut Vec<String>, tokens: &[&str]) {
    if !tokens.is_empty() {
        mentions.push(tokens.join(" "));
    }
}
