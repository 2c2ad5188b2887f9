//! Entity resolution onto the canonical cast.
//!
//! The resolver is built once from the canonical cast list and the
//! popularity map. Construction builds three read-only indices:
//!
//! - exact: lowercased full display name → member;
//! - first-name and last-name: single token → member, where any key
//!   claimed by two or more members is poisoned to "no match" rather
//!   than an arbitrary pick (a key claimed as one member's first name
//!   and another's last name is poisoned in both indices).
//!
//! Resolution tries an ordered sequence of strategies and
//! short-circuits on the first verdict. Results are cached per distinct
//! raw mention in a bounded read-through memo.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use dramatis_shared::CastMember;

use crate::errors::ResolverError;
use crate::name::StructuredName;
use crate::similarity::PHONETIC_BONUS;

/// Minimum fuzzy similarity for an accepted match.
const SIMILARITY_THRESHOLD: f64 = 0.95;

/// Insertion cap for the resolution memo.
const MEMO_CAP: usize = 8192;

/// Built-in alias table mapping common short credits to full cast
/// names. An entry only takes effect when its target is itself an exact
/// canonical name.
const ALIASES: &[(&str, &str)] = &[
    ("jerry", "Jerry Seinfeld"),
    ("george", "George Costanza"),
    ("elaine", "Elaine Benes"),
    ("kramer", "Cosmo Kramer"),
    ("morty", "Morty Seinfeld"),
    ("helen", "Helen Seinfeld"),
    ("frank", "Frank Costanza"),
    ("estelle", "Estelle Costanza"),
];

/// Substrings that mark a mention as non-dialogue (scene headings,
/// stage directions, numbered extras).
const DENY_MARKERS: &[&str] = &[
    "standup",
    "#",
    "int.",
    "ext.",
    "inside ",
    "outside ",
    "apartment",
];

fn is_denied(mention: &str) -> bool {
    mention.chars().any(|c| c.is_ascii_digit())
        || DENY_MARKERS.iter().any(|marker| mention.contains(marker))
}

/// A resolved mention: the matched member and the resolver's confidence
/// in the match, in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub confidence: f64,
    pub member: CastMember,
}

/// Index slot for the first/last-name indices: `Poisoned` keys are
/// shared by several members and map to "no match" by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unique(usize),
    Poisoned,
}

/// Resolves raw script mentions onto the canonical cast.
///
/// Built once, single-threaded; all lookups afterwards are read-only,
/// so concurrent `resolve` calls need no synchronization beyond the
/// internal memo lock.
pub struct Resolver {
    members: Vec<CastMember>,
    /// Parsed canonical names, index-aligned with `members`.
    parsed: Vec<Option<StructuredName>>,
    /// Popularity rank per member, index-aligned with `members`.
    ranks: Vec<u32>,
    exact: HashMap<String, usize>,
    first: HashMap<String, Slot>,
    last: HashMap<String, Slot>,
    aliases: HashMap<String, String>,
    memo: RwLock<HashMap<String, Option<Resolution>>>,
}

impl Resolver {
    /// Build a resolver from the canonical cast and the popularity map
    /// (member path → rank).
    ///
    /// Fails before any work begins if the cast list is empty or a
    /// member has no rank.
    pub fn new(
        members: Vec<CastMember>,
        popularity: &HashMap<String, u32>,
    ) -> Result<Self, ResolverError> {
        if members.is_empty() {
            return Err(ResolverError::EmptyCast);
        }

        let mut ranks = Vec::with_capacity(members.len());
        for member in &members {
            let rank = popularity
                .get(&member.path)
                .copied()
                .ok_or_else(|| ResolverError::MissingRank(member.path.clone()))?;
            ranks.push(rank);
        }

        let mut exact = HashMap::new();
        let mut first: HashMap<String, Slot> = HashMap::new();
        let mut last: HashMap<String, Slot> = HashMap::new();
        let mut parsed = Vec::with_capacity(members.len());

        for (i, member) in members.iter().enumerate() {
            exact.insert(member.name.to_lowercase(), i);

            let name = StructuredName::parse(&member.name);
            if let Some(name) = &name {
                if let Some(key) = &name.first {
                    if first.contains_key(key) {
                        first.insert(key.clone(), Slot::Poisoned);
                    } else if last.contains_key(key) {
                        first.insert(key.clone(), Slot::Poisoned);
                        last.insert(key.clone(), Slot::Poisoned);
                    } else {
                        first.insert(key.clone(), Slot::Unique(i));
                    }
                }
                if let Some(key) = &name.last {
                    if last.contains_key(key) {
                        last.insert(key.clone(), Slot::Poisoned);
                    } else if first.contains_key(key) {
                        first.insert(key.clone(), Slot::Poisoned);
                        last.insert(key.clone(), Slot::Poisoned);
                    } else {
                        last.insert(key.clone(), Slot::Unique(i));
                    }
                }
            }
            parsed.push(name);
        }

        let aliases = ALIASES
            .iter()
            .map(|(short, full)| (short.to_string(), full.to_string()))
            .collect();

        Ok(Self {
            members,
            parsed,
            ranks,
            exact,
            first,
            last,
            aliases,
            memo: RwLock::new(HashMap::new()),
        })
    }

    /// Extend the alias table with additional short-form mappings.
    /// Keys are lowercased; targets must be exact canonical names to
    /// take effect.
    pub fn with_aliases<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.aliases
            .extend(extra.into_iter().map(|(k, v)| (k.to_lowercase(), v)));
        self
    }

    /// Resolve a raw mention to a cast member and a confidence, or
    /// `None` when no confident match exists. "No match" is a
    /// legitimate terminal outcome, not an error.
    pub fn resolve(&self, raw: &str) -> Option<Resolution> {
        let mention = raw.to_lowercase().trim().to_string();

        if let Ok(memo) = self.memo.read() {
            if let Some(hit) = memo.get(&mention) {
                return hit.clone();
            }
        }

        let result = self.resolve_uncached(&mention);

        if let Ok(mut memo) = self.memo.write() {
            // Bounded: once full, further distinct mentions are simply
            // recomputed.
            if memo.len() < MEMO_CAP {
                memo.insert(mention, result.clone());
            }
        }

        result
    }

    fn resolve_uncached(&self, mention: &str) -> Option<Resolution> {
        if is_denied(mention) {
            return None;
        }

        if let Some(&i) = self.exact.get(mention) {
            return Some(self.resolution(1.0, i));
        }

        if let Some(full) = self.aliases.get(mention) {
            if let Some(&i) = self.exact.get(&full.to_lowercase()) {
                return Some(self.resolution(1.0, i));
            }
        }

        let name = StructuredName::parse(mention)?;

        // A lone token resolves through the single-name indices; a
        // poisoned key is ambiguous and stops here so the fuzzy ranking
        // below cannot override the documented "no match".
        if let (Some(token), None) = (&name.first, &name.last) {
            match self.first.get(token) {
                Some(Slot::Unique(i)) => return Some(self.resolution(1.0, *i)),
                Some(Slot::Poisoned) => return None,
                None => {}
            }
            match self.last.get(token) {
                Some(Slot::Unique(i)) => return Some(self.resolution(1.0, *i)),
                Some(Slot::Poisoned) => return None,
                None => {}
            }
        }

        // Fuzzy ranking over the whole cast: similarity descending,
        // popularity rank ascending as the tie-break.
        let mut ranking: Vec<(f64, u32, usize)> = Vec::new();
        for (i, other) in self.parsed.iter().enumerate() {
            let Some(other) = other else { continue };

            let mut similarity = name.similarity(other);
            if name.phonetic_match(other) {
                similarity = (similarity + PHONETIC_BONUS).min(1.0);
            }

            ranking.push((similarity, self.ranks[i], i));
        }

        ranking.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let (best, _, i) = *ranking.first()?;
        if best < SIMILARITY_THRESHOLD {
            debug!(mention = mention, best = best, "No confident match");
            return None;
        }

        Some(self.resolution(best, i))
    }

    fn resolution(&self, confidence: f64, i: usize) -> Resolution {
        Resolution {
            confidence,
            member: self.members[i].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(path: &str, name: &str) -> CastMember {
        CastMember {
            path: path.to_string(),
            name: name.to_string(),
            gender: "unknown".to_string(),
            occupation: "unknown".to_string(),
            portrayed_by: vec![],
            qualifier: None,
        }
    }

    fn resolver(members: Vec<CastMember>) -> Resolver {
        let popularity = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.path.clone(), i as u32 + 1))
            .collect();
        Resolver::new(members, &popularity).unwrap()
    }

    fn cast() -> Vec<CastMember> {
        vec![
            member("/wiki/Jerry_Seinfeld", "Jerry Seinfeld"),
            member("/wiki/George_Costanza", "George Costanza"),
            member("/wiki/Elaine_Benes", "Elaine Benes"),
            member("/wiki/Cosmo_Kramer", "Cosmo Kramer"),
            member("/wiki/Newman", "Newman"),
        ]
    }

    #[test]
    fn test_empty_cast_rejected() {
        let result = Resolver::new(vec![], &HashMap::new());
        assert!(matches!(result, Err(ResolverError::EmptyCast)));
    }

    #[test]
    fn test_missing_rank_rejected() {
        let result = Resolver::new(cast(), &HashMap::new());
        assert!(matches!(result, Err(ResolverError::MissingRank(_))));
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let resolver = resolver(cast());
        let resolution = resolver.resolve("JERRY SEINFELD").unwrap();
        assert_eq!(resolution.confidence, 1.0);
        assert_eq!(resolution.member.path, "/wiki/Jerry_Seinfeld");
    }

    #[test]
    fn test_alias_resolves_to_full_name() {
        let resolver = resolver(cast());
        let resolution = resolver.resolve("KRAMER").unwrap();
        assert_eq!(resolution.confidence, 1.0);
        assert_eq!(resolution.member.path, "/wiki/Cosmo_Kramer");
    }

    #[test]
    fn test_custom_alias() {
        let resolver = resolver(cast()).with_aliases(vec![(
            "the postman".to_string(),
            "Newman".to_string(),
        )]);
        let resolution = resolver.resolve("THE POSTMAN").unwrap();
        assert_eq!(resolution.member.path, "/wiki/Newman");
    }

    #[test]
    fn test_alias_to_unknown_name_is_dead() {
        let resolver = resolver(cast()).with_aliases(vec![(
            "bania".to_string(),
            "Kenny Bania".to_string(),
        )]);
        assert_eq!(resolver.resolve("bania"), None);
    }

    #[test]
    fn test_denylist_rejects_stage_directions() {
        let resolver = resolver(cast());
        assert_eq!(resolver.resolve("INT. MONK'S CAFE"), None);
        assert_eq!(resolver.resolve("EXT. STREET"), None);
        assert_eq!(resolver.resolve("MAN #2"), None);
        assert_eq!(resolver.resolve("JERRY 2"), None);
        assert_eq!(resolver.resolve("INSIDE THE CAR"), None);
        assert_eq!(resolver.resolve("JERRY'S APARTMENT"), None);
        assert_eq!(resolver.resolve("JERRY (STANDUP)"), None);
    }

    #[test]
    fn test_unique_first_name_resolves() {
        let resolver = resolver(cast());
        let resolution = resolver.resolve("ELAINE").unwrap();
        assert_eq!(resolution.confidence, 1.0);
        assert_eq!(resolution.member.path, "/wiki/Elaine_Benes");
    }

    #[test]
    fn test_unique_last_name_resolves() {
        let resolver = resolver(cast());
        let resolution = resolver.resolve("BENES").unwrap();
        assert_eq!(resolution.member.path, "/wiki/Elaine_Benes");
    }

    #[test]
    fn test_shared_first_name_is_ambiguous() {
        let mut members = cast();
        members.push(member("/wiki/Jerry_the_Mime", "Jerry Mime"));
        let resolver = resolver(members);

        // Both Jerrys stay reachable by exact full name.
        assert_eq!(
            resolver.resolve("jerry seinfeld").unwrap().member.path,
            "/wiki/Jerry_Seinfeld"
        );
        assert_eq!(
            resolver.resolve("jerry mime").unwrap().member.path,
            "/wiki/Jerry_the_Mime"
        );

        // The bare first name is poisoned; the alias table does not
        // apply because "jerry" maps to an exact name, which wins first.
        let resolver = {
            let mut members = cast();
            members[0] = member("/wiki/Jerry_Other", "Jerry Other");
            members.push(member("/wiki/Jerry_Mime", "Jerry Mime"));
            let popularity = members
                .iter()
                .enumerate()
                .map(|(i, m)| (m.path.clone(), i as u32 + 1))
                .collect();
            Resolver::new(members, &popularity).unwrap()
        };
        assert_eq!(resolver.resolve("jerry"), None);
    }

    #[test]
    fn test_cross_index_collision_poisons_both() {
        let members = vec![
            member("/wiki/A", "Morgan Avery"),
            member("/wiki/B", "Casey Morgan"),
        ];
        let resolver = resolver(members);

        // "morgan" is one member's first name and the other's last.
        assert_eq!(resolver.resolve("morgan"), None);
        assert_eq!(
            resolver.resolve("morgan avery").unwrap().member.path,
            "/wiki/A"
        );
    }

    #[test]
    fn test_fuzzy_match_above_threshold_is_returned() {
        let resolver = resolver(cast());
        let resolution = resolver.resolve("JERY SEINFELD").unwrap();
        assert!(resolution.confidence >= 0.95);
        assert_eq!(resolution.member.path, "/wiki/Jerry_Seinfeld");
    }

    #[test]
    fn test_fuzzy_match_below_threshold_is_no_match() {
        let resolver = resolver(cast());
        assert_eq!(resolver.resolve("ZEBRA WALRUS"), None);
    }

    #[test]
    fn test_fuzzy_tie_breaks_on_popularity() {
        // Both candidates reach a capped 1.0 via the phonetic bonus;
        // the lower (more popular) rank must win.
        let members = vec![
            member("/wiki/Gray", "Gray Davis"),
            member("/wiki/Grey", "Grey Davis"),
        ];
        let mut popularity = HashMap::new();
        popularity.insert("/wiki/Gray".to_string(), 2);
        popularity.insert("/wiki/Grey".to_string(), 1);
        let resolver = Resolver::new(members, &popularity).unwrap();

        let resolution = resolver.resolve("graye davis").unwrap();
        assert_eq!(resolution.member.path, "/wiki/Grey");
    }

    #[test]
    fn test_resolution_is_deterministic_and_memo_transparent() {
        let resolver = resolver(cast());

        // Cold, warm, and warm again: identical outcomes.
        let cold = resolver.resolve("JERY SEINFELD");
        let warm = resolver.resolve("JERY SEINFELD");
        assert_eq!(cold, warm);

        let other = self::resolver(cast());
        assert_eq!(other.resolve("JERY SEINFELD"), cold);
    }

    #[test]
    fn test_unparseable_mention_is_no_match() {
        let resolver = resolver(cast());
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("the of and"), None);
    }
}
