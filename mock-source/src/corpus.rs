//! The fixed corpus served by [`MockSource`](crate::MockSource).
//!
//! Eight cast pages, two seasons of two episodes each, and four
//! scripts. The cross-links are chosen so the popularity ranking is
//! fully determined, including one tie broken by path order, and the
//! scripts exercise every resolution path.

use chrono::NaiveDate;

use dramatis_shared::{CastMember, EpisodeRecord, ScriptLine, SeasonRecord};

pub const JERRY: &str = "/wiki/Jerry_Seinfeld";
pub const GEORGE: &str = "/wiki/George_Costanza";
pub const ELAINE: &str = "/wiki/Elaine_Benes";
pub const KRAMER: &str = "/wiki/Cosmo_Kramer";
pub const NEWMAN: &str = "/wiki/Newman";
pub const FRANK: &str = "/wiki/Frank_Costanza";
pub const JACKIE: &str = "/wiki/Jackie_Chiles";
pub const DONNA: &str = "/wiki/Donna";

/// Number of cast pages in the corpus.
pub const CAST_COUNT: usize = 8;

/// Number of episodes across all seasons.
pub const EPISODE_COUNT: usize = 4;

/// Total individual speaker mentions across all scripts, after joined
/// credits are split.
pub const MENTION_COUNT: usize = 25;

/// Mentions that resolve to a cast member.
pub const RESOLVED_COUNT: usize = 20;

/// Mentions that match nobody: scene headings, numbered extras, shared
/// surnames, and names outside the cast.
pub const UNMATCHED_COUNT: usize = 5;

const PAGES: [&str; CAST_COUNT] = [JERRY, GEORGE, ELAINE, KRAMER, NEWMAN, FRANK, JACKIE, DONNA];

/// Cast pages whose page name starts with `letter`.
pub fn paths_by_letter(letter: char) -> Vec<String> {
    PAGES
        .iter()
        .filter(|path| {
            path.strip_prefix("/wiki/")
                .and_then(|name| name.chars().next())
                .map(|c| c.eq_ignore_ascii_case(&letter))
                .unwrap_or(false)
        })
        .map(|path| path.to_string())
        .collect()
}

/// Paths linked from the given cast page. Includes one non-cast link
/// (from the most popular page) that ranking must ignore.
pub fn outbound_paths(path: &str) -> Option<Vec<String>> {
    let links: &[&str] = match path {
        JERRY => &[GEORGE, ELAINE, KRAMER, "/wiki/Larry_David"],
        GEORGE => &[JERRY, ELAINE, FRANK],
        ELAINE => &[JERRY, GEORGE],
        KRAMER => &[JERRY, NEWMAN, GEORGE, ELAINE],
        NEWMAN => &[JERRY, KRAMER],
        FRANK => &[JERRY, GEORGE],
        JACKIE => &[JERRY],
        DONNA => &[JERRY],
        _ => return None,
    };
    Some(links.iter().map(|p| p.to_string()).collect())
}

/// The full record for one cast page.
pub fn cast_member(path: &str) -> Option<CastMember> {
    let (name, gender, occupation, portrayed_by, qualifier) = match path {
        JERRY => ("Jerry Seinfeld", "male", "comedian", "Jerry Seinfeld", None),
        GEORGE => (
            "George Costanza",
            "male",
            "real estate broker",
            "Jason Alexander",
            None,
        ),
        ELAINE => (
            "Elaine Benes",
            "female",
            "editor",
            "Julia Louis-Dreyfus",
            None,
        ),
        KRAMER => (
            "Cosmo Kramer",
            "male",
            "entrepreneur",
            "Michael Richards",
            None,
        ),
        NEWMAN => ("Newman", "male", "mail carrier", "Wayne Knight", None),
        FRANK => ("Frank Costanza", "male", "retired", "Jerry Stiller", None),
        JACKIE => ("Jackie Chiles", "male", "attorney", "Phil Morris", None),
        DONNA => ("Donna", "female", "unknown", "Jessica Lundy", Some("The Stock Tip")),
        _ => return None,
    };

    Some(CastMember {
        path: path.to_string(),
        name: name.to_string(),
        gender: gender.to_string(),
        occupation: occupation.to_string(),
        portrayed_by: vec![portrayed_by.to_string()],
        qualifier: qualifier.map(str::to_string),
    })
}

/// The season listing with episode metadata.
pub fn seasons() -> Vec<SeasonRecord> {
    vec![
        SeasonRecord {
            number: 1,
            episodes: vec![
                episode(1, "The Stake Out", 1990, 5, 31, &["Larry David", "Jerry Seinfeld"]),
                episode(2, "The Robbery", 1990, 6, 7, &["Matt Goldman"]),
            ],
        },
        SeasonRecord {
            number: 2,
            episodes: vec![
                episode(1, "The Phone Message", 1991, 2, 13, &["Larry David", "Jerry Seinfeld"]),
                episode(2, "The Revenge", 1991, 4, 18, &["Larry David"]),
            ],
        },
    ]
}

/// The script for one episode, keyed by its title.
pub fn script(episode_title: &str) -> Option<Vec<ScriptLine>> {
    let lines: &[(&str, &str)] = match episode_title {
        "The Stake Out" => &[
            ("JERRY", "So we're stalking the lobby now?"),
            ("GEORGE", "It's not stalking, it's a stake out."),
            ("JERRY AND GEORGE", "Art Vandelay!"),
            ("ELAINE", "You could have just asked for her number."),
            ("INT. MONK'S CAFE", "The usual booth."),
            ("VANESSA", "Have we met?"),
            ("KRAMER", "You need a plan. I have a plan."),
        ],
        "The Robbery" => &[
            ("JERRY", "The door was open and everything's gone."),
            ("KRAMER", "I may have left the door open."),
            ("ELAINE", "So can I have the apartment or not?"),
            ("MAN #1", "Nice building."),
            ("GEORGE & JERRY", "We're not moving."),
            ("BENES", "I'm taking the apartment."),
        ],
        "The Phone Message" => &[
            ("JERRY", "You have to get the tape before she hears it."),
            ("GEORGE", "I left one message. Maybe five."),
            ("DONNA", "I liked the commercial, that's all."),
            ("COSTANZA", "Switch the tape!"),
            ("JERY", "This could actually work."),
            ("ESTELLE", "What did you do to the machine?"),
        ],
        "The Revenge" => &[
            ("NEWMAN", "I'm going to jump. Probably."),
            ("JERRY", "You don't really sound committed."),
            ("FRANK", "Nobody quits on a Costanza!"),
            ("GEORGE", "I'm going back in like nothing happened."),
        ],
        _ => return None,
    };

    Some(
        lines
            .iter()
            .enumerate()
            .map(|(i, (speaker, dialogue))| ScriptLine {
                number: i as u32 + 1,
                speaker: speaker.to_string(),
                dialogue: dialogue.to_string(),
            })
            .collect(),
    )
}

fn episode(number: u32, title: &str, year: i32, month: u32, day: u32, writers: &[&str]) -> EpisodeRecord {
    EpisodeRecord {
        number,
        title: title.to_string(),
        // Corpus dates are valid by construction.
        air_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        writers: writers.iter().map(|w| w.to_string()).collect(),
    }
}
