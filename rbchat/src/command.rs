//! Analyse des lignes de chat
//!
//! Grammaire reconnue (insensible à la casse) :
//!
//! - `.radio add to <file> <quoi>` / `.radio add <quoi>`
//! - `.radio set <lien> <artiste> - <titre>`
//! - `.radio remove from <file> <quoi>` / `.radio remove <quoi>`
//! - `.radio next|prev|previous|shuffle|now|list [file]`
//! - `<bot> gimme one` et `<bot> gimme one of mine` (ou `give me`)
//! - `.radio` / `.radio help`

use once_cell::sync::Lazy;
use regex::Regex;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("chat command pattern is valid")
}

/// `<https://...>` ou `<https://...|libellé>`
static CHAT_LINK_RE: Lazy<Regex> = Lazy::new(|| pattern(r"<((?:https?://|www\.)[^|>\s]+)(?:\|[^>]*)?>"));

static ADD_TO_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^\.radio add to ([-_a-z0-9]+) (.+)$"));
static ADD_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^\.radio add (.+)$"));
static SET_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^\.radio set (\S+) (.+) - (.+)$"));
static REMOVE_FROM_RE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)^\.radio remove from ([-_a-z0-9]+) (.+)$"));
static REMOVE_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^\.radio remove (.+)$"));
static PLAYBACK_RE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)^\.radio (next|prev|previous|shuffle|now|list)(?: ([-_a-z0-9]+))?$")
});
static HELP_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^\.radio\b"));
static GIMME_MINE_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)(gimme|give me) one of mine"));
static GIMME_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)(gimme|give me) one"));

/// Une commande comprise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ajoute `what` (lien, id ou `artiste - titre`) dans une file ;
    /// sans `queue`, la station de l'auteur
    Add { queue: Option<String>, what: String },
    /// Associe un lien à un couple artiste/titre dans le catalogue
    Set {
        link: String,
        artist: String,
        title: String,
    },
    Remove { queue: Option<String>, what: String },
    Next(Option<String>),
    Previous(Option<String>),
    Shuffle(Option<String>),
    Now(Option<String>),
    /// Contenu d'une file, ou du catalogue sans argument
    List(Option<String>),
    GimmeOne,
    GimmeMine,
    Help,
}

/// Remplace les liens décorés par le client de chat par l'URL nue
pub fn unwrap_links(text: &str) -> String {
    CHAT_LINK_RE.replace_all(text, "$1").into_owned()
}

/// Analyse une ligne ; `None` si elle ne s'adresse pas à la radio
///
/// `bot_name` déclenche les demandes en langage libre (« gimme one »).
pub fn parse(line: &str, bot_name: &str) -> Option<Command> {
    let line = unwrap_links(line.trim());
    let line = line.trim();

    if !bot_name.is_empty() && line.to_lowercase().contains(&bot_name.to_lowercase()) {
        if GIMME_MINE_RE.is_match(line) {
            return Some(Command::GimmeMine);
        }
        if GIMME_RE.is_match(line) {
            return Some(Command::GimmeOne);
        }
    }

    if let Some(caps) = ADD_TO_RE.captures(line) {
        return Some(Command::Add {
            queue: Some(caps[1].trim().to_string()),
            what: caps[2].trim().to_string(),
        });
    }
    if let Some(caps) = ADD_RE.captures(line) {
        return Some(Command::Add {
            queue: None,
            what: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = SET_RE.captures(line) {
        return Some(Command::Set {
            link: caps[1].trim().to_string(),
            artist: caps[2].trim().to_string(),
            title: caps[3].trim().to_string(),
        });
    }
    if let Some(caps) = REMOVE_FROM_RE.captures(line) {
        return Some(Command::Remove {
            queue: Some(caps[1].trim().to_string()),
            what: caps[2].trim().to_string(),
        });
    }
    if let Some(caps) = REMOVE_RE.captures(line) {
        return Some(Command::Remove {
            queue: None,
            what: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = PLAYBACK_RE.captures(line) {
        let queue = caps.get(2).map(|m| m.as_str().to_string());
        return Some(match caps[1].to_lowercase().as_str() {
            "next" => Command::Next(queue),
            "prev" | "previous" => Command::Previous(queue),
            "shuffle" => Command::Shuffle(queue),
            "now" => Command::Now(queue),
            _ => Command::List(queue),
        });
    }
    if HELP_RE.is_match(line) {
        return Some(Command::Help);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: &str) -> Option<Command> {
        parse(line, "radiobot")
    }

    #[test]
    fn test_add_variants() {
        assert_eq!(
            p(".radio add to chill-out <https://youtu.be/fB63ztKnGvo|youtu.be/fB63ztKnGvo>"),
            Some(Command::Add {
                queue: Some("chill-out".into()),
                what: "https://youtu.be/fB63ztKnGvo".into(),
            })
        );
        assert_eq!(
            p(".RADIO ADD Disclosure - Omen"),
            Some(Command::Add {
                queue: None,
                what: "Disclosure - Omen".into(),
            })
        );
    }

    #[test]
    fn test_set_unwraps_link() {
        assert_eq!(
            p(".radio set <https://www.youtube.com/watch?v=fB63ztKnGvo> Disclosure - Omen"),
            Some(Command::Set {
                link: "https://www.youtube.com/watch?v=fB63ztKnGvo".into(),
                artist: "Disclosure".into(),
                title: "Omen".into(),
            })
        );
        // Pas de titre : ce n'est pas un « set », juste l'aide
        assert_eq!(p(".radio set https://youtu.be/fB63ztKnGvo Disclosure"), Some(Command::Help));
    }

    #[test]
    fn test_remove_variants() {
        assert_eq!(
            p(".radio remove from general fB63ztKnGvo"),
            Some(Command::Remove {
                queue: Some("general".into()),
                what: "fB63ztKnGvo".into(),
            })
        );
        assert_eq!(
            p(".radio remove Disclosure - Omen"),
            Some(Command::Remove {
                queue: None,
                what: "Disclosure - Omen".into(),
            })
        );
    }

    #[test]
    fn test_playback_commands() {
        assert_eq!(p(".radio next"), Some(Command::Next(None)));
        assert_eq!(p(".radio prev general"), Some(Command::Previous(Some("general".into()))));
        assert_eq!(p(".radio previous"), Some(Command::Previous(None)));
        assert_eq!(p(".radio shuffle cyle"), Some(Command::Shuffle(Some("cyle".into()))));
        assert_eq!(p(".radio now"), Some(Command::Now(None)));
        assert_eq!(p(".radio list"), Some(Command::List(None)));
    }

    #[test]
    fn test_gimme() {
        assert_eq!(p("hey RadioBot, gimme one"), Some(Command::GimmeOne));
        assert_eq!(p("radiobot give me one of mine please"), Some(Command::GimmeMine));
        assert_eq!(p("gimme one"), None);
        assert_eq!(p("radiobot is great"), None);
    }

    #[test]
    fn test_help_and_noise() {
        assert_eq!(p(".radio"), Some(Command::Help));
        assert_eq!(p(".radio help"), Some(Command::Help));
        assert_eq!(p("  .radio   "), Some(Command::Help));
        assert_eq!(p("hello world"), None);
        assert_eq!(p(".radiohead rocks"), None);
    }

    #[test]
    fn test_unwrap_links() {
        assert_eq!(
            unwrap_links("look <https://youtu.be/x|youtu.be/x> and <http://a.b/c>"),
            "look https://youtu.be/x and http://a.b/c"
        );
        assert_eq!(unwrap_links("<@U123> hi"), "<@U123> hi");
    }
}
