//! Exécution des commandes de chat sur la radio

use crate::command::{parse, Command};
use rbplaylist::{Coordinator, Error, NowPlaying};
use serde::Deserialize;
use tracing::{debug, info};

pub const DIRECT_MESSAGE_REFUSAL: &str =
    "sorry, but i do not respond to direct messages or in private groups; you could be cheating!";

pub const HELP_TEXT: &str = "Radio options: `.radio add (to [radio-station]) [link or artist - song name]` (adds to your user's radio station if a `to` is not given)\n`.radio set [link] [artist] - [song name]` to add something to the library for easier use later";

pub const LIBRARY_ADDED: &str = "Added that to the library, thanks!";
pub const LIBRARY_FAILED: &str =
    "Could not add to the library for some reason. Check your syntax, maybe.";

/// Type de conversation, déduit du préfixe de l'identifiant du salon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Channel,
    Group,
    Direct,
}

impl ChannelKind {
    /// `G...` pour un groupe privé, `D...` pour un message direct, le reste
    /// est un salon public
    ///
    /// La passerelle HTTP reçoit aussi des noms de salon en clair (`general`)
    /// d'intégrations qui ne connaissent pas les identifiants : un préfixe
    /// inconnu n'est donc pas refusé.
    pub fn from_channel(channel: &str) -> Self {
        match channel.chars().next() {
            Some('G') => ChannelKind::Group,
            Some('D') => ChannelKind::Direct,
            _ => ChannelKind::Channel,
        }
    }
}

/// Un message reçu
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ChatMessage {
    /// Nom de l'auteur, aussi nom de sa station
    #[schema(example = "cyle")]
    pub user: String,
    #[schema(example = "C024BE91L")]
    pub channel: String,
    #[schema(example = ".radio add Disclosure - Omen")]
    pub text: String,
}

/// Le bot : traduit les lignes de chat en opérations sur la radio
#[derive(Clone)]
pub struct ChatBot {
    coordinator: Coordinator,
    bot_name: String,
}

impl ChatBot {
    pub fn new(coordinator: Coordinator, bot_name: impl Into<String>) -> Self {
        Self {
            coordinator,
            bot_name: bot_name.into(),
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Réponse au message, `None` s'il ne concerne pas la radio
    pub fn handle(&self, message: &ChatMessage) -> Option<String> {
        let command = parse(&message.text, &self.bot_name)?;

        if ChannelKind::from_channel(&message.channel) != ChannelKind::Channel {
            debug!("Refusing {:?} from {} outside a public channel", command, message.user);
            return Some(DIRECT_MESSAGE_REFUSAL.to_string());
        }

        info!("💬 {} in {}: {:?}", message.user, message.channel, command);
        Some(self.execute(command, message.user.trim()))
    }

    /// Exécute une commande pour le compte de `user`
    pub fn execute(&self, command: Command, user: &str) -> String {
        let radio = &self.coordinator;
        match command {
            Command::Add { queue, what } => {
                let queue = queue.unwrap_or_else(|| user.to_string());
                match radio.resolve_and_add(&queue, &what, user) {
                    Ok(_) => format!("Added that to the \"{}\" channel!", queue),
                    Err(e) => {
                        debug!("add to {} failed: {}", queue, e);
                        format!("Could not add that to the \"{}\" channel for some reason...", queue)
                    }
                }
            }
            Command::Set { link, artist, title } => {
                match radio.set_track(&link, &artist, &title, user) {
                    Ok(_) => LIBRARY_ADDED.to_string(),
                    Err(e) => {
                        debug!("set failed: {}", e);
                        LIBRARY_FAILED.to_string()
                    }
                }
            }
            Command::Remove { queue, what } => {
                let queue = queue.unwrap_or_else(|| user.to_string());
                match radio.remove_from_queue(&queue, &what) {
                    Ok(_) => format!("Removed that from the \"{}\" channel.", queue),
                    Err(_) => format!("Could not find that in the \"{}\" channel.", queue),
                }
            }
            Command::Next(queue) => self.playback(queue, user, |q| radio.next(q)),
            Command::Previous(queue) => self.playback(queue, user, |q| radio.previous(q)),
            Command::Shuffle(queue) => self.playback(queue, user, |q| radio.shuffle(q)),
            Command::Now(queue) => {
                let queue = queue.unwrap_or_else(|| user.to_string());
                match radio.current(&queue) {
                    Ok(Some(track)) => format!(
                        "Up on \"{}\": {} (added by {}) {}",
                        queue,
                        track.display_name(),
                        track.contributor_name(),
                        track.link
                    ),
                    Ok(None) => format!("The \"{}\" channel is empty.", queue),
                    Err(_) => no_such_channel(&queue),
                }
            }
            Command::List(Some(queue)) => match radio.queue_overview(&queue) {
                Ok(overview) if overview.entries.is_empty() => {
                    format!("The \"{}\" channel is empty.", queue)
                }
                Ok(overview) => {
                    let mut lines = vec![format!(
                        "The \"{}\" channel has {} songs:",
                        queue,
                        overview.entries.len()
                    )];
                    for entry in overview.entries {
                        let marker = if entry.position == overview.cursor { "▶" } else { " " };
                        let name = entry
                            .track
                            .map(|t| t.display_name())
                            .unwrap_or_else(|| format!("{} (missing)", entry.id));
                        lines.push(format!("{} {}. {}", marker, entry.position + 1, name));
                    }
                    lines.join("\n")
                }
                Err(_) => no_such_channel(&queue),
            },
            Command::List(None) => {
                let names = radio.track_names();
                if names.is_empty() {
                    "The library is empty.".to_string()
                } else {
                    format!("The library has {} songs:\n{}", names.len(), names.join("\n"))
                }
            }
            Command::GimmeOne => match radio.play_random() {
                Ok(now) => format!("How about {} {}", now.label, now.track.link),
                Err(_) => "The library is empty, add something first!".to_string(),
            },
            Command::GimmeMine => match radio.shuffle(user) {
                Ok(now) => format!("From your station: {} {}", now.label, now.track.link),
                Err(_) => "You don't have anything in your station yet, try `.radio add`.".to_string(),
            },
            Command::Help => HELP_TEXT.to_string(),
        }
    }

    fn playback<F>(&self, queue: Option<String>, user: &str, step: F) -> String
    where
        F: FnOnce(&str) -> rbplaylist::Result<NowPlaying>,
    {
        let queue = queue.unwrap_or_else(|| user.to_string());
        match step(&queue) {
            Ok(now) => format!("Now playing on \"{}\": {} {}", queue, now.label, now.track.link),
            Err(Error::EmptyCollection(_)) => format!("The \"{}\" channel is empty.", queue),
            Err(Error::NotFound(_)) if !self.coordinator.queue_names().contains(&queue) => {
                no_such_channel(&queue)
            }
            Err(_) => format!("Nothing playable in the \"{}\" channel.", queue),
        }
    }
}

fn no_such_channel(queue: &str) -> String {
    format!("There is no \"{}\" channel yet.", queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbplaylist::Track;

    fn bot() -> ChatBot {
        let radio = Coordinator::new();
        radio.seed(Track::from_link(
            "https://www.youtube.com/watch?v=fB63ztKnGvo",
            "disclosure",
            "omen",
            "",
        ));
        ChatBot::new(radio, "radiobot")
    }

    fn say(bot: &ChatBot, channel: &str, text: &str) -> Option<String> {
        bot.handle(&ChatMessage {
            user: "cyle".into(),
            channel: channel.into(),
            text: text.into(),
        })
    }

    #[test]
    fn test_channel_kind() {
        assert_eq!(ChannelKind::from_channel("C024BE91L"), ChannelKind::Channel);
        assert_eq!(ChannelKind::from_channel("G1"), ChannelKind::Group);
        assert_eq!(ChannelKind::from_channel("D1"), ChannelKind::Direct);
        assert_eq!(ChannelKind::from_channel("general"), ChannelKind::Channel);
    }

    #[test]
    fn test_private_messages_are_refused() {
        let bot = bot();
        assert_eq!(
            say(&bot, "D123", ".radio add disclosure - omen").as_deref(),
            Some(DIRECT_MESSAGE_REFUSAL)
        );
        assert_eq!(say(&bot, "D123", "just chatting"), None);
    }

    #[test]
    fn test_add_replies() {
        let bot = bot();
        assert_eq!(
            say(&bot, "C1", ".radio add disclosure - omen").as_deref(),
            Some("Added that to the \"cyle\" channel!")
        );
        assert_eq!(
            say(&bot, "C1", ".radio add to party unknown - song").as_deref(),
            Some("Could not add that to the \"party\" channel for some reason...")
        );
    }

    #[test]
    fn test_set_replies() {
        let bot = bot();
        assert_eq!(
            say(&bot, "C1", ".radio set <https://youtu.be/dQw4w9WgXcQ> Rick Astley - Never Gonna Give You Up")
                .as_deref(),
            Some(LIBRARY_ADDED)
        );
        assert_eq!(
            say(&bot, "C1", ".radio set https://vimeo.com/1 a - b").as_deref(),
            Some(LIBRARY_FAILED)
        );
        assert_eq!(
            say(&bot, "C1", ".radio add Rick Astley - Never Gonna Give You Up").as_deref(),
            Some("Added that to the \"cyle\" channel!")
        );
    }

    #[test]
    fn test_playback_replies() {
        let bot = bot();
        assert_eq!(
            say(&bot, "C1", ".radio next").as_deref(),
            Some("There is no \"cyle\" channel yet.")
        );
        say(&bot, "C1", ".radio add disclosure - omen");
        assert_eq!(
            say(&bot, "C1", ".radio next").as_deref(),
            Some("Now playing on \"cyle\": disclosure - omen (added by unknown) https://www.youtube.com/watch?v=fB63ztKnGvo")
        );
        let mine = say(&bot, "C1", "radiobot gimme one of mine").unwrap();
        assert!(mine.starts_with("From your station: disclosure - omen"));
    }

    #[test]
    fn test_list_and_help() {
        let bot = bot();
        say(&bot, "C1", ".radio add disclosure - omen");
        assert_eq!(
            say(&bot, "C1", ".radio list cyle").as_deref(),
            Some("The \"cyle\" channel has 1 songs:\n▶ 1. disclosure - omen")
        );
        assert_eq!(
            say(&bot, "C1", ".radio list").as_deref(),
            Some("The library has 1 songs:\ndisclosure - omen")
        );
        assert_eq!(say(&bot, "C1", ".radio").as_deref(), Some(HELP_TEXT));
        assert!(say(&bot, "C1", "radiobot gimme one").unwrap().starts_with("How about"));
    }
}
