//! # rbchat - Commandes de chat pour RadioBot
//!
//! Transforme les lignes `.radio ...` d'un salon en opérations sur le
//! [`Coordinator`](rbplaylist::Coordinator) et produit la réponse à publier.
//!
//! ```
//! use rbchat::{ChatBot, ChatMessage};
//! use rbplaylist::Coordinator;
//!
//! let bot = ChatBot::new(Coordinator::new(), "radiobot");
//! let reply = bot.handle(&ChatMessage {
//!     user: "cyle".into(),
//!     channel: "C024BE91L".into(),
//!     text: ".radio add <https://youtu.be/fB63ztKnGvo>".into(),
//! });
//! assert_eq!(reply.as_deref(), Some("Added that to the \"cyle\" channel!"));
//! ```

pub mod api;
pub mod bot;
pub mod command;
mod server_ext;

pub use bot::{ChannelKind, ChatBot, ChatMessage};
pub use command::{parse, Command};
pub use server_ext::ChatServerExt;
