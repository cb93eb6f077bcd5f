//! # rbplaylist - Moteur de la radio partagée
//!
//! Cette crate fournit le cœur de RadioBot :
//! - Reconnaissance des liens (YouTube) et dérivation d'un id stable
//! - Catalogue dédoublonné des morceaux
//! - Une file par salon ou par utilisateur, avec curseur circulaire
//! - Annonce « now playing » diffusée aux abonnés
//! - Sauvegarde JSON tolérante aux entrées abîmées
//!
//! # Architecture
//!
//! - **Coordinator** : propriétaire unique du catalogue et des files
//! - **Catalog** : morceaux indexés par id, résolution des références libres
//! - **Playlist** : suite d'ids et curseur
//! - **SnapshotStore** : fichier de sauvegarde
//!
//! # Exemple d'utilisation
//!
//! ```
//! use rbplaylist::{Coordinator, Track};
//!
//! let radio = Coordinator::new();
//! radio.seed(Track::from_link("https://youtu.be/fB63ztKnGvo", "Disclosure", "Omen", ""));
//!
//! // Par phrase, par lien ou par id
//! radio.resolve_and_add("general", "Disclosure - Omen", "cyle").unwrap();
//! radio.resolve_and_add("general", "https://youtu.be/dQw4w9WgXcQ", "cyle").unwrap();
//!
//! let now = radio.next("general").unwrap();
//! assert_eq!(now.track.id, "dQw4w9WgXcQ");
//! ```

pub mod catalog;
mod coordinator;
mod error;
pub mod persistence;
pub mod playlist;
pub mod resolver;
pub mod snapshot;
mod track;

#[cfg(feature = "rbconfig")]
mod config_ext;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
mod auth;
#[cfg(feature = "server")]
pub mod openapi;
#[cfg(feature = "server")]
mod server_ext;
#[cfg(feature = "server")]
pub mod sse;

/// File utilisée quand aucune n'est précisée
pub const DEFAULT_QUEUE: &str = "general";

// Réexports publics
pub use catalog::{Catalog, Resolution, ResolvedBy, Upsert};
pub use coordinator::{
    Coordinator, NowPlaying, QueueEntry, QueueOverview, QueueSummary, RadioEvent,
};
pub use error::{Error, Result};
pub use persistence::SnapshotStore;
pub use playlist::Playlist;
pub use resolver::Provider;
pub use snapshot::{RestoreReport, Snapshot};
pub use track::{Track, TrackPatch, UNKNOWN_CONTRIBUTOR};

#[cfg(feature = "rbconfig")]
pub use config_ext::RadioConfigExt;

#[cfg(feature = "server")]
pub use auth::{PushSecret, SECRET_HEADER};
#[cfg(feature = "server")]
pub use server_ext::RadioServerExt;
