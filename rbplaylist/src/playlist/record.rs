//! Forme sérialisée d'une file

use serde::{Deserialize, Serialize};

/// `{name, songs, currentIndex}` dans les sauvegardes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct QueueRecord {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<String>,
    #[serde(rename = "currentIndex", default)]
    pub current_index: i64,
}
