//! Sauvegarde du catalogue et des files
//!
//! Format JSON :
//!
//! ```json
//! {
//!   "library": [{"id": "...", "provider": "youtube", "link": "...", "artist": "...", "title": "...", "contributor": "..."}],
//!   "playlists": [{"name": "general", "songs": ["..."], "currentIndex": 0}]
//! }
//! ```
//!
//! La lecture est tolérante : une entrée mal formée est ignorée sans faire
//! échouer le reste. Les anciennes sauvegardes à une seule file (`playlist`)
//! et le champ `type` à la place de `provider` sont acceptés.

use crate::catalog::Catalog;
use crate::playlist::{Playlist, QueueRecord};
use crate::resolver;
use crate::track::Track;
use crate::{Error, Result, DEFAULT_QUEUE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Image figée de l'état de la radio
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub library: Vec<Track>,
    #[serde(default)]
    pub playlists: Vec<QueueRecord>,
}

/// Bilan d'une restauration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub tracks: usize,
    pub queues: usize,
    /// Morceaux sans id ni lien exploitable
    pub skipped_tracks: usize,
    /// Entrées de file absentes du catalogue restauré
    pub skipped_entries: usize,
}

impl Snapshot {
    /// Capture le catalogue et les files, dans un ordre stable
    pub fn capture(catalog: &Catalog, queues: &BTreeMap<String, Playlist>) -> Self {
        Self {
            library: catalog.tracks().into_iter().cloned().collect(),
            playlists: queues.values().map(Playlist::to_record).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::PersistenceError(format!("Failed to encode snapshot: {}", e)))
    }

    /// Décode une sauvegarde en ignorant les entrées illisibles
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_default(json, DEFAULT_QUEUE)
    }

    /// Comme [`Snapshot::from_json`], une liste `playlist` anonyme étant
    /// rangée dans la file `default_queue`
    pub fn from_json_with_default(json: &str, default_queue: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| Error::PersistenceError(format!("Invalid snapshot: {}", e)))?;

        let Value::Object(root) = document else {
            return Err(Error::PersistenceError(
                "Invalid snapshot: expected a JSON object".to_string(),
            ));
        };

        let library = match root.get("library") {
            Some(Value::Array(entries)) => entries.iter().filter_map(parse_track).collect(),
            // Ancien format : objet indexé par id
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(key, value)| {
                    parse_track(value).map(|mut track| {
                        if track.id.trim().is_empty() {
                            track.id = key.clone();
                        }
                        track
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut playlists: Vec<QueueRecord> = match root.get("playlists") {
            Some(Value::Array(entries)) => entries.iter().filter_map(parse_queue).collect(),
            _ => Vec::new(),
        };

        if let Some(single) = root.get("playlist") {
            let record = match single {
                Value::Array(_) => parse_songs(single).map(|songs| QueueRecord {
                    name: default_queue.to_string(),
                    songs,
                    current_index: 0,
                }),
                other => parse_queue(other),
            };
            match record {
                Some(record) if !playlists.iter().any(|p| p.name == record.name) => {
                    playlists.push(record)
                }
                Some(record) => debug!("Ignoring duplicate queue {} in snapshot", record.name),
                None => warn!("Ignoring malformed single playlist in snapshot"),
            }
        }

        Ok(Self { library, playlists })
    }

    /// Reconstruit catalogue et files
    ///
    /// Une entrée de file qui ne correspond à aucun morceau du catalogue
    /// restauré est supprimée ; le curseur est décalé pour rester sur le
    /// même morceau lorsque c'est possible.
    pub fn rebuild(self) -> (Catalog, BTreeMap<String, Playlist>, RestoreReport) {
        let mut report = RestoreReport::default();
        let mut catalog = Catalog::new();

        for track in self.library {
            if !catalog.add(track) {
                report.skipped_tracks += 1;
            }
        }
        // les doublons d'id se sont écrasés
        report.tracks = catalog.len();

        let mut queues = BTreeMap::new();
        for record in self.playlists {
            let name = record.name.trim();
            if name.is_empty() {
                continue;
            }

            let mut cursor = record.current_index;
            let mut songs = Vec::with_capacity(record.songs.len());
            for (index, id) in record.songs.into_iter().enumerate() {
                if catalog.contains(&id) {
                    songs.push(id);
                } else {
                    report.skipped_entries += 1;
                    if (index as i64) < record.current_index {
                        cursor -= 1;
                    }
                }
            }

            queues.insert(name.to_string(), Playlist::with_songs(name, songs, cursor));
        }
        report.queues = queues.len();

        (catalog, queues, report)
    }
}

/// Un morceau de la bibliothèque, `None` si inexploitable
fn parse_track(value: &Value) -> Option<Track> {
    if !value.is_object() {
        warn!("Skipping malformed track entry in snapshot");
        return None;
    }
    let mut track: Track = match serde_json::from_value(value.clone()) {
        Ok(track) => track,
        Err(e) => {
            warn!("Skipping malformed track entry in snapshot: {}", e);
            return None;
        }
    };

    if track.id.trim().is_empty() {
        if let Some(id) = resolver::extract_id(&track.link) {
            track.id = id;
        }
    }
    Some(track)
}

fn parse_queue(value: &Value) -> Option<QueueRecord> {
    let name = value.get("name")?.as_str()?.to_string();
    let songs = match value.get("songs") {
        Some(songs) => parse_songs(songs)?,
        None => Vec::new(),
    };
    let current_index = value
        .get("currentIndex")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(QueueRecord {
        name,
        songs,
        current_index,
    })
}

fn parse_songs(value: &Value) -> Option<Vec<String>> {
    let entries = value.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_string))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Provider;

    fn sample_state() -> (Catalog, BTreeMap<String, Playlist>) {
        let catalog: Catalog = vec![
            Track::from_link("https://youtu.be/fB63ztKnGvo", "Disclosure", "Omen", "cyle").unwrap(),
            Track::from_link("https://youtu.be/dQw4w9WgXcQ", "", "", "").unwrap(),
            Track::new("mp3-1", Provider::Other("mp3".into()), "https://x/y"),
        ]
        .into_iter()
        .collect();

        let mut queues = BTreeMap::new();
        queues.insert(
            "general".to_string(),
            Playlist::with_songs(
                "general",
                vec!["dQw4w9WgXcQ".into(), "fB63ztKnGvo".into(), "mp3-1".into()],
                1,
            ),
        );
        queues.insert("cyle".to_string(), Playlist::new("cyle"));
        (catalog, queues)
    }

    #[test]
    fn test_round_trip() {
        let (catalog, queues) = sample_state();
        let json = Snapshot::capture(&catalog, &queues).to_json().unwrap();

        let (restored, restored_queues, report) = Snapshot::from_json(&json).unwrap().rebuild();

        assert_eq!(restored.len(), catalog.len());
        for track in catalog.tracks() {
            assert_eq!(restored.get(&track.id), Some(track));
        }
        assert_eq!(restored_queues, queues);
        assert_eq!(report.skipped_entries, 0);
        assert_eq!(report.queues, 2);
    }

    #[test]
    fn test_serialized_field_names() {
        let (catalog, queues) = sample_state();
        let value = serde_json::to_value(Snapshot::capture(&catalog, &queues)).unwrap();
        let general = value["playlists"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "general")
            .unwrap();
        assert_eq!(general["currentIndex"], 1);
        assert_eq!(value["library"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let json = r#"{
            "library": [
                {"id": "fB63ztKnGvo", "type": "youtube", "link": "https://www.youtube.com/watch?v=fB63ztKnGvo", "artist": null},
                42,
                {"link": "https://youtu.be/dQw4w9WgXcQ"},
                {"id": "", "link": ""},
                {"id": "x", "link": {"nested": true}}
            ],
            "playlists": [
                {"name": "general", "songs": ["ghost", "fB63ztKnGvo", "dQw4w9WgXcQ"], "currentIndex": 2},
                {"songs": ["fB63ztKnGvo"]},
                "nope"
            ]
        }"#;

        let (catalog, queues, report) = Snapshot::from_json(json).unwrap().rebuild();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("dQw4w9WgXcQ"), "id derived from link");
        assert_eq!(report.skipped_tracks, 2);
        assert_eq!(report.skipped_entries, 1);

        let general = &queues["general"];
        assert_eq!(general.songs(), ["fB63ztKnGvo", "dQw4w9WgXcQ"]);
        // Le curseur suit le même morceau malgré la suppression de « ghost »
        assert_eq!(general.current(), Some("dQw4w9WgXcQ"));
        assert_eq!(queues.len(), 1);
    }

    #[test]
    fn test_single_playlist_variants() {
        let json = r#"{
            "library": {"fB63ztKnGvo": {"type": "youtube", "link": "https://youtu.be/fB63ztKnGvo"}},
            "playlist": ["fB63ztKnGvo", "fB63ztKnGvo"]
        }"#;
        let (catalog, queues, _) = Snapshot::from_json(json).unwrap().rebuild();
        assert!(catalog.contains("fB63ztKnGvo"));
        assert_eq!(queues[DEFAULT_QUEUE].len(), 2);

        let json = r#"{"library": [], "playlist": {"name": "room", "songs": [], "currentIndex": 5}}"#;
        let (_, queues, _) = Snapshot::from_json(json).unwrap().rebuild();
        assert_eq!(queues["room"].cursor(), 0);
    }

    #[test]
    fn test_rejects_non_object_document() {
        assert!(matches!(
            Snapshot::from_json("[1, 2]"),
            Err(Error::PersistenceError(_))
        ));
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(Error::PersistenceError(_))
        ));
    }
}
