//! Coordinator : propriétaire unique du catalogue et des files de la radio
//!
//! Toutes les opérations prennent le verrou d'état une seule fois, ne
//! suspendent jamais sous verrou, puis diffusent leurs évènements une fois
//! le verrou relâché.

use crate::catalog::{Catalog, Upsert};
use crate::persistence::SnapshotStore;
use crate::playlist::Playlist;
use crate::resolver;
use crate::snapshot::{RestoreReport, Snapshot};
use crate::track::{non_blank, Track, TrackPatch};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Morceau en cours de diffusion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct NowPlaying {
    pub track: Track,
    /// `"artiste - titre (added by contributeur)"`
    pub label: String,
    /// File d'où vient le morceau, `None` pour une lecture directe
    pub queue: Option<String>,
    pub position: Option<usize>,
    pub played_at: DateTime<Utc>,
}

impl NowPlaying {
    fn new(track: Track, queue: Option<String>, position: Option<usize>) -> Self {
        let label = format!(
            "{} (added by {})",
            track.display_name(),
            track.contributor_name()
        );
        Self {
            track,
            label,
            queue,
            position,
            played_at: Utc::now(),
        }
    }
}

/// Évènements diffusés par le [`Coordinator`]
#[derive(Debug, Clone)]
pub enum RadioEvent {
    /// Un morceau démarre
    NowPlaying(NowPlaying),
    /// Le catalogue ou une file a changé ; `queue` est `None` quand le
    /// changement touche le catalogue
    Updated { queue: Option<String> },
}

impl RadioEvent {
    pub fn queue(&self) -> Option<&str> {
        match self {
            RadioEvent::NowPlaying(np) => np.queue.as_deref(),
            RadioEvent::Updated { queue } => queue.as_deref(),
        }
    }
}

/// Résumé d'une file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct QueueSummary {
    pub name: String,
    pub len: usize,
    pub cursor: usize,
    pub current: Option<Track>,
}

/// Une entrée de file ; `track` est absent si l'id n'est plus au catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct QueueEntry {
    pub position: usize,
    pub id: String,
    pub track: Option<Track>,
}

/// Contenu détaillé d'une file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct QueueOverview {
    pub name: String,
    pub cursor: usize,
    pub entries: Vec<QueueEntry>,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
    Shuffle,
}

#[derive(Default)]
struct RadioState {
    catalog: Catalog,
    queues: BTreeMap<String, Playlist>,
}

struct CoordinatorInner {
    state: RwLock<RadioState>,
    now_playing: RwLock<Option<NowPlaying>>,
    dirty: AtomicBool,
    event_tx: broadcast::Sender<RadioEvent>,
}

/// Moteur de la radio
///
/// Clonable à volonté : tous les clones partagent le même état.
///
/// ```
/// use rbplaylist::Coordinator;
///
/// let radio = Coordinator::new();
/// let track = radio
///     .resolve_and_add("general", "https://youtu.be/fB63ztKnGvo", "cyle")
///     .unwrap();
/// let now = radio.play_now("general").unwrap();
/// assert_eq!(now.track, track);
/// ```
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl Clone for Coordinator {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                state: RwLock::new(RadioState::default()),
                now_playing: RwLock::new(None),
                dirty: AtomicBool::new(false),
                event_tx: broadcast::channel(256).0,
            }),
        }
    }

    /// Ajoute des morceaux au catalogue, renvoie le nombre accepté
    pub fn seed<I: IntoIterator<Item = Track>>(&self, tracks: I) -> usize {
        let mut state = self.write();
        let accepted = tracks
            .into_iter()
            .filter(|t| state.catalog.add(t.clone()))
            .count();
        drop(state);

        if accepted > 0 {
            self.touch(None);
        }
        accepted
    }

    /// S'abonne aux évènements de la radio
    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.inner.event_tx.subscribe()
    }

    // ------------------------------------------------------------------
    // Catalogue
    // ------------------------------------------------------------------

    /// Interprète `reference` et l'ajoute en fin de file
    ///
    /// La file est créée au besoin. Un morceau découvert par son lien entre
    /// au catalogue, crédité à `contributor`.
    pub fn resolve_and_add(&self, queue: &str, reference: &str, contributor: &str) -> Result<Track> {
        let queue = non_blank(queue)
            .map(str::trim)
            .ok_or_else(|| Error::invalid("empty queue name"))?;

        let mut state = self.write();
        let resolution = state.catalog.resolve(reference)?;
        let track = if resolution.is_new {
            let track = resolution.track.with_contributor(contributor);
            state.catalog.add(track.clone());
            track
        } else {
            resolution.track
        };
        state
            .queues
            .entry(queue.to_string())
            .or_insert_with(|| Playlist::new(queue))
            .add(track.id.clone());
        drop(state);

        info!(
            "➕ {} added to {} ({:?}{})",
            track.display_name(),
            queue,
            resolution.via,
            if resolution.is_new { ", new" } else { "" }
        );
        self.touch(Some(queue));
        Ok(track)
    }

    /// Enregistre un lien au catalogue sans toucher aux files
    ///
    /// Un morceau déjà connu garde son contributeur ; seuls l'artiste et le
    /// titre fournis (non vides) sont mis à jour.
    pub fn add_track(
        &self,
        link: &str,
        artist: &str,
        title: &str,
        contributor: &str,
    ) -> Result<Track> {
        let fresh = Track::from_link(link, artist, title, contributor)
            .ok_or_else(|| Error::invalid(format!("unsupported link: {}", link.trim())))?;

        let mut state = self.write();
        let track = match state.catalog.get(&fresh.id).cloned() {
            Some(mut known) => {
                if let Some(artist) = fresh.artist() {
                    known.artist = artist.to_string();
                }
                if let Some(title) = fresh.title() {
                    known.title = title.to_string();
                }
                known
            }
            None => fresh,
        };
        state.catalog.add(track.clone());
        drop(state);

        debug!("Library now has {}", track.display_name());
        self.touch(None);
        Ok(track)
    }

    /// Associe un lien à un couple artiste/titre
    ///
    /// Si le lien désigne une autre vidéo que celle déjà connue pour ce
    /// couple, l'id change et toutes les files sont mises à jour.
    pub fn set_track(
        &self,
        link: &str,
        artist: &str,
        title: &str,
        contributor: &str,
    ) -> Result<Upsert> {
        let mut state = self.write();
        let upsert = state
            .catalog
            .upsert_by_artist_title(artist, title, link, contributor)?;
        if let Some(old) = &upsert.replaced {
            for queue in state.queues.values_mut() {
                queue.replace_id(old, &upsert.track.id);
            }
        }
        drop(state);

        match &upsert.replaced {
            Some(old) => info!(
                "🔁 {} now points to {} (was {})",
                upsert.track.display_name(),
                upsert.track.id,
                old
            ),
            None => info!("📚 {} set in library", upsert.track.display_name()),
        }
        self.touch(None);
        Ok(upsert)
    }

    /// Corrige les métadonnées d'un morceau
    pub fn correct_track(&self, id: &str, patch: TrackPatch) -> Result<Track> {
        let track = self.write().catalog.update(id, patch)?;
        self.touch(None);
        Ok(track)
    }

    /// Retire un morceau (par id ou par lien) du catalogue et de toutes les files
    pub fn remove_track(&self, reference: &str) -> Result<Track> {
        let reference = reference.trim();
        let mut state = self.write();

        let id = match state.catalog.get(reference) {
            Some(track) => track.id.clone(),
            None => state
                .catalog
                .find_by_link(reference)
                .map(|t| t.id.clone())
                .ok_or_else(|| Error::not_found(format!("track {}", reference)))?,
        };
        let track = state
            .catalog
            .remove_by_id(&id)
            .ok_or_else(|| Error::not_found(format!("track {}", id)))?;

        let purged: usize = state.queues.values_mut().map(|q| q.purge(&id)).sum();
        drop(state);

        info!(
            "🗑️ {} removed from library ({} queue entries purged)",
            track.display_name(),
            purged
        );
        self.touch(None);
        Ok(track)
    }

    /// Retire la première occurrence d'un morceau dans une file
    ///
    /// `reference` est un id, un lien ou une phrase `artiste - titre`.
    pub fn remove_from_queue(&self, queue: &str, reference: &str) -> Result<String> {
        let reference = reference.trim();
        let mut state = self.write();
        let RadioState { catalog, queues } = &mut *state;

        let playlist = queues
            .get_mut(queue)
            .ok_or_else(|| Error::not_found(format!("queue {}", queue)))?;

        let id = if playlist.contains(reference) {
            reference.to_string()
        } else {
            match resolver::extract_id(reference) {
                Some(id) => id,
                None => catalog.resolve(reference)?.track.id,
            }
        };

        if !playlist.remove_by_id(&id) {
            return Err(Error::not_found(format!("{} is not in queue {}", id, queue)));
        }
        drop(state);

        self.touch(Some(queue));
        Ok(id)
    }

    /// Retire l'entrée `index` d'une file
    pub fn remove_from_queue_at(&self, queue: &str, index: usize) -> Result<String> {
        let removed = self
            .write()
            .queues
            .get_mut(queue)
            .ok_or_else(|| Error::not_found(format!("queue {}", queue)))?
            .remove_by_index(index)
            .ok_or_else(|| Error::not_found(format!("no entry {} in queue {}", index, queue)))?;

        self.touch(Some(queue));
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Lecture
    // ------------------------------------------------------------------

    pub fn next(&self, queue: &str) -> Result<NowPlaying> {
        self.step(queue, Step::Next)
    }

    pub fn previous(&self, queue: &str) -> Result<NowPlaying> {
        self.step(queue, Step::Previous)
    }

    pub fn shuffle(&self, queue: &str) -> Result<NowPlaying> {
        self.step(queue, Step::Shuffle)
    }

    /// Morceau sous le curseur d'une file, sans rien déplacer
    pub fn current(&self, queue: &str) -> Result<Option<Track>> {
        let state = self.read();
        let playlist = state
            .queues
            .get(queue)
            .ok_or_else(|| Error::not_found(format!("queue {}", queue)))?;
        Ok(playlist
            .current()
            .and_then(|id| state.catalog.get(id))
            .cloned())
    }

    /// Diffuse immédiatement un morceau
    ///
    /// `target` est d'abord cherché comme nom de file (son entrée courante
    /// est jouée), puis comme id, puis comme lien déjà au catalogue. Aucun
    /// curseur n'est déplacé.
    pub fn play_now(&self, target: &str) -> Result<NowPlaying> {
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::invalid("empty play target"));
        }

        let now = {
            let state = self.read();
            if let Some(playlist) = state.queues.get(target) {
                let id = playlist
                    .current()
                    .ok_or_else(|| Error::empty(format!("queue {}", target)))?;
                let track = state
                    .catalog
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::not_found(format!("track {}", id)))?;
                NowPlaying::new(track, Some(target.to_string()), Some(playlist.cursor()))
            } else {
                let track = state
                    .catalog
                    .get(target)
                    .or_else(|| {
                        resolver::extract_id(target).and_then(|id| state.catalog.get(&id))
                    })
                    .cloned()
                    .ok_or_else(|| Error::not_found(format!("nothing to play for {}", target)))?;
                NowPlaying::new(track, None, None)
            }
        };

        Ok(self.announce(now))
    }

    /// Joue un morceau du catalogue au hasard
    pub fn play_random(&self) -> Result<NowPlaying> {
        let track = self
            .random_track()
            .ok_or_else(|| Error::empty("library"))?;
        Ok(self.announce(NowPlaying::new(track, None, None)))
    }

    pub fn random_track(&self) -> Option<Track> {
        self.read().catalog.random_track().cloned()
    }

    /// Dernier morceau annoncé
    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.inner
            .now_playing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ------------------------------------------------------------------
    // Consultation
    // ------------------------------------------------------------------

    pub fn tracks(&self) -> Vec<Track> {
        self.read().catalog.tracks().into_iter().cloned().collect()
    }

    pub fn track(&self, id: &str) -> Option<Track> {
        self.read().catalog.get(id).cloned()
    }

    pub fn track_names(&self) -> Vec<String> {
        self.read().catalog.names()
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.read().queues.keys().cloned().collect()
    }

    pub fn queues(&self) -> Vec<QueueSummary> {
        let state = self.read();
        state
            .queues
            .values()
            .map(|q| QueueSummary {
                name: q.name().to_string(),
                len: q.len(),
                cursor: q.cursor(),
                current: q.current().and_then(|id| state.catalog.get(id)).cloned(),
            })
            .collect()
    }

    pub fn queue_overview(&self, queue: &str) -> Result<QueueOverview> {
        let state = self.read();
        let playlist = state
            .queues
            .get(queue)
            .ok_or_else(|| Error::not_found(format!("queue {}", queue)))?;

        Ok(QueueOverview {
            name: playlist.name().to_string(),
            cursor: playlist.cursor(),
            entries: playlist
                .songs()
                .iter()
                .enumerate()
                .map(|(position, id)| QueueEntry {
                    position,
                    id: id.clone(),
                    track: state.catalog.get(id).cloned(),
                })
                .collect(),
        })
    }

    // ------------------------------------------------------------------
    // Sauvegarde
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        Snapshot::capture(&state.catalog, &state.queues)
    }

    /// Remplace tout l'état par celui de la sauvegarde
    pub fn restore(&self, snapshot: Snapshot) -> RestoreReport {
        let (catalog, queues, report) = snapshot.rebuild();
        {
            let mut state = self.write();
            state.catalog = catalog;
            state.queues = queues;
        }
        self.inner.dirty.store(false, Ordering::SeqCst);
        let _ = self.inner.event_tx.send(RadioEvent::Updated { queue: None });

        if report.skipped_tracks > 0 || report.skipped_entries > 0 {
            warn!(
                "Snapshot restored with {} unusable tracks and {} dangling queue entries",
                report.skipped_tracks, report.skipped_entries
            );
        }
        report
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Écrit la sauvegarde si l'état a changé depuis la dernière écriture
    ///
    /// Renvoie `true` si un fichier a été écrit. En cas d'échec l'état
    /// reste marqué comme modifié.
    pub async fn flush(&self, store: &SnapshotStore) -> Result<bool> {
        if !self.inner.dirty.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }

        // Clone sous verrou, écriture hors verrou
        let snapshot = self.snapshot();
        match store.save(&snapshot).await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.inner.dirty.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Tâche de fond qui sauvegarde périodiquement
    pub fn spawn_snapshot_task(&self, store: SnapshotStore, interval: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match coordinator.flush(&store).await {
                    Ok(true) => debug!("💾 Snapshot saved to {}", store.path().display()),
                    Ok(false) => {}
                    Err(e) => warn!("Failed to save snapshot: {}", e),
                }
            }
        })
    }

    // ------------------------------------------------------------------
    // Interne
    // ------------------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, RadioState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RadioState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn step(&self, queue: &str, step: Step) -> Result<NowPlaying> {
        let now = {
            let mut state = self.write();
            let RadioState { catalog, queues } = &mut *state;

            let playlist = queues
                .get_mut(queue)
                .ok_or_else(|| Error::not_found(format!("queue {}", queue)))?;
            if playlist.is_empty() {
                return Err(Error::empty(format!("queue {}", queue)));
            }

            // Les entrées absentes du catalogue sont sautées
            let mut track = None;
            for attempt in 0..playlist.len() {
                let id = match (step, attempt) {
                    (Step::Shuffle, 0) => playlist.shuffle(),
                    (Step::Previous, _) => playlist.previous(),
                    _ => playlist.next(),
                };
                if let Some(found) = id.and_then(|id| catalog.get(id)) {
                    track = Some(found.clone());
                    break;
                }
            }
            let track = track
                .ok_or_else(|| Error::not_found(format!("no playable track in queue {}", queue)))?;

            NowPlaying::new(track, Some(queue.to_string()), Some(playlist.cursor()))
        };

        self.inner.dirty.store(true, Ordering::SeqCst);
        Ok(self.announce(now))
    }

    fn announce(&self, now: NowPlaying) -> NowPlaying {
        info!("🎵 Now playing: {}", now.label);
        *self
            .inner
            .now_playing
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(now.clone());
        let _ = self.inner.event_tx.send(RadioEvent::NowPlaying(now.clone()));
        now
    }

    /// Marque l'état modifié et prévient les abonnés
    fn touch(&self, queue: Option<&str>) {
        self.inner.dirty.store(true, Ordering::SeqCst);
        let _ = self.inner.event_tx.send(RadioEvent::Updated {
            queue: queue.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OMEN: &str = "https://youtu.be/fB63ztKnGvo";
    const RICK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn radio() -> Coordinator {
        let radio = Coordinator::new();
        radio.seed(vec![
            Track::from_link(OMEN, "Disclosure", "Omen", "").unwrap(),
            Track::from_link(RICK, "Rick Astley", "Never Gonna Give You Up", "").unwrap(),
        ]);
        radio
    }

    #[test]
    fn test_resolve_and_add_creates_queue() {
        let radio = radio();
        let track = radio.resolve_and_add("cyle", "Disclosure - Omen", "cyle").unwrap();
        assert_eq!(track.id, "fB63ztKnGvo");
        assert_eq!(radio.queue_names(), vec!["cyle"]);

        let fresh = radio
            .resolve_and_add("cyle", "https://youtu.be/9bZkp7q19f0?t=10", "bob")
            .unwrap();
        assert_eq!(fresh.contributor, "bob");
        assert_eq!(radio.tracks().len(), 3);

        // Un lien déjà connu ne change pas le contributeur
        let again = radio.resolve_and_add("cyle", OMEN, "mallory").unwrap();
        assert_eq!(again.contributor_name(), "unknown");

        assert!(matches!(
            radio.resolve_and_add("cyle", "Unknown Band - Unknown Song", "x"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            radio.resolve_and_add("  ", OMEN, "x"),
            Err(Error::InvalidReference(_))
        ));
        assert_eq!(radio.queue_overview("cyle").unwrap().entries.len(), 3);
    }

    #[test]
    fn test_next_skips_missing_tracks() {
        let radio = radio();
        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.resolve_and_add("general", "https://youtu.be/9bZkp7q19f0", "").unwrap();
        radio.resolve_and_add("general", RICK, "").unwrap();

        // Retrait direct du catalogue, sans purge des files
        radio.write().catalog.remove_by_id("9bZkp7q19f0");

        let now = radio.next("general").unwrap();
        assert_eq!(now.track.id, "dQw4w9WgXcQ");
        assert_eq!(now.position, Some(2));

        let back = radio.previous("general").unwrap();
        assert_eq!(back.track.id, "fB63ztKnGvo");
    }

    #[test]
    fn test_step_errors() {
        let radio = radio();
        assert!(matches!(radio.next("nope"), Err(Error::NotFound(_))));

        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.remove_from_queue_at("general", 0).unwrap();
        assert!(matches!(
            radio.shuffle("general"),
            Err(Error::EmptyCollection(_))
        ));

        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.write().catalog.remove_by_id("fB63ztKnGvo");
        assert!(matches!(radio.next("general"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_play_now_does_not_move_cursor() {
        let radio = radio();
        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.resolve_and_add("general", RICK, "").unwrap();

        let now = radio.play_now("general").unwrap();
        assert_eq!(now.track.id, "fB63ztKnGvo");
        assert_eq!(now.label, "Disclosure - Omen (added by unknown)");
        assert_eq!(radio.queue_overview("general").unwrap().cursor, 0);

        let direct = radio.play_now("dQw4w9WgXcQ").unwrap();
        assert_eq!(direct.queue, None);
        let by_link = radio.play_now("https://youtu.be/dQw4w9WgXcQ?t=5").unwrap();
        assert_eq!(by_link.track.id, "dQw4w9WgXcQ");

        assert!(matches!(radio.play_now("ghost"), Err(Error::NotFound(_))));
        assert_eq!(radio.now_playing().map(|n| n.track.id), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_remove_track_cascades() {
        let radio = radio();
        radio.resolve_and_add("a", OMEN, "").unwrap();
        radio.resolve_and_add("b", OMEN, "").unwrap();
        radio.resolve_and_add("b", RICK, "").unwrap();

        let removed = radio.remove_track("https://www.youtube.com/embed/fB63ztKnGvo").unwrap();
        assert_eq!(removed.id, "fB63ztKnGvo");
        assert!(radio.queue_overview("a").unwrap().entries.is_empty());
        assert_eq!(radio.queue_overview("b").unwrap().entries.len(), 1);
        assert!(matches!(radio.remove_track("fB63ztKnGvo"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_set_track_rekeys_queues() {
        let radio = radio();
        radio.resolve_and_add("general", "Disclosure - Omen", "").unwrap();

        let upsert = radio
            .set_track("https://youtu.be/9bZkp7q19f0", "Disclosure", "Omen", "cyle")
            .unwrap();
        assert_eq!(upsert.replaced.as_deref(), Some("fB63ztKnGvo"));

        let overview = radio.queue_overview("general").unwrap();
        assert_eq!(overview.entries[0].id, "9bZkp7q19f0");
        assert!(overview.entries[0].track.is_some());
    }

    #[test]
    fn test_set_track_keeps_other_tracks_queued() {
        let radio = radio();
        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.resolve_and_add("general", RICK, "").unwrap();

        assert!(matches!(
            radio.set_track(RICK, "Disclosure", "Omen", "cyle"),
            Err(Error::InvalidReference(_))
        ));
        assert_eq!(radio.tracks().len(), 2);

        let ids: Vec<String> = radio
            .queue_overview("general")
            .unwrap()
            .entries
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["fB63ztKnGvo", "dQw4w9WgXcQ"]);
        assert_eq!(
            radio.track("dQw4w9WgXcQ").unwrap().display_name(),
            "Rick Astley - Never Gonna Give You Up"
        );
    }

    #[test]
    fn test_remove_from_queue_by_phrase() {
        let radio = radio();
        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.resolve_and_add("general", RICK, "").unwrap();

        let id = radio.remove_from_queue("general", "disclosure - omen").unwrap();
        assert_eq!(id, "fB63ztKnGvo");
        assert!(matches!(
            radio.remove_from_queue("general", OMEN),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            radio.remove_from_queue("nope", OMEN),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_play_random() {
        assert!(matches!(
            Coordinator::new().play_random(),
            Err(Error::EmptyCollection(_))
        ));
        assert!(radio().play_random().is_ok());
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let radio = radio();
        let mut rx = radio.subscribe();

        radio.resolve_and_add("general", OMEN, "").unwrap();
        radio.play_now("general").unwrap();

        match rx.recv().await.unwrap() {
            RadioEvent::Updated { queue } => assert_eq!(queue.as_deref(), Some("general")),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await.unwrap() {
            RadioEvent::NowPlaying(now) => assert_eq!(now.track.id, "fB63ztKnGvo"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_flush_only_when_dirty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("radio.json"));

        let radio = radio();
        assert!(radio.flush(&store).await.unwrap());
        assert!(!radio.is_dirty());
        assert!(!radio.flush(&store).await.unwrap());

        radio.resolve_and_add("general", OMEN, "").unwrap();
        assert!(radio.flush(&store).await.unwrap());

        let copy = Coordinator::new();
        let report = copy.restore(store.load().await.unwrap().unwrap());
        assert_eq!(report.tracks, 2);
        assert_eq!(copy.queue_names(), vec!["general"]);
        assert!(!copy.is_dirty());
    }
}
