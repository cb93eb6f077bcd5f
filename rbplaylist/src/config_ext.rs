//! Extension de rbconfig pour la radio

use crate::persistence::SnapshotStore;
use crate::track::Track;
use tracing::warn;

/// Trait d'extension pour rbconfig::Config
pub trait RadioConfigExt {
    /// Morceaux préchargés au démarrage ; les liens non reconnus sont ignorés
    fn seed_catalog(&self) -> Vec<Track>;

    /// Fichier de sauvegarde de la radio, avec la file par défaut configurée
    fn snapshot_store(&self) -> anyhow::Result<SnapshotStore>;
}

impl RadioConfigExt for rbconfig::Config {
    fn seed_catalog(&self) -> Vec<Track> {
        self.get_seed_tracks()
            .into_iter()
            .filter_map(|seed| {
                let track = Track::from_link(
                    &seed.link,
                    seed.artist.unwrap_or_default(),
                    seed.title.unwrap_or_default(),
                    "",
                );
                if track.is_none() {
                    warn!("Ignoring seed track with unsupported link {}", seed.link);
                }
                track
            })
            .collect()
    }

    fn snapshot_store(&self) -> anyhow::Result<SnapshotStore> {
        Ok(SnapshotStore::new(self.get_snapshot_path()?)
            .with_default_queue(self.get_default_queue()))
    }
}
