//! Catalogue : l'ensemble dédoublonné des morceaux connus, indexé par id

use crate::resolver;
use crate::track::{non_blank, Track, TrackPatch};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use rand::seq::IteratorRandom;
use rand::Rng;
use regex::Regex;
use std::collections::HashMap;

/// `artiste - titre` ; l'artiste s'arrête au dernier ` - `
static ARTIST_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+) - (.+)$").expect("artist/title pattern is valid"));

/// Découpe une phrase `artiste - titre`
pub fn split_artist_title(phrase: &str) -> Option<(String, String)> {
    let caps = ARTIST_TITLE_RE.captures(phrase.trim())?;
    let artist = caps.get(1)?.as_str().trim();
    let title = caps.get(2)?.as_str().trim();
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist.to_string(), title.to_string()))
}

/// Comment une référence a été interprétée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Id,
    Link,
    ArtistTitle,
}

/// Résultat de [`Catalog::resolve`]
///
/// `is_new` indique un morceau créé à partir d'un lien et pas encore présent
/// dans le catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub track: Track,
    pub is_new: bool,
    pub via: ResolvedBy,
}

/// Résultat de [`Catalog::upsert_by_artist_title`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub track: Track,
    /// Le morceau n'existait pas sous ce couple artiste/titre
    pub created: bool,
    /// Ancien id quand le nouveau lien pointe vers une autre vidéo
    pub replaced: Option<String>,
}

/// Le catalogue des morceaux
///
/// Chaque clé est l'id du morceau qu'elle indexe.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: HashMap<String, Track>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Tous les morceaux, triés par id
    pub fn tracks(&self) -> Vec<&Track> {
        let mut tracks: Vec<&Track> = self.tracks.values().collect();
        tracks.sort_by(|a, b| a.id.cmp(&b.id));
        tracks
    }

    /// Ajoute ou remplace un morceau
    ///
    /// Refuse (et renvoie `false`) un morceau sans id ou sans lien.
    pub fn add(&mut self, track: Track) -> bool {
        if !track.is_valid() {
            return false;
        }
        self.tracks.insert(track.id.clone(), track);
        true
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Track> {
        self.tracks.remove(id)
    }

    /// Retire le morceau dont le lien correspond, renvoie son id
    ///
    /// Un lien reconnu est comparé sous sa forme canonique.
    pub fn remove_by_link(&mut self, link: &str) -> Option<String> {
        let id = self.find_by_link(link)?.id.clone();
        self.tracks.remove(&id);
        Some(id)
    }

    /// Morceau dont le lien correspond, brut ou canonique
    pub fn find_by_link(&self, link: &str) -> Option<&Track> {
        let canonical = resolver::normalize(link);
        let raw = link.trim();
        self.tracks
            .values()
            .find(|t| t.link == raw || canonical.as_deref() == Some(t.link.as_str()))
    }

    /// Morceau dont l'artiste et le titre correspondent exactement
    pub fn find_by_artist_title(&self, artist: &str, title: &str) -> Option<&Track> {
        self.tracks
            .values()
            .find(|t| t.matches_artist_title(artist, title))
    }

    /// Recherche tolérante à la casse ; la correspondance exacte est préférée
    pub fn lookup_artist_title(&self, artist: &str, title: &str) -> Option<&Track> {
        self.find_by_artist_title(artist, title).or_else(|| {
            self.tracks
                .values()
                .find(|t| t.loosely_matches_artist_title(artist, title))
        })
    }

    /// Associe un lien à un couple artiste/titre
    ///
    /// Un morceau existant avec exactement ce couple reçoit le nouveau lien
    /// (et donc le nouvel id si le lien désigne une autre vidéo). Sinon un
    /// morceau est créé à partir du lien. Un lien déjà porté par un autre
    /// morceau est refusé.
    pub fn upsert_by_artist_title(
        &mut self,
        artist: &str,
        title: &str,
        link: &str,
        contributor: &str,
    ) -> Result<Upsert> {
        let (Some(artist), Some(title), Some(link)) =
            (non_blank(artist), non_blank(title), non_blank(link))
        else {
            return Err(Error::invalid("artist, title and link are all required"));
        };

        let fresh = Track::from_link(link, artist, title, contributor)
            .ok_or_else(|| Error::invalid(format!("unsupported link: {}", link.trim())))?;

        let existing = self.find_by_artist_title(artist, title).cloned();
        let (track, created, replaced) = match existing {
            Some(old) => {
                if old.id != fresh.id {
                    if let Some(other) = self.tracks.get(&fresh.id) {
                        return Err(Error::invalid(format!(
                            "{} is already in the library as {}",
                            link.trim(),
                            other.display_name()
                        )));
                    }
                }
                let replaced = (old.id != fresh.id).then(|| old.id.clone());
                if replaced.is_some() {
                    self.tracks.remove(&old.id);
                }
                let track = Track {
                    id: fresh.id,
                    provider: fresh.provider,
                    link: fresh.link,
                    ..old
                };
                (track, false, replaced)
            }
            None => {
                // Le lien est peut-être déjà connu sous d'autres métadonnées
                let track = match self.tracks.get(&fresh.id) {
                    Some(known) => Track {
                        artist: fresh.artist,
                        title: fresh.title,
                        ..known.clone()
                    },
                    None => fresh,
                };
                (track, true, None)
            }
        };

        self.tracks.insert(track.id.clone(), track.clone());
        Ok(Upsert {
            track,
            created,
            replaced,
        })
    }

    /// Corrige les métadonnées d'un morceau
    ///
    /// Un nouveau lien doit être reconnu et désigner le même média : l'id
    /// d'un morceau ne change pas.
    pub fn update(&mut self, id: &str, patch: TrackPatch) -> Result<Track> {
        let new_link = match patch.link.as_deref() {
            Some(link) => {
                let info = resolver::inspect(link)
                    .ok_or_else(|| Error::invalid(format!("unsupported link: {}", link.trim())))?;
                if info.id != id {
                    return Err(Error::invalid(format!(
                        "link {} does not point to track {}",
                        link.trim(),
                        id
                    )));
                }
                Some(info.link)
            }
            None => None,
        };

        let track = self
            .tracks
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("track {}", id)))?;

        if let Some(artist) = patch.artist {
            track.artist = artist.trim().to_string();
        }
        if let Some(title) = patch.title {
            track.title = title.trim().to_string();
        }
        if let Some(link) = new_link {
            track.link = link;
        }
        Ok(track.clone())
    }

    /// Un morceau tiré au hasard
    pub fn random_track(&self) -> Option<&Track> {
        self.random_track_with(&mut rand::rng())
    }

    pub fn random_track_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Track> {
        self.tracks.values().choose(rng)
    }

    /// Noms lisibles de tous les morceaux, triés
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tracks.values().map(Track::display_name).collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    /// Interprète une référence libre
    ///
    /// Dans l'ordre : un id existant, un lien reconnu (morceau existant ou
    /// nouveau), puis une phrase `artiste - titre` cherchée dans le
    /// catalogue. La première interprétation qui aboutit l'emporte.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] pour une phrase `artiste - titre` inconnue
    /// - [`Error::InvalidReference`] pour tout le reste
    pub fn resolve(&self, reference: &str) -> Result<Resolution> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Error::invalid("empty reference"));
        }

        if let Some(track) = self.tracks.get(reference) {
            return Ok(Resolution {
                track: track.clone(),
                is_new: false,
                via: ResolvedBy::Id,
            });
        }

        if let Some(info) = resolver::inspect(reference) {
            return Ok(match self.tracks.get(&info.id) {
                Some(track) => Resolution {
                    track: track.clone(),
                    is_new: false,
                    via: ResolvedBy::Link,
                },
                None => Resolution {
                    track: Track::new(info.id, info.provider, info.link),
                    is_new: true,
                    via: ResolvedBy::Link,
                },
            });
        }

        if let Some((artist, title)) = split_artist_title(reference) {
            return self
                .lookup_artist_title(&artist, &title)
                .map(|track| Resolution {
                    track: track.clone(),
                    is_new: false,
                    via: ResolvedBy::ArtistTitle,
                })
                .ok_or_else(|| Error::not_found(format!("no track for \"{}\"", reference)));
        }

        Err(Error::invalid(format!(
            "\"{}\" is neither a known id, a supported link nor \"artist - title\"",
            reference
        )))
    }
}

impl FromIterator<Track> for Catalog {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for track in iter {
            catalog.add(track);
        }
        catalog
    }
}
