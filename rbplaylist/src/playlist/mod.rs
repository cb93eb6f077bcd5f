//! File de lecture d'une station : une suite d'ids et un curseur

pub mod record;

use rand::Rng;

pub use record::QueueRecord;

/// Une station (salon ou utilisateur)
///
/// Le curseur reste dans `[0, len)` tant que la file n'est pas vide, et vaut
/// `0` sinon. La file peut référencer des ids absents du catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    name: String,
    songs: Vec<String>,
    cursor: usize,
}

/// Ramène un curseur quelconque dans les bornes de la file
///
/// Un curseur trop grand repart au début, un curseur négatif se place sur
/// le dernier élément.
pub fn normalize(cursor: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if cursor < 0 {
        len - 1
    } else if cursor as u64 >= len as u64 {
        0
    } else {
        cursor as usize
    }
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
            cursor: 0,
        }
    }

    /// Reconstruit une file sauvegardée ; le curseur est normalisé
    pub fn with_songs(name: impl Into<String>, songs: Vec<String>, cursor: i64) -> Self {
        let cursor = normalize(cursor, songs.len());
        Self {
            name: name.into(),
            songs,
            cursor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> &[String] {
        &self.songs
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.songs.iter().any(|s| s == id)
    }

    /// Id sous le curseur
    pub fn current(&self) -> Option<&str> {
        self.songs.get(self.cursor).map(String::as_str)
    }

    /// Ajoute en fin de file
    pub fn add(&mut self, id: impl Into<String>) {
        self.songs.push(id.into());
    }

    /// Retire la première occurrence de `id`
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        match self.songs.iter().position(|s| s == id) {
            Some(index) => self.remove_by_index(index).is_some(),
            None => false,
        }
    }

    /// Retire l'entrée à la position `index`
    pub fn remove_by_index(&mut self, index: usize) -> Option<String> {
        if index >= self.songs.len() {
            return None;
        }
        let removed = self.songs.remove(index);
        self.renormalize();
        Some(removed)
    }

    /// Retire toutes les occurrences de `id`, renvoie le nombre retiré
    pub fn purge(&mut self, id: &str) -> usize {
        let before = self.songs.len();
        self.songs.retain(|s| s != id);
        let removed = before - self.songs.len();
        if removed > 0 {
            self.renormalize();
        }
        removed
    }

    /// Remplace un id par un autre partout dans la file
    pub fn replace_id(&mut self, old: &str, new: &str) -> usize {
        let mut count = 0;
        for song in self.songs.iter_mut().filter(|s| *s == old) {
            *song = new.to_string();
            count += 1;
        }
        count
    }

    /// Avance d'un cran, repart au début après le dernier
    pub fn next(&mut self) -> Option<&str> {
        self.cursor = normalize(self.cursor as i64 + 1, self.songs.len());
        self.current()
    }

    /// Recule d'un cran, passe au dernier avant le premier
    pub fn previous(&mut self) -> Option<&str> {
        self.cursor = normalize(self.cursor as i64 - 1, self.songs.len());
        self.current()
    }

    /// Place le curseur au hasard
    pub fn shuffle(&mut self) -> Option<&str> {
        self.shuffle_with(&mut rand::rng())
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&str> {
        self.cursor = if self.songs.is_empty() {
            0
        } else {
            rng.random_range(0..self.songs.len())
        };
        self.current()
    }

    pub fn to_record(&self) -> QueueRecord {
        QueueRecord {
            name: self.name.clone(),
            songs: self.songs.clone(),
            current_index: self.cursor as i64,
        }
    }

    fn renormalize(&mut self) {
        self.cursor = normalize(self.cursor as i64, self.songs.len());
    }
}

impl From<QueueRecord> for Playlist {
    fn from(record: QueueRecord) -> Self {
        Playlist::with_songs(record.name, record.songs, record.current_index)
    }
}
