//! Reconnaissance des liens média et dérivation des identifiants
//!
//! Un lien accepté donne un [`Provider`], un identifiant stable (l'id natif
//! du fournisseur) et une forme canonique du lien. Les paramètres de suivi
//! et autres décorations sont perdus lors de la normalisation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Liens YouTube : watch, youtu.be, /v/, /e/, /embed/ et /user/.../
static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/ ]{11})"#,
    )
    .expect("YouTube link pattern is valid")
});

/// Type de média d'un morceau
///
/// Les valeurs inconnues sont conservées telles quelles pour ne rien perdre
/// d'une sauvegarde produite par une version plus récente. YouTube est le
/// seul fournisseur reconnu, c'est donc la valeur par défaut.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    #[default]
    YouTube,
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Other(value) => value.as_str(),
        }
    }

    /// Lien canonique pour un identifiant de ce fournisseur
    pub fn canonical_link(&self, id: &str) -> Option<String> {
        match self {
            Provider::YouTube => Some(format!("https://www.youtube.com/watch?v={}", id)),
            Provider::Other(_) => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Provider {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => Provider::YouTube,
            _ => Provider::Other(s.to_string()),
        }
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Provider::from(s))
    }
}

impl Serialize for Provider {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Provider::from(value.as_str()))
    }
}

/// Résultat de l'analyse d'un lien accepté
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub provider: Provider,
    pub id: String,
    pub link: String,
}

/// Analyse complète d'un lien ; `None` si aucun fournisseur ne le reconnaît
pub fn inspect(link: &str) -> Option<LinkInfo> {
    let id = YOUTUBE_RE.captures(link)?.get(1)?.as_str().to_string();
    let provider = Provider::YouTube;
    let link = provider.canonical_link(&id)?;
    Some(LinkInfo { provider, id, link })
}

/// Fournisseur du lien
pub fn classify(link: &str) -> Option<Provider> {
    inspect(link).map(|info| info.provider)
}

/// Identifiant stable dérivé du lien
pub fn extract_id(link: &str) -> Option<String> {
    inspect(link).map(|info| info.id)
}

/// Seuls les liens acceptables peuvent entrer dans le catalogue
pub fn is_acceptable(link: &str) -> bool {
    classify(link).is_some()
}

/// Forme canonique du lien
pub fn normalize(link: &str) -> Option<String> {
    inspect(link).map(|info| info.link)
}
