//! Track : un média jouable identifié par l'id natif de son fournisseur

use crate::resolver::{self, Provider};
use serde::{Deserialize, Deserializer, Serialize};

/// Nom affiché quand personne n'est crédité pour un ajout
pub const UNKNOWN_CONTRIBUTOR: &str = "unknown";

/// Un morceau du catalogue
///
/// Sérialisé tel quel dans les sauvegardes et dans les évènements
/// « now playing » : `{id, provider, link, artist, title, contributor}`.
/// Les champs texte vides valent « absent ».
///
/// # Exemples
///
/// ```
/// use rbplaylist::Track;
///
/// let track = Track::from_link("https://youtu.be/fB63ztKnGvo?t=3", "Disclosure", "Omen", "cyle")
///     .unwrap();
/// assert_eq!(track.id, "fB63ztKnGvo");
/// assert_eq!(track.link, "https://www.youtube.com/watch?v=fB63ztKnGvo");
/// assert_eq!(track.display_name(), "Disclosure - Omen");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Track {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, alias = "type")]
    #[cfg_attr(feature = "server", schema(value_type = String, example = "youtube"))]
    pub provider: Provider,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub artist: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contributor: String,
}

impl Track {
    pub fn new(id: impl Into<String>, provider: Provider, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider,
            link: link.into(),
            artist: String::new(),
            title: String::new(),
            contributor: String::new(),
        }
    }

    /// Crée un morceau à partir d'un lien quelconque
    ///
    /// L'id est dérivé du lien et le lien est remplacé par sa forme
    /// canonique. `None` si le lien n'est pas reconnu.
    pub fn from_link(
        link: &str,
        artist: impl Into<String>,
        title: impl Into<String>,
        contributor: impl Into<String>,
    ) -> Option<Self> {
        let info = resolver::inspect(link)?;
        Some(
            Self::new(info.id, info.provider, info.link)
                .with_artist(artist)
                .with_title(title)
                .with_contributor(contributor),
        )
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into().trim().to_string();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into().trim().to_string();
        self
    }

    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        self.contributor = contributor.into().trim().to_string();
        self
    }

    /// Artiste, `None` si vide
    pub fn artist(&self) -> Option<&str> {
        non_blank(&self.artist)
    }

    /// Titre, `None` si vide
    pub fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    /// Un morceau n'entre au catalogue qu'avec un id et un lien
    pub fn is_valid(&self) -> bool {
        non_blank(&self.id).is_some() && non_blank(&self.link).is_some()
    }

    /// Nom lisible du morceau
    ///
    /// `"artiste - titre"`, `"artiste - ???"`, `"??? - titre"`, ou le lien
    /// si ni l'un ni l'autre n'est renseigné.
    pub fn display_name(&self) -> String {
        match (self.artist(), self.title()) {
            (Some(artist), Some(title)) => format!("{} - {}", artist, title),
            (Some(artist), None) => format!("{} - ???", artist),
            (None, Some(title)) => format!("??? - {}", title),
            (None, None) => self.link.clone(),
        }
    }

    /// Qui a ajouté le morceau, `"unknown"` à défaut
    pub fn contributor_name(&self) -> &str {
        non_blank(&self.contributor).unwrap_or(UNKNOWN_CONTRIBUTOR)
    }

    /// Comparaison artiste/titre, espaces de bord ignorés
    pub fn matches_artist_title(&self, artist: &str, title: &str) -> bool {
        self.artist.trim() == artist.trim() && self.title.trim() == title.trim()
    }

    /// Comme [`Track::matches_artist_title`] mais sans tenir compte de la casse
    pub fn loosely_matches_artist_title(&self, artist: &str, title: &str) -> bool {
        self.artist.trim().to_lowercase() == artist.trim().to_lowercase()
            && self.title.trim().to_lowercase() == title.trim().to_lowercase()
    }
}

/// Correction de métadonnées ; les champs `None` sont laissés intacts
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct TrackPatch {
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl TrackPatch {
    pub fn is_empty(&self) -> bool {
        self.artist.is_none() && self.title.is_none() && self.link.is_none()
    }
}

pub(crate) fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(s)
}

/// Les sauvegardes anciennes peuvent contenir `null`, des nombres ou des
/// champs absents : tout ce qui n'est pas une chaîne devient `""`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(serde_json::Number),
        Bool(bool),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => s,
        Loose::Number(n) => n.to_string(),
        Loose::Bool(b) => b.to_string(),
        Loose::Other(_) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(artist: &str, title: &str) -> Track {
        Track::new("abc", Provider::YouTube, "https://x/y")
            .with_artist(artist)
            .with_title(title)
    }

    #[test]
    fn test_display_name_ladder() {
        assert_eq!(track("Disclosure", "Omen").display_name(), "Disclosure - Omen");
        assert_eq!(track("Disclosure", "").display_name(), "Disclosure - ???");
        assert_eq!(track("", "Omen").display_name(), "??? - Omen");
        assert_eq!(track("", "").display_name(), "https://x/y");
        assert_eq!(track("   ", "\t").display_name(), "https://x/y");
    }

    #[test]
    fn test_contributor_fallback() {
        let t = track("a", "b");
        assert_eq!(t.contributor_name(), "unknown");
        assert_eq!(t.clone().with_contributor("  ").contributor_name(), "unknown");
        assert_eq!(t.with_contributor("cyle").contributor_name(), "cyle");
    }

    #[test]
    fn test_from_link_normalizes() {
        let t = Track::from_link(
            "https://www.youtube.com/watch?v=fB63ztKnGvo&utm_source=chat",
            " disclosure ",
            "omen",
            "",
        )
        .unwrap();
        assert_eq!(t.id, "fB63ztKnGvo");
        assert_eq!(t.link, "https://www.youtube.com/watch?v=fB63ztKnGvo");
        assert_eq!(t.artist, "disclosure");
        assert!(Track::from_link("https://vimeo.com/1", "", "", "").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let t = track("Disclosure", "Omen").with_contributor("cyle");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "abc",
                "provider": "youtube",
                "link": "https://x/y",
                "artist": "Disclosure",
                "title": "Omen",
                "contributor": "cyle",
            })
        );
    }

    #[test]
    fn test_lenient_deserialization() {
        let t: Track = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "type": "youtube",
            "link": "https://x/y",
            "artist": null,
            "title": 1999,
        }))
        .unwrap();
        assert_eq!(t.provider, Provider::YouTube);
        assert_eq!(t.artist, "");
        assert_eq!(t.title, "1999");
        assert_eq!(t.contributor, "");
        assert!(t.is_valid());

        let empty: Track = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!empty.is_valid());
    }
}
