//! Types d'erreurs pour rbplaylist

/// Erreurs du moteur de playlists
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// La référence ne peut pas être interprétée (lien non reconnu, champ vide…)
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Référence bien formée mais sans correspondance
    #[error("Not found: {0}")]
    NotFound(String),

    /// Opération impossible sur une collection vide
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Error::InvalidReference(what.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub(crate) fn empty(what: impl Into<String>) -> Self {
        Error::EmptyCollection(what.into())
    }
}

/// Type Result spécialisé pour rbplaylist
pub type Result<T> = std::result::Result<T, Error>;
