//! Contrôle du secret partagé des requêtes qui modifient l'état

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// En-tête portant le secret
pub const SECRET_HEADER: &str = "x-radio-secret";

/// Secret attendu, conservé sous forme d'empreinte SHA-256
///
/// Sans secret configuré, toutes les requêtes passent.
#[derive(Clone, Default)]
pub struct PushSecret(Option<[u8; 32]>);

impl PushSecret {
    pub fn new(secret: Option<&str>) -> Self {
        Self(
            secret
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(digest),
        )
    }

    pub fn open() -> Self {
        Self(None)
    }

    pub fn is_open(&self) -> bool {
        self.0.is_none()
    }

    /// Vérifie `X-Radio-Secret` ou `Authorization: Bearer ...`
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.0 else {
            return true;
        };

        let provided = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .or_else(|| {
                headers
                    .get(axum::http::header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().strip_prefix("Bearer "))
                    .map(str::trim)
            });

        // Les empreintes ont toujours la même longueur
        provided.is_some_and(|secret| digest(secret) == *expected)
    }
}

impl std::fmt::Debug for PushSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PushSecret")
            .field(&if self.is_open() { "open" } else { "set" })
            .finish()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(secret.as_bytes()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_open_secret_accepts_everything() {
        assert!(PushSecret::open().verify(&HeaderMap::new()));
        assert!(PushSecret::new(Some("  ")).is_open());
        assert!(PushSecret::new(None).is_open());
    }

    #[test]
    fn test_secret_headers() {
        let secret = PushSecret::new(Some("hunter2"));
        assert!(!secret.verify(&HeaderMap::new()));
        assert!(secret.verify(&headers("x-radio-secret", "hunter2")));
        assert!(secret.verify(&headers("authorization", "Bearer hunter2")));
        assert!(!secret.verify(&headers("x-radio-secret", "hunter3")));
        assert!(!secret.verify(&headers("authorization", "Basic hunter2")));
    }
}
