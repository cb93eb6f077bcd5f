//! # rbserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit le serveur HTTP de RadioBot :
//!
//! - 🚀 **API de haut niveau** : enregistrement de routes, handlers et sous-routeurs
//! - 📡 **Server-Sent Events (SSE)** : logs en temps réel via `/log-sse`
//! - 📚 **Documentation OpenAPI** : Swagger UI par API enregistrée
//! - ⚡ **Arrêt gracieux** : sur Ctrl+C
//!
//! Les crates métier s'y greffent par des traits d'extension implémentés
//! sur [`Server`].
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use rbserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 8080).build();
//!     server.init_logging(LoggingOptions::default()).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, SseLayer, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
