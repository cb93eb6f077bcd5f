//! Extension de `rbserver::Server` pour la radio
//!
//! `rbplaylist` enrichit le serveur sans que `rbserver` le connaisse :
//!
//! ```rust,no_run
//! use rbplaylist::{Coordinator, PushSecret, RadioServerExt};
//! use rbserver::ServerBuilder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut server = ServerBuilder::new("RadioBot", "http://localhost:8080", 8080).build();
//! let radio = Coordinator::new();
//!
//! server.init_radio(radio, PushSecret::new(Some("hunter2"))).await?;
//! server.start().await;
//! # Ok(())
//! # }
//! ```

use crate::api::{radio_api_router, RadioApiState};
use crate::auth::PushSecret;
use crate::coordinator::Coordinator;
use tracing::{info, warn};
use utoipa::OpenApi;

/// Trait d'extension pour monter l'API radio sur un serveur
pub trait RadioServerExt {
    /// Enregistre l'API radio
    ///
    /// # Routes créées
    ///
    /// - API REST: `/api/radio/*`
    /// - SSE Events: `/api/radio/events`
    /// - Swagger: `/swagger-ui/radio`
    async fn init_radio(&mut self, coordinator: Coordinator, secret: PushSecret) -> anyhow::Result<()>;
}

impl RadioServerExt for rbserver::Server {
    async fn init_radio(&mut self, coordinator: Coordinator, secret: PushSecret) -> anyhow::Result<()> {
        if secret.is_open() {
            warn!("⚠️  No radio.push_secret configured, state-changing routes are open");
        }

        let router = radio_api_router(RadioApiState::new(coordinator, secret));
        self.add_openapi(router, crate::openapi::ApiDoc::openapi(), "radio")
            .await;

        info!("✅ Radio API registered:");
        info!("   - REST API: /api/radio/*");
        info!("   - SSE Events: /api/radio/events");
        info!("   - OpenAPI docs: /swagger-ui/radio");
        Ok(())
    }
}
