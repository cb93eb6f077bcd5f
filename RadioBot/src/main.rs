use rbchat::{ChatBot, ChatServerExt};
use rbconfig::get_config;
use rbplaylist::{Coordinator, PushSecret, RadioConfigExt, RadioServerExt};
use rbserver::Server;
use rbserver::logs::LoggingOptions;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration et logs ==========
    let config = get_config();

    let mut server = Server::new_configured();
    server.init_logging(LoggingOptions::from_config()).await;
    server
        .add_route("/info", || async {
            serde_json::json!({"name": "RadioBot", "version": env!("CARGO_PKG_VERSION")})
        })
        .await;

    // ========== PHASE 2 : Moteur de la radio ==========
    info!("📻 Building the radio...");
    let radio = Coordinator::new();
    let seeded = radio.seed(config.seed_catalog());
    info!("✅ {} seed track(s) loaded", seeded);

    let store = config.snapshot_store()?;
    match store.load().await {
        Ok(Some(snapshot)) => {
            let report = radio.restore(snapshot);
            info!(
                "✅ Snapshot restored from {}: {} track(s), {} queue(s)",
                store.path().display(),
                report.tracks,
                report.queues
            );
        }
        Ok(None) => info!("No snapshot yet at {}", store.path().display()),
        Err(e) => warn!("⚠️ Failed to restore snapshot, keeping seed tracks: {}", e),
    }

    let snapshot_task = config
        .get_snapshot_interval()
        .map(|interval| radio.spawn_snapshot_task(store.clone(), interval));

    // ========== PHASE 3 : API ==========
    let secret = PushSecret::new(config.get_push_secret()?.as_deref());

    info!("📡 Registering radio API...");
    server.init_radio(radio.clone(), secret.clone()).await?;

    info!("💬 Registering chat gateway...");
    let bot = ChatBot::new(radio.clone(), config.get_bot_name());
    server.init_chat(bot, secret).await?;

    // ========== PHASE 4 : Démarrage du serveur ==========
    info!("🌐 Starting HTTP server...");
    server.start().await;

    info!("✅ RadioBot is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    if let Some(task) = snapshot_task {
        task.abort();
    }
    match radio.flush(&store).await {
        Ok(true) => info!("💾 Final snapshot written to {}", store.path().display()),
        Ok(false) => {}
        Err(e) => warn!("⚠️ Failed to write final snapshot: {}", e),
    }

    Ok(())
}
