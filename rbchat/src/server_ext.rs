use crate::api::{chat_api_router, ApiDoc, ChatApiState};
use crate::bot::ChatBot;
use rbplaylist::PushSecret;
use tracing::info;
use utoipa::OpenApi;

/// Trait d'extension pour monter la passerelle de chat sur un serveur
pub trait ChatServerExt {
    /// Enregistre `POST /api/chat` et sa documentation `/swagger-ui/chat`
    async fn init_chat(&mut self, bot: ChatBot, secret: PushSecret) -> anyhow::Result<()>;
}

impl ChatServerExt for rbserver::Server {
    async fn init_chat(&mut self, bot: ChatBot, secret: PushSecret) -> anyhow::Result<()> {
        let name = bot.bot_name().to_string();
        let router = chat_api_router(ChatApiState { bot, secret });
        self.add_openapi(router, ApiDoc::openapi(), "chat").await;

        info!("✅ Chat gateway registered for {} at /api/chat", name);
        Ok(())
    }
}
