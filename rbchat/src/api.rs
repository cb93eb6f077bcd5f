//! Passerelle HTTP du bot : `POST /api/chat`

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rbplaylist::PushSecret;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::bot::{ChatBot, ChatMessage};

#[derive(Clone)]
pub struct ChatApiState {
    pub bot: ChatBot,
    pub secret: PushSecret,
}

/// Réponse du bot à publier dans le salon
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatError {
    pub error: String,
    pub message: String,
}

/// Router monté sous `/api/chat`
pub fn chat_api_router(state: ChatApiState) -> Router {
    Router::new().route("/", post(post_message)).with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatMessage,
    responses(
        (status = 200, description = "Réponse du bot", body = ChatReply),
        (status = 204, description = "Message ignoré"),
        (status = 401, description = "Secret manquant ou invalide", body = ChatError)
    )
)]
pub async fn post_message(
    State(state): State<ChatApiState>,
    headers: HeaderMap,
    Json(message): Json<ChatMessage>,
) -> Response {
    if !state.secret.verify(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ChatError {
                error: "UNAUTHORIZED".to_string(),
                message: "Missing or invalid radio secret".to_string(),
            }),
        )
            .into_response();
    }

    match state.bot.handle(&message) {
        Some(reply) => (StatusCode::OK, Json(ChatReply { reply })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(post_message),
    components(schemas(ChatMessage, ChatReply, ChatError)),
    tags((name = "chat", description = "Commandes `.radio` relayées depuis un salon de discussion")),
    info(title = "RadioBot Chat API", version = "0.1.0")
)]
pub struct ApiDoc;
