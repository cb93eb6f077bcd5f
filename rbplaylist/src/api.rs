//! API REST de la radio.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::PushSecret;
use crate::coordinator::{Coordinator, NowPlaying, QueueOverview, QueueSummary};
use crate::track::{Track, TrackPatch};

/// État partagé des handlers
#[derive(Clone)]
pub struct RadioApiState {
    pub coordinator: Coordinator,
    pub secret: PushSecret,
}

impl RadioApiState {
    pub fn new(coordinator: Coordinator, secret: PushSecret) -> Self {
        Self {
            coordinator,
            secret,
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        if self.secret.verify(headers) {
            Ok(())
        } else {
            Err(map_status(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid radio secret",
            ))
        }
    }
}

/// Router `/api/radio` combinant REST et SSE.
pub fn radio_api_router(state: RadioApiState) -> Router {
    Router::new()
        .route("/events", get(crate::sse::radio_events_sse))
        .route("/now", get(get_now_playing))
        .route(
            "/tracks",
            get(list_tracks).post(add_track).put(set_track),
        )
        .route("/tracks/{id}", patch(correct_track).delete(remove_track))
        .route("/queues", get(list_queues))
        .route("/queues/{name}", get(get_queue))
        .route("/queues/{name}/songs", post(enqueue))
        .route("/queues/{name}/songs/{index}", delete(remove_queue_entry))
        .route("/queues/{name}/next", post(queue_next))
        .route("/queues/{name}/previous", post(queue_previous))
        .route("/queues/{name}/shuffle", post(queue_shuffle))
        .route("/queues/{name}/current", post(queue_current))
        .route("/play/{target}", post(play_now))
        .route("/random", post(play_random))
        .with_state(state)
}

/// Un morceau du catalogue et son nom lisible.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResponse {
    #[serde(flatten)]
    #[schema(inline)]
    pub track: Track,
    pub display_name: String,
}

impl From<Track> for TrackResponse {
    fn from(track: Track) -> Self {
        let display_name = track.display_name();
        Self {
            track,
            display_name,
        }
    }
}

/// Requête d'enregistrement d'un lien au catalogue.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTrackRequest {
    #[schema(example = "https://www.youtube.com/watch?v=fB63ztKnGvo")]
    pub link: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub contributor: Option<String>,
}

/// Requête « set » : associe un lien à un couple artiste/titre.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetTrackRequest {
    pub link: String,
    #[schema(example = "Disclosure")]
    pub artist: String,
    #[schema(example = "Omen")]
    pub title: String,
    pub contributor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SetTrackResponse {
    pub track: TrackResponse,
    pub created: bool,
    /// Ancien id quand le lien désigne désormais une autre vidéo
    pub replaced: Option<String>,
}

/// Requête d'ajout dans une file : id, lien ou `artiste - titre`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnqueueRequest {
    #[schema(example = "Disclosure - Omen")]
    pub reference: String,
    pub contributor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedEntryResponse {
    pub queue: String,
    pub id: String,
}

/// Réponse d'erreur REST générique.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/radio/now",
    tag = "radio",
    responses(
        (status = 200, description = "Morceau en cours", body = NowPlaying),
        (status = 404, description = "Rien n'a encore été joué", body = ErrorResponse)
    )
)]
pub async fn get_now_playing(State(state): State<RadioApiState>) -> Response {
    match state.coordinator.now_playing() {
        Some(now) => (StatusCode::OK, Json(now)).into_response(),
        None => map_status(StatusCode::NOT_FOUND, "NOTHING_PLAYING", "Nothing played yet"),
    }
}

#[utoipa::path(
    get,
    path = "/api/radio/tracks",
    tag = "radio",
    responses(
        (status = 200, description = "Catalogue complet", body = [TrackResponse])
    )
)]
pub async fn list_tracks(State(state): State<RadioApiState>) -> Response {
    let tracks: Vec<TrackResponse> = state
        .coordinator
        .tracks()
        .into_iter()
        .map(TrackResponse::from)
        .collect();
    (StatusCode::OK, Json(tracks)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/radio/tracks",
    tag = "radio",
    request_body = AddTrackRequest,
    responses(
        (status = 201, description = "Morceau enregistré", body = TrackResponse),
        (status = 400, description = "Lien non reconnu", body = ErrorResponse),
        (status = 401, description = "Secret manquant ou invalide", body = ErrorResponse)
    )
)]
pub async fn add_track(
    State(state): State<RadioApiState>,
    headers: HeaderMap,
    Json(req): Json<AddTrackRequest>,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }

    match state.coordinator.add_track(
        &req.link,
        req.artist.as_deref().unwrap_or_default(),
        req.title.as_deref().unwrap_or_default(),
        req.contributor.as_deref().unwrap_or_default(),
    ) {
        Ok(track) => (StatusCode::CREATED, Json(TrackResponse::from(track))).into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    put,
    path = "/api/radio/tracks",
    tag = "radio",
    request_body = SetTrackRequest,
    responses(
        (status = 200, description = "Lien associé au couple artiste/titre", body = SetTrackResponse),
        (status = 400, description = "Champ vide ou lien non reconnu", body = ErrorResponse),
        (status = 401, description = "Secret manquant ou invalide", body = ErrorResponse)
    )
)]
pub async fn set_track(
    State(state): State<RadioApiState>,
    headers: HeaderMap,
    Json(req): Json<SetTrackRequest>,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }

    match state.coordinator.set_track(
        &req.link,
        &req.artist,
        &req.title,
        req.contributor.as_deref().unwrap_or_default(),
    ) {
        Ok(upsert) => (
            StatusCode::OK,
            Json(SetTrackResponse {
                track: upsert.track.into(),
                created: upsert.created,
                replaced: upsert.replaced,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    patch,
    path = "/api/radio/tracks/{id}",
    tag = "radio",
    params(("id" = String, Path, description = "Id du morceau")),
    request_body = TrackPatch,
    responses(
        (status = 200, description = "Morceau corrigé", body = TrackResponse),
        (status = 400, description = "Lien incompatible avec l'id", body = ErrorResponse),
        (status = 404, description = "Morceau inconnu", body = ErrorResponse)
    )
)]
pub async fn correct_track(
    State(state): State<RadioApiState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<TrackPatch>,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }
    if patch.is_empty() {
        return map_status(StatusCode::BAD_REQUEST, "EMPTY_PATCH", "Nothing to update");
    }

    match state.coordinator.correct_track(&id, patch) {
        Ok(track) => (StatusCode::OK, Json(TrackResponse::from(track))).into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    delete,
    path = "/api/radio/tracks/{id}",
    tag = "radio",
    params(("id" = String, Path, description = "Id du morceau")),
    responses(
        (status = 200, description = "Morceau retiré du catalogue et des files", body = TrackResponse),
        (status = 404, description = "Morceau inconnu", body = ErrorResponse)
    )
)]
pub async fn remove_track(
    State(state): State<RadioApiState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }

    match state.coordinator.remove_track(&id) {
        Ok(track) => (StatusCode::OK, Json(TrackResponse::from(track))).into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    get,
    path = "/api/radio/queues",
    tag = "radio",
    responses(
        (status = 200, description = "Toutes les files", body = [QueueSummary])
    )
)]
pub async fn list_queues(State(state): State<RadioApiState>) -> Response {
    (StatusCode::OK, Json(state.coordinator.queues())).into_response()
}

#[utoipa::path(
    get,
    path = "/api/radio/queues/{name}",
    tag = "radio",
    params(("name" = String, Path, description = "Nom de la file")),
    responses(
        (status = 200, description = "Contenu de la file", body = QueueOverview),
        (status = 404, description = "File inconnue", body = ErrorResponse)
    )
)]
pub async fn get_queue(State(state): State<RadioApiState>, Path(name): Path<String>) -> Response {
    match state.coordinator.queue_overview(&name) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/api/radio/queues/{name}/songs",
    tag = "radio",
    params(("name" = String, Path, description = "Nom de la file (créée au besoin)")),
    request_body = EnqueueRequest,
    responses(
        (status = 201, description = "Morceau ajouté en fin de file", body = TrackResponse),
        (status = 400, description = "Référence illisible", body = ErrorResponse),
        (status = 404, description = "Aucun morceau ne correspond", body = ErrorResponse)
    )
)]
pub async fn enqueue(
    State(state): State<RadioApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(req): Json<EnqueueRequest>,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }

    match state.coordinator.resolve_and_add(
        &name,
        &req.reference,
        req.contributor.as_deref().unwrap_or_default(),
    ) {
        Ok(track) => (StatusCode::CREATED, Json(TrackResponse::from(track))).into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    delete,
    path = "/api/radio/queues/{name}/songs/{index}",
    tag = "radio",
    params(
        ("name" = String, Path, description = "Nom de la file"),
        ("index" = usize, Path, description = "Position dans la file")
    ),
    responses(
        (status = 200, description = "Entrée retirée", body = RemovedEntryResponse),
        (status = 404, description = "File ou position inconnue", body = ErrorResponse)
    )
)]
pub async fn remove_queue_entry(
    State(state): State<RadioApiState>,
    Path((name, index)): Path<(String, usize)>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }

    match state.coordinator.remove_from_queue_at(&name, index) {
        Ok(id) => (
            StatusCode::OK,
            Json(RemovedEntryResponse { queue: name, id }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/api/radio/queues/{name}/next",
    tag = "radio",
    params(("name" = String, Path, description = "Nom de la file")),
    responses(
        (status = 200, description = "Morceau suivant", body = NowPlaying),
        (status = 404, description = "File inconnue ou sans morceau jouable", body = ErrorResponse),
        (status = 409, description = "File vide", body = ErrorResponse)
    )
)]
pub async fn queue_next(
    State(state): State<RadioApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    playback(&state, &headers, || state.coordinator.next(&name))
}

#[utoipa::path(
    post,
    path = "/api/radio/queues/{name}/previous",
    tag = "radio",
    params(("name" = String, Path, description = "Nom de la file")),
    responses(
        (status = 200, description = "Morceau précédent", body = NowPlaying),
        (status = 404, description = "File inconnue ou sans morceau jouable", body = ErrorResponse),
        (status = 409, description = "File vide", body = ErrorResponse)
    )
)]
pub async fn queue_previous(
    State(state): State<RadioApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    playback(&state, &headers, || state.coordinator.previous(&name))
}

#[utoipa::path(
    post,
    path = "/api/radio/queues/{name}/shuffle",
    tag = "radio",
    params(("name" = String, Path, description = "Nom de la file")),
    responses(
        (status = 200, description = "Morceau tiré au hasard dans la file", body = NowPlaying),
        (status = 404, description = "File inconnue ou sans morceau jouable", body = ErrorResponse),
        (status = 409, description = "File vide", body = ErrorResponse)
    )
)]
pub async fn queue_shuffle(
    State(state): State<RadioApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    playback(&state, &headers, || state.coordinator.shuffle(&name))
}

#[utoipa::path(
    post,
    path = "/api/radio/queues/{name}/current",
    tag = "radio",
    params(("name" = String, Path, description = "Nom de la file")),
    responses(
        (status = 200, description = "Morceau courant rejoué", body = NowPlaying),
        (status = 404, description = "File ou morceau inconnu", body = ErrorResponse),
        (status = 409, description = "File vide", body = ErrorResponse)
    )
)]
pub async fn queue_current(
    State(state): State<RadioApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    playback(&state, &headers, || {
        // play_now retomberait sur les ids : seule une file est acceptée ici
        if !state.coordinator.queue_names().contains(&name) {
            return Err(crate::Error::NotFound(format!("queue {}", name)));
        }
        state.coordinator.play_now(&name)
    })
}

#[utoipa::path(
    post,
    path = "/api/radio/play/{target}",
    tag = "radio",
    params(("target" = String, Path, description = "Nom de file, id ou lien")),
    responses(
        (status = 200, description = "Morceau annoncé", body = NowPlaying),
        (status = 404, description = "Rien à jouer", body = ErrorResponse)
    )
)]
pub async fn play_now(
    State(state): State<RadioApiState>,
    Path(target): Path<String>,
    headers: HeaderMap,
) -> Response {
    playback(&state, &headers, || state.coordinator.play_now(&target))
}

#[utoipa::path(
    post,
    path = "/api/radio/random",
    tag = "radio",
    responses(
        (status = 200, description = "Morceau du catalogue tiré au hasard", body = NowPlaying),
        (status = 409, description = "Catalogue vide", body = ErrorResponse)
    )
)]
pub async fn play_random(State(state): State<RadioApiState>, headers: HeaderMap) -> Response {
    playback(&state, &headers, || state.coordinator.play_random())
}

fn playback<F>(state: &RadioApiState, headers: &HeaderMap, play: F) -> Response
where
    F: FnOnce() -> crate::Result<NowPlaying>,
{
    if let Err(denied) = state.authorize(headers) {
        return denied;
    }
    match play() {
        Ok(now) => (StatusCode::OK, Json(now)).into_response(),
        Err(err) => map_error(err),
    }
}

fn map_status(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn map_error(error: crate::Error) -> Response {
    let (status, code) = match error {
        crate::Error::InvalidReference(_) => (StatusCode::BAD_REQUEST, "INVALID_REFERENCE"),
        crate::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        crate::Error::EmptyCollection(_) => (StatusCode::CONFLICT, "EMPTY_COLLECTION"),
        crate::Error::PersistenceError(_) | crate::Error::Other(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    map_status(status, code, &error.to_string())
}
