//! Documentation OpenAPI de l'API radio (REST + SSE).

use utoipa::OpenApi;

/// Documentation OpenAPI pour l'API radio.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::sse::radio_events_sse,
        crate::api::get_now_playing,
        crate::api::list_tracks,
        crate::api::add_track,
        crate::api::set_track,
        crate::api::correct_track,
        crate::api::remove_track,
        crate::api::list_queues,
        crate::api::get_queue,
        crate::api::enqueue,
        crate::api::remove_queue_entry,
        crate::api::queue_next,
        crate::api::queue_previous,
        crate::api::queue_shuffle,
        crate::api::queue_current,
        crate::api::play_now,
        crate::api::play_random,
    ),
    components(
        schemas(
            crate::Track,
            crate::TrackPatch,
            crate::NowPlaying,
            crate::QueueSummary,
            crate::QueueEntry,
            crate::QueueOverview,
            crate::api::TrackResponse,
            crate::api::AddTrackRequest,
            crate::api::SetTrackRequest,
            crate::api::SetTrackResponse,
            crate::api::EnqueueRequest,
            crate::api::RemovedEntryResponse,
            crate::api::ErrorResponse,
            crate::sse::EventsQuery,
        )
    ),
    tags(
        (name = "radio", description = "Catalogue, files et diffusion de la radio")
    ),
    info(
        title = "RadioBot API",
        version = "0.1.0",
        description = r#"
# Radio partagée

Un catalogue de morceaux (liens YouTube) et une file par salon ou par
utilisateur. Les requêtes qui modifient l'état exigent le secret partagé
dans l'en-tête `X-Radio-Secret` (ou `Authorization: Bearer ...`).

Flux SSE `/api/radio/events` :
- `now_playing` : le morceau sérialisé `{id, provider, link, artist, title, contributor}`
- `updated` : nom de la file modifiée (vide pour le catalogue)
        "#,
        license(
            name = "MIT",
        ),
    )
)]
pub struct ApiDoc;
