//! SSE pour suivre la radio (morceau en cours + modifications).
//!
//! Route type : `GET /api/radio/events?queue=general`
//!
//! - `now_playing` : data = le morceau sérialisé
//! - `updated` : data = nom de la file modifiée (vide pour le catalogue)

use crate::api::RadioApiState;
use crate::coordinator::RadioEvent;
use async_stream::stream;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
};
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use tracing::debug;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams, utoipa::ToSchema)]
pub struct EventsQuery {
    /// Ne suivre qu'une file (les évènements du catalogue passent toujours)
    #[serde(default)]
    pub queue: Option<String>,
}

impl EventsQuery {
    fn accepts(&self, queue: Option<&str>) -> bool {
        match (&self.queue, queue) {
            (Some(filter), Some(queue)) => filter == queue,
            _ => true,
        }
    }
}

fn to_sse(event: &RadioEvent) -> Option<Event> {
    match event {
        RadioEvent::NowPlaying(now) => Event::default()
            .event("now_playing")
            .json_data(&now.track)
            .ok(),
        RadioEvent::Updated { queue } => Some(
            Event::default()
                .event("updated")
                .data(queue.as_deref().unwrap_or_default()),
        ),
    }
}

/// Handler SSE : le morceau en cours puis les évènements en direct.
#[utoipa::path(
    get,
    path = "/api/radio/events",
    tag = "radio",
    params(EventsQuery),
    responses(
        (status = 200, description = "Flux SSE (now_playing, updated)", content_type = "text/event-stream")
    )
)]
pub async fn radio_events_sse(
    State(state): State<RadioApiState>,
    Query(params): Query<EventsQuery>,
) -> impl IntoResponse {
    let current = state.coordinator.now_playing();
    let mut events = BroadcastStream::new(state.coordinator.subscribe());

    let stream = stream! {
        if let Some(now) = current {
            if params.accepts(now.queue.as_deref()) {
                if let Some(event) = to_sse(&RadioEvent::NowPlaying(now)) {
                    yield Ok::<_, axum::Error>(event);
                }
            }
        }

        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(n)) => {
                    debug!("Radio SSE client lagged, {} events dropped", n);
                    continue;
                }
            };
            if !params.accepts(event.queue()) {
                continue;
            }
            if let Some(sse) = to_sse(&event) {
                yield Ok::<_, axum::Error>(sse);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_filter() {
        let all = EventsQuery::default();
        assert!(all.accepts(None));
        assert!(all.accepts(Some("general")));

        let general = EventsQuery {
            queue: Some("general".into()),
        };
        assert!(general.accepts(None));
        assert!(general.accepts(Some("general")));
        assert!(!general.accepts(Some("cyle")));
    }
}
