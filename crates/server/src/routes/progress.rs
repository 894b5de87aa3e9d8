//! Per-job SSE progress stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use ringsight_types::{AnalysisStage, JobStatus, ProgressEvent};
use tokio::sync::broadcast::error::RecvError;

use crate::error::{ApiError, ApiResult};
use crate::jobs::JobRecord;
use crate::state::AppState;

/// GET /api/analyze/{id}/events — SSE stream of a job's progress.
///
/// Replays the buffered history first, then relays live events, and closes
/// once the terminal event has been delivered. Attaching after the job is
/// terminal therefore yields the complete history followed by end-of-stream
/// — never an empty stream and never a hang. A subscriber that lags behind
/// the broadcast ring is disconnected and picks the history back up on
/// reconnect.
async fn stream_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>> {
    let (history, rx) = state
        .jobs
        .subscribe(&id)
        .ok_or_else(|| ApiError::JobNotFound(id.clone()))?;

    // Snapshot taken after registering the receiver: anything this misses
    // is already in flight on `rx`.
    let snapshot = state.jobs.snapshot(&id);

    let stream = async_stream::stream! {
        let mut rx = rx;
        let mut terminal_delivered = false;

        for event in history {
            terminal_delivered = event.is_terminal();
            yield Ok(sse_event(&event));
            if terminal_delivered {
                break;
            }
        }

        // A terminal record whose history somehow lacks the terminal event
        // still owes the subscriber a correct ending — synthesize one.
        if !terminal_delivered {
            if let Some(event) = snapshot.as_ref().and_then(synthesized_terminal) {
                terminal_delivered = true;
                yield Ok(sse_event(&event));
            }
        }

        while !terminal_delivered {
            match rx.recv().await {
                Ok(event) => {
                    terminal_delivered = event.is_terminal();
                    yield Ok(sse_event(&event));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(job_id = %id, skipped, "Subscriber lagged; closing stream");
                    break;
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    ))
}

fn sse_event(event: &ProgressEvent) -> Event {
    Event::default()
        .event(event.kind.as_str())
        .data(serde_json::to_string(event).unwrap_or_default())
}

/// Terminal event for a terminal record with no terminal event in its
/// history. Unreachable through the store's own mutations; kept so a
/// subscriber can never hang on an inconsistent record.
fn synthesized_terminal(record: &JobRecord) -> Option<ProgressEvent> {
    if record.events.iter().any(|e| e.is_terminal()) {
        return None;
    }
    match record.status {
        JobStatus::Completed => Some(ProgressEvent::checkpoint(
            AnalysisStage::Done,
            "Analysis complete",
        )),
        JobStatus::Failed => {
            let message = record
                .error
                .as_ref()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| "analysis failed".to_string());
            Some(ProgressEvent::failure(message, record.progress))
        }
        JobStatus::Pending | JobStatus::Processing => None,
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analyze/{id}/events", get(stream_events))
}
