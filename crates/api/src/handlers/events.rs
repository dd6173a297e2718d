//! Live event stream over server-sent events
use std::convert::Infallible;

use axum::{
	extract::State,
	response::sse::{Event, Sse},
};
use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tracing::debug;
use vitals_service::{run_live_stream, BusEvent};

use crate::state::AppState;

const SINK_CAPACITY: usize = 64;

fn to_sse(event: BusEvent) -> Event {
	Event::default()
		.event(event.kind.as_str())
		.data(event.payload.to_string())
}

/// GET /mcp/events - Subscribe to tool-call events.
///
/// The first frame is `ready`; idle periods produce `heartbeat` frames. The
/// forwarding task ends and releases its subscription when the client
/// disconnects.
pub async fn get_events(
	State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
	let subscription = state.events.subscribe();
	debug!("Live stream opened for subscription {}", subscription.id());

	let (tx, rx) = mpsc::channel(SINK_CAPACITY);
	tokio::spawn(run_live_stream(subscription, tx, state.heartbeat));

	let stream = stream::unfold(rx, |mut rx| async move {
		rx.recv().await.map(|event| (Ok(to_sse(event)), rx))
	});

	Sse::new(stream)
}
