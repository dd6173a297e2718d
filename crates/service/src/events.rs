//! In-process event bus
//!
//! Publishers push events into an unbounded channel drained by a single
//! fan-out task, which copies each event into the inbox of every registered
//! subscription. Every event gets a sequence number at publish time and every
//! subscription remembers the next sequence number at registration, so an
//! inbox never sees events published before it subscribed even if they were
//! still queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	Ready,
	ToolCall,
	ToolError,
	Heartbeat,
}

impl EventKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			EventKind::Ready => "ready",
			EventKind::ToolCall => "tool_call",
			EventKind::ToolError => "tool_error",
			EventKind::Heartbeat => "heartbeat",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
	pub kind: EventKind,
	pub payload: Value,
}

impl BusEvent {
	pub fn new(kind: EventKind, payload: Value) -> Self {
		Self { kind, payload }
	}

	pub fn heartbeat() -> Self {
		Self::new(
			EventKind::Heartbeat,
			json!({ "timestamp": Utc::now().to_rfc3339() }),
		)
	}
}

enum BusCommand {
	Publish { seq: u64, event: BusEvent },
	Shutdown,
}

struct Inbox {
	start_seq: u64,
	tx: mpsc::UnboundedSender<BusEvent>,
}

type Registry = Arc<DashMap<u64, Inbox>>;

struct Shared {
	commands: mpsc::UnboundedSender<BusCommand>,
	inboxes: Registry,
	next_seq: AtomicU64,
	next_id: AtomicU64,
	closed: AtomicBool,
}

impl Shared {
	fn publish(&self, kind: EventKind, payload: Value) {
		if self.closed.load(Ordering::Acquire) {
			warn!("Event bus is shut down, dropping {} event", kind.as_str());
			return;
		}

		let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
		let event = BusEvent::new(kind, payload);
		if self.commands.send(BusCommand::Publish { seq, event }).is_err() {
			warn!("Event bus fan-out task is gone, dropping {} event", kind.as_str());
		}
	}

	fn unsubscribe(&self, id: u64) -> bool {
		let removed = self.inboxes.remove(&id).is_some();
		if removed {
			debug!("Subscription {} removed", id);
		}
		removed
	}
}

/// Owned pub/sub service. Create with [`EventBus::start`] inside a tokio
/// runtime and stop with [`EventBus::shutdown`].
pub struct EventBus {
	shared: Arc<Shared>,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl EventBus {
	/// Spawn the fan-out task and return the running bus
	pub fn start() -> Self {
		let (commands, rx) = mpsc::unbounded_channel();
		let inboxes: Registry = Arc::new(DashMap::new());
		let task = tokio::spawn(fan_out(rx, Arc::clone(&inboxes)));

		info!("Event bus started");
		Self {
			shared: Arc::new(Shared {
				commands,
				inboxes,
				next_seq: AtomicU64::new(0),
				next_id: AtomicU64::new(1),
				closed: AtomicBool::new(false),
			}),
			task: Mutex::new(Some(task)),
		}
	}

	/// Cheap handle for components that only publish
	pub fn publisher(&self) -> EventPublisher {
		EventPublisher {
			shared: Arc::clone(&self.shared),
		}
	}

	pub fn publish(&self, kind: EventKind, payload: Value) {
		self.shared.publish(kind, payload);
	}

	/// Register a new inbox. Only events published after this call are
	/// delivered to it.
	pub fn subscribe(&self) -> Subscription {
		let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = mpsc::unbounded_channel();

		if self.shared.closed.load(Ordering::Acquire) {
			// Sender dropped here, the inbox reports closed immediately
			return Subscription {
				id,
				rx,
				shared: Arc::clone(&self.shared),
			};
		}

		let start_seq = self.shared.next_seq.load(Ordering::SeqCst);
		self.shared.inboxes.insert(id, Inbox { start_seq, tx });

		// Shutdown may have cleared the registry before this insert landed
		if self.shared.closed.load(Ordering::SeqCst) {
			self.shared.inboxes.remove(&id);
		} else {
			debug!("Subscription {} registered at sequence {}", id, start_seq);
		}

		Subscription {
			id,
			rx,
			shared: Arc::clone(&self.shared),
		}
	}

	/// Deregister an inbox. Returns false if it was not registered.
	pub fn unsubscribe(&self, id: u64) -> bool {
		self.shared.unsubscribe(id)
	}

	pub fn subscriber_count(&self) -> usize {
		self.shared.inboxes.len()
	}

	pub fn is_running(&self) -> bool {
		!self.shared.closed.load(Ordering::Acquire)
	}

	/// Stop the fan-out task, close every inbox and wait for the task to exit
	pub async fn shutdown(&self) {
		if self.shared.closed.swap(true, Ordering::SeqCst) {
			return;
		}

		let _ = self.shared.commands.send(BusCommand::Shutdown);
		self.shared.inboxes.clear();

		let handle = self.task.lock().ok().and_then(|mut guard| guard.take());
		if let Some(handle) = handle {
			if let Err(e) = handle.await {
				warn!("Event bus fan-out task ended abnormally: {}", e);
			}
		}
		info!("Event bus stopped");
	}
}

async fn fan_out(mut rx: mpsc::UnboundedReceiver<BusCommand>, inboxes: Registry) {
	while let Some(command) = rx.recv().await {
		match command {
			BusCommand::Publish { seq, event } => {
				let targets: Vec<(u64, mpsc::UnboundedSender<BusEvent>)> = inboxes
					.iter()
					.filter(|entry| seq >= entry.value().start_seq)
					.map(|entry| (*entry.key(), entry.value().tx.clone()))
					.collect();

				for (id, tx) in targets {
					if tx.send(event.clone()).is_err() {
						inboxes.remove(&id);
					}
				}
			},
			BusCommand::Shutdown => break,
		}
	}
}

/// Publishing handle. Publishing never blocks and never fails; events sent
/// after shutdown are logged and dropped.
#[derive(Clone)]
pub struct EventPublisher {
	shared: Arc<Shared>,
}

impl EventPublisher {
	pub fn publish(&self, kind: EventKind, payload: Value) {
		self.shared.publish(kind, payload);
	}
}

/// A registered inbox. Dropping it unsubscribes.
pub struct Subscription {
	id: u64,
	rx: mpsc::UnboundedReceiver<BusEvent>,
	shared: Arc<Shared>,
}

impl Subscription {
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Next event, or `None` once the bus has shut down
	pub async fn recv(&mut self) -> Option<BusEvent> {
		self.rx.recv().await
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.shared.unsubscribe(self.id);
	}
}

/// Forward a subscription to a live client.
///
/// Sends `ready` first, then every event as it arrives, or a heartbeat when
/// nothing arrived within `heartbeat`. Returns when the client side of `sink`
/// goes away or the bus shuts down; the subscription is released either way.
pub async fn run_live_stream(
	mut subscription: Subscription,
	sink: mpsc::Sender<BusEvent>,
	heartbeat: Duration,
) {
	let ready = BusEvent::new(
		EventKind::Ready,
		json!({
			"subscription_id": subscription.id(),
			"timestamp": Utc::now().to_rfc3339(),
		}),
	);
	if sink.send(ready).await.is_err() {
		return;
	}

	loop {
		let next = tokio::select! {
			_ = sink.closed() => break,
			next = timeout(heartbeat, subscription.recv()) => next,
		};

		let event = match next {
			Ok(Some(event)) => event,
			Ok(None) => break,
			Err(_) => {
				debug!("Heartbeat for subscription {}", subscription.id());
				BusEvent::heartbeat()
			},
		};

		if sink.send(event).await.is_err() {
			break;
		}
	}

	debug!("Live stream for subscription {} ended", subscription.id());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_delivers_in_publish_order() {
		let bus = EventBus::start();
		let mut sub = bus.subscribe();

		for i in 0..3 {
			bus.publish(EventKind::ToolCall, json!({ "n": i }));
		}
		for i in 0..3 {
			let event = sub.recv().await.unwrap();
			assert_eq!(event.kind, EventKind::ToolCall);
			assert_eq!(event.payload["n"], i);
		}
		bus.shutdown().await;
	}

	#[tokio::test]
	async fn test_only_events_after_subscribe_are_delivered() {
		let bus = EventBus::start();
		bus.publish(EventKind::ToolCall, json!({ "n": "before" }));
		let mut sub = bus.subscribe();
		bus.publish(EventKind::ToolCall, json!({ "n": "after" }));

		let event = sub.recv().await.unwrap();
		assert_eq!(event.payload["n"], "after");
		bus.shutdown().await;
	}

	#[tokio::test]
	async fn test_every_subscriber_gets_a_copy() {
		let bus = EventBus::start();
		let mut a = bus.subscribe();
		let mut b = bus.subscribe();
		bus.publisher().publish(EventKind::ToolError, json!({}));

		assert_eq!(a.recv().await.unwrap().kind, EventKind::ToolError);
		assert_eq!(b.recv().await.unwrap().kind, EventKind::ToolError);
		bus.shutdown().await;
	}

	#[tokio::test]
	async fn test_unsubscribe_is_idempotent_and_drop_releases() {
		let bus = EventBus::start();
		let sub = bus.subscribe();
		let id = sub.id();
		assert_eq!(bus.subscriber_count(), 1);

		assert!(bus.unsubscribe(id));
		assert!(!bus.unsubscribe(id));
		drop(sub);

		let other = bus.subscribe();
		assert_eq!(bus.subscriber_count(), 1);
		drop(other);
		assert_eq!(bus.subscriber_count(), 0);
		bus.shutdown().await;
	}

	#[tokio::test]
	async fn test_shutdown_closes_inboxes_and_publish_is_noop() {
		let bus = EventBus::start();
		let mut sub = bus.subscribe();
		bus.shutdown().await;

		assert!(sub.recv().await.is_none());
		assert!(!bus.is_running());
		bus.publish(EventKind::ToolCall, json!({}));
		bus.shutdown().await;

		let mut late = bus.subscribe();
		assert!(late.recv().await.is_none());
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_subscribe_racing_shutdown_never_outlives_bus() {
		let bus = Arc::new(EventBus::start());

		let subscribers: Vec<_> = (0..64)
			.map(|_| {
				let bus = Arc::clone(&bus);
				tokio::spawn(async move { bus.subscribe() })
			})
			.collect();
		bus.shutdown().await;

		for handle in subscribers {
			let mut sub = handle.await.unwrap();
			let next = tokio::time::timeout(Duration::from_secs(1), sub.recv())
				.await
				.expect("inbox stayed open after shutdown");
			assert!(next.is_none());
		}
		assert_eq!(bus.subscriber_count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_live_stream_sends_ready_then_heartbeats() {
		let bus = EventBus::start();
		let (tx, mut rx) = mpsc::channel(8);
		let stream = tokio::spawn(run_live_stream(
			bus.subscribe(),
			tx,
			Duration::from_secs(15),
		));

		assert_eq!(rx.recv().await.unwrap().kind, EventKind::Ready);
		let beat = rx.recv().await.unwrap();
		assert_eq!(beat.kind, EventKind::Heartbeat);
		assert!(beat.payload["timestamp"].is_string());

		bus.publish(EventKind::ToolCall, json!({ "tool": "health_query_metrics" }));
		let event = rx.recv().await.unwrap();
		assert_eq!(event.kind, EventKind::ToolCall);

		drop(rx);
		stream.await.unwrap();
		assert_eq!(bus.subscriber_count(), 0);
		bus.shutdown().await;
	}

	#[tokio::test]
	async fn test_live_stream_ends_on_shutdown() {
		let bus = EventBus::start();
		let (tx, mut rx) = mpsc::channel(8);
		let stream = tokio::spawn(run_live_stream(
			bus.subscribe(),
			tx,
			Duration::from_secs(15),
		));

		assert_eq!(rx.recv().await.unwrap().kind, EventKind::Ready);
		bus.shutdown().await;
		stream.await.unwrap();
		assert!(rx.recv().await.is_none());
	}
}
