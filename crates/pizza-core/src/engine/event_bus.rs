//! Broadcast bus for assistant events.

use pizza_types::AssistantEvent;
use tokio::sync::broadcast;

/// Cloneable handle to a broadcast channel of `AssistantEvent`s.
///
/// Publishing never blocks; slow subscribers lag and miss events.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<AssistantEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Sends an event to every subscriber. Fails only when nobody listens.
	pub fn publish(
		&self,
		event: AssistantEvent,
	) -> Result<usize, broadcast::error::SendError<AssistantEvent>> {
		self.sender.send(event)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}
