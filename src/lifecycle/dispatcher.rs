//! # Sync Dispatcher
//!
//! The task between the transport and the registry. Whatever receives the server's broadcasts
//! (WebSocket, IPC listener) decodes each into a [`SyncMessage`] and sends it here; the
//! dispatcher hands messages to [`StoreRegistry::dispatch_message`] one at a time, in arrival
//! order, so per-resource ordering is preserved.

use crate::registry::{DispatchOutcome, StoreRegistry, SyncMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub struct SyncDispatcher {
    receiver: mpsc::Receiver<SyncMessage>,
    registry: StoreRegistry,
}

impl SyncDispatcher {
    /// Creates a dispatcher over `registry` and the sender transports feed it through.
    pub fn new(registry: StoreRegistry, buffer_size: usize) -> (Self, mpsc::Sender<SyncMessage>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { receiver, registry }, sender)
    }

    /// Runs until every sender has been dropped.
    pub async fn run(mut self) {
        info!("Sync dispatcher started");
        let mut delivered = 0usize;
        let mut dropped = 0usize;

        while let Some(message) = self.receiver.recv().await {
            match self.registry.dispatch_message(message) {
                DispatchOutcome::Delivered(outcome) => {
                    debug!(?outcome, "Delivered");
                    delivered += 1;
                }
                _ => dropped += 1,
            }
        }

        info!(delivered, dropped, "Sync dispatcher stopped");
    }
}
