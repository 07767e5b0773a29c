use std::sync::Arc;

use tokio::sync::{mpsc, watch};

struct RawContext {
	_alive: mpsc::Sender<()>,
	cancelled: watch::Receiver<bool>,
}

/// A cancellation token shared by every long running task of a process.
///
/// Cloning is cheap. The [`Handler`] returned alongside the first context
/// cancels all clones and then waits until every clone has been dropped.
#[derive(Clone)]
pub struct Context(Arc<RawContext>);

pub struct Handler {
	alive: mpsc::Receiver<()>,
	cancel: watch::Sender<bool>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let (alive_tx, alive_rx) = mpsc::channel(1);
		let (cancel_tx, cancel_rx) = watch::channel(false);

		(
			Self(Arc::new(RawContext {
				_alive: alive_tx,
				cancelled: cancel_rx,
			})),
			Handler {
				alive: alive_rx,
				cancel: cancel_tx,
			},
		)
	}

	/// Resolves once the context has been cancelled, or its handler dropped.
	pub async fn done(&self) {
		let mut cancelled = self.0.cancelled.clone();
		while !*cancelled.borrow_and_update() {
			if cancelled.changed().await.is_err() {
				break;
			}
		}
	}

	pub fn is_done(&self) -> bool {
		*self.0.cancelled.borrow() || self.0.cancelled.has_changed().is_err()
	}
}

impl Handler {
	/// Cancels every context clone and waits for all of them to be dropped.
	pub async fn cancel(self) {
		let Self { mut alive, cancel } = self;
		let _ = cancel.send(true);
		let _ = alive.recv().await;
	}
}
