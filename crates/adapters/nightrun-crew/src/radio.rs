use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use nightrun_core::commentary::{CommentaryRequest, CrewMessage};

use crate::chief::CrewChief;

/// Fire-and-forget commentary requests for a frame loop.
///
/// At most one request is in flight; calls made while one is outstanding
/// are dropped. Replies are collected with [`CrewRadio::poll`].
pub struct CrewRadio {
    chief: Arc<CrewChief>,
    tx: mpsc::UnboundedSender<CrewMessage>,
    rx: mpsc::UnboundedReceiver<CrewMessage>,
    busy: Arc<AtomicBool>,
}

impl CrewRadio {
    pub fn new(chief: CrewChief) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            chief: Arc::new(chief),
            tx,
            rx,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue a request on the current tokio runtime. Returns `false` if one
    /// is already outstanding.
    pub fn request(&self, request: CommentaryRequest) -> bool {
        if self.busy.swap(true, Ordering::AcqRel) {
            tracing::debug!("Crew chief busy, skipping commentary request");
            return false;
        }
        let chief = Arc::clone(&self.chief);
        let tx = self.tx.clone();
        let busy = Arc::clone(&self.busy);
        tokio::spawn(async move {
            let message = chief.commentary(&request).await;
            busy.store(false, Ordering::Release);
            let _ = tx.send(message);
        });
        true
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Next delivered message, if any, without blocking.
    pub fn poll(&mut self) -> Option<CrewMessage> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message.
    pub async fn recv(&mut self) -> Option<CrewMessage> {
        self.rx.recv().await
    }
}
