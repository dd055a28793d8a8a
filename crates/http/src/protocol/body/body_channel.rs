use bytes::{Bytes, BytesMut};
use tokio::sync::watch;
use tracing::trace;

use crate::protocol::body::request_body::{BodyProgress, BodyState};
use crate::protocol::body::RequestBody;

/// Creates the two halves of a streamed request body.
///
/// `total` is the announced `Content-Length`, if there is one.
pub fn body_channel(total: Option<u64>) -> (BodySender, RequestBody) {
    let initial = BodyState { progress: BodyProgress { received: 0, total, complete: false }, data: None };
    let (state, receiver) = watch::channel(initial);
    (BodySender { state, buffer: BytesMut::new() }, RequestBody::new(receiver))
}

/// The connection side of a streamed request body.
///
/// Chunks are appended to one buffer; [`BodySender::finish`] freezes it and publishes the
/// complete body. Dropping an unfinished sender aborts the body for the handler.
#[derive(Debug)]
pub struct BodySender {
    state: watch::Sender<BodyState>,
    buffer: BytesMut,
}

impl BodySender {
    pub fn push(&mut self, chunk: &Bytes) {
        if self.is_complete() || chunk.is_empty() {
            return;
        }

        self.buffer.extend_from_slice(chunk);
        let received = self.buffer.len() as u64;
        trace!(size = chunk.len(), received, "body chunk received");
        self.state.send_modify(|state| state.progress.received = received);
    }

    /// Marks the body complete. Later calls are ignored.
    pub fn finish(&mut self) {
        if self.is_complete() {
            return;
        }

        let data = self.buffer.split().freeze();
        self.state.send_modify(|state| {
            state.progress.received = data.len() as u64;
            state.progress.complete = true;
            state.data = Some(data);
        });
    }

    pub fn is_complete(&self) -> bool {
        self.state.borrow().progress.complete
    }

    pub fn progress(&self) -> BodyProgress {
        self.state.borrow().progress
    }
}
