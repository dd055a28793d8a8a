use bytes::Bytes;
use tokio::sync::watch;

use crate::protocol::BodyError;

/// How much of a request body has arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyProgress {
    /// Bytes received so far
    pub received: u64,
    /// The announced `Content-Length`, if any
    pub total: Option<u64>,
    /// Set once the whole body has been received
    pub complete: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BodyState {
    pub(crate) progress: BodyProgress,
    /// Present exactly when `progress.complete` is set
    pub(crate) data: Option<Bytes>,
}

/// The handler side of a request body.
///
/// The body is accumulated by the connection; [`RequestBody::finish_reading`] suspends
/// until it is complete and then yields all of it at once.
#[derive(Debug, Clone)]
pub struct RequestBody {
    state: watch::Receiver<BodyState>,
}

impl RequestBody {
    pub(crate) fn new(state: watch::Receiver<BodyState>) -> Self {
        Self { state }
    }

    /// A body that is complete and empty, used for requests without a body.
    pub fn empty() -> Self {
        Self::complete(Bytes::new())
    }

    /// A body that is already complete.
    pub fn complete(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let length = data.len() as u64;
        let progress = BodyProgress { received: length, total: Some(length), complete: true };
        // the sender is dropped right away, the receiver keeps the last value
        let (_sender, receiver) = watch::channel(BodyState { progress, data: Some(data) });
        Self::new(receiver)
    }

    pub fn is_complete(&self) -> bool {
        self.state.borrow().progress.complete
    }

    pub fn progress(&self) -> BodyProgress {
        self.state.borrow().progress
    }

    /// Waits until the whole body has been received and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Aborted`] when the connection stops feeding the body before
    /// it is complete, e.g. because the peer went away or the request timed out.
    pub async fn finish_reading(&mut self) -> Result<Bytes, BodyError> {
        self.finish_reading_with(|_, _| {}).await
    }

    /// Same as [`RequestBody::finish_reading`], calling `on_progress(received, total)`
    /// whenever more bytes arrive and once more on completion.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Aborted`] when the body can no longer complete.
    pub async fn finish_reading_with<F>(&mut self, mut on_progress: F) -> Result<Bytes, BodyError>
    where
        F: FnMut(u64, Option<u64>),
    {
        loop {
            let received = {
                let state = self.state.borrow_and_update();
                on_progress(state.progress.received, state.progress.total);
                if let Some(data) = &state.data {
                    return Ok(data.clone());
                }
                state.progress.received
            };

            if self.state.changed().await.is_err() {
                // sender dropped, but a final value may still be unseen
                let state = self.state.borrow_and_update();
                return match &state.data {
                    Some(data) => {
                        on_progress(state.progress.received, state.progress.total);
                        Ok(data.clone())
                    }
                    None => Err(BodyError::Aborted { received }),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_body_is_ready() {
        let mut body = RequestBody::complete("hello");
        assert!(body.is_complete());
        assert_eq!(body.progress(), BodyProgress { received: 5, total: Some(5), complete: true });
        assert_eq!(body.finish_reading().await.unwrap(), Bytes::from_static(b"hello"));
        // completion is sticky
        assert_eq!(body.finish_reading().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn empty_body() {
        let mut body = RequestBody::empty();
        assert!(body.is_complete());
        assert!(body.finish_reading().await.unwrap().is_empty());
    }
}
