//! Background driver for a resolution stream.

use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Resolution, ResolutionStream};
use crate::constants::MESSAGE_CHANNEL_CAPACITY;
use crate::core::Result;

/// Messages produced by a running generation.
///
/// The search runs on a spawned Tokio task that starts immediately and pushes results into
/// a bounded channel, so at most [`MESSAGE_CHANNEL_CAPACITY`] results are computed ahead of
/// the consumer. The stream ends when the search space is exhausted, after the first
/// error, or once cancelled.
///
/// Dropping the stream cancels every in-flight branch.
pub struct MessageStream {
    receiver: mpsc::Receiver<Result<Resolution>>,
    token: CancellationToken,
    driver: JoinHandle<()>,
}

impl MessageStream {
    /// Spawn a task driving `stream`. Must be called within a Tokio runtime.
    pub(crate) fn spawn(stream: ResolutionStream, token: CancellationToken) -> Self {
        let (sender, receiver) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
        let driver = tokio::spawn(drive(stream, sender, token.clone()));

        Self {
            receiver,
            token,
            driver,
        }
    }

    /// Stop the search. Results already buffered can still be received.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the search has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The token bounding every branch of this search.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

async fn drive(
    mut stream: ResolutionStream,
    sender: mpsc::Sender<Result<Resolution>>,
    token: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            biased;
            () = token.cancelled() => break,
            () = sender.closed() => break,
            item = stream.next() => item,
        };
        let Some(item) = item else {
            tracing::debug!("Resolution stream exhausted");
            break;
        };

        let failed = item.is_err();
        if sender.send(item).await.is_err() || failed {
            break;
        }
    }
}

impl Stream for MessageStream {
    type Item = Result<Resolution>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        self.token.cancel();
        self.driver.abort();
    }
}

impl std::fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStream")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
