//! Request-scoped context handed to every RPC method.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use crate::codes::Code;
use crate::status::Status;

/// Header a caller (or a request-id middleware) uses to name a request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub(crate) fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(REQUEST_ID_HEADER).and_then(|value| value.to_str().ok())
}

/// Carries the request id, an optional deadline and the cancellation signal
/// of the HTTP request that triggered a call.
///
/// Clones share the same signal. The signal fires when the [`CancelGuard`]
/// created alongside the context is dropped, which the adapter ties to the
/// lifetime of the request future: a client disconnect or an outer timeout
/// layer drops that future and cancels every clone.
#[derive(Clone, Debug)]
pub struct Context {
    request_id: Arc<str>,
    deadline: Option<Instant>,
    cancel: watch::Receiver<bool>,
}

/// Cancels the paired [`Context`] when dropped.
#[derive(Debug)]
pub struct CancelGuard {
    tx: watch::Sender<bool>,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

/// Why [`Context::run`] gave up on a future.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("request cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for Status {
    fn from(interrupted: Interrupted) -> Self {
        let code = match interrupted {
            Interrupted::Cancelled => Code::RequestTimeout,
            Interrupted::DeadlineExceeded => Code::GatewayTimeout,
        };
        Status::new(code, interrupted)
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self {
            request_id: Uuid::new_v4().to_string().into(),
            deadline: None,
            cancel: rx,
        }
    }

    /// Creates the context of one inbound request. A fresh UUID is used when
    /// the caller did not supply a request id.
    pub fn for_request(request_id: Option<&str>) -> (Self, CancelGuard) {
        let (tx, rx) = watch::channel(false);
        let request_id = match request_id {
            Some(id) if !id.is_empty() => Arc::from(id),
            _ => Arc::from(Uuid::new_v4().to_string()),
        };
        let ctx = Self {
            request_id,
            deadline: None,
            cancel: rx,
        };
        (ctx, CancelGuard { tx })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Narrows the deadline. A later deadline than the current one is ignored.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolves once the request is cancelled. Never resolves for
    /// [`Context::background`].
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Drives `fut` until it completes, the request is cancelled, or the
    /// deadline passes, whichever comes first. `fut` is dropped on
    /// interruption.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
