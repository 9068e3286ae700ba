// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Abortable request handles

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Cancels the request it was taken from.
///
/// Cloneable so it can be moved into another task (a Ctrl-C handler, a
/// watchdog). Aborting is idempotent and does nothing once the request has
/// settled.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    token: CancellationToken,
}

impl AbortHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Abort the request
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Check if abort was requested
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// An in-flight request.
///
/// The request starts as soon as the handle is created; awaiting the handle
/// yields the response body.
#[derive(Debug)]
pub struct RequestHandle {
    abort: AbortHandle,
    task: Task,
}

#[derive(Debug)]
enum Task {
    Running(JoinHandle<Result<String>>),
    /// Never started; yields the error once
    Failed(Option<Error>),
}

impl RequestHandle {
    /// Run `pipeline` on the current runtime; it receives the token it must
    /// honour. Without a runtime the handle fails with [`Error::Other`].
    pub(crate) fn spawn<F, Fut>(pipeline: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Task::Running(runtime.spawn(pipeline(token.clone()))),
            Err(e) => {
                tracing::warn!(error = %e, "No tokio runtime, request not started");
                Task::Failed(Some(Error::other(format!(
                    "no tokio runtime available to run the request: {}",
                    e
                ))))
            }
        };
        Self {
            abort: AbortHandle::new(token),
            task,
        }
    }

    /// Abort the request
    pub fn abort(&self) {
        self.abort.abort();
    }

    /// Check if abort was requested
    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Detached abort handle for this request
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }
}

impl Future for RequestHandle {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.task {
            Task::Running(task) => Pin::new(task).poll(cx).map(|joined| match joined {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(Error::Aborted),
                Err(e) => Err(Error::other(format!("request task failed: {}", e))),
            }),
            Task::Failed(error) => Poll::Ready(Err(error
                .take()
                .unwrap_or_else(|| Error::other("request handle polled after completion")))),
        }
    }
}
