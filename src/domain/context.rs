//! Request-scoped cancellation and deadlines
//!
//! Every cache operation that may block on the embedding provider takes a
//! [`RequestContext`]. The context carries an optional cancellation signal and
//! an optional deadline; [`RequestContext::run`] races a provider call against
//! both.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::domain::DomainError;

/// Cancellation signal and deadline for a single caller
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Handle that cancels every context cloned from the one it was created with
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Create a cancellable context and the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);

        let context = Self {
            cancel: Some(receiver),
            deadline: None,
        };

        (context, CancelHandle { sender })
    }

    /// Bound the context by a timeout; an earlier deadline already set wins
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound the context by an absolute deadline; an earlier deadline already set wins
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Get the deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context was cancelled or its deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    fn check(&self) -> Result<(), DomainError> {
        if let Some(ref receiver) = self.cancel {
            if *receiver.borrow() {
                return Err(DomainError::cancelled("request cancelled"));
            }
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DomainError::cancelled("deadline exceeded"));
            }
        }

        Ok(())
    }

    /// Run an operation, aborting it when the context is cancelled or expires
    pub async fn run<F, T>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        self.check()?;

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(DomainError::cancelled("request cancelled")),
            _ = self.deadline_elapsed() => Err(DomainError::cancelled("deadline exceeded")),
            result = operation => result,
        }
    }

    async fn cancelled(&self) {
        match self.cancel.clone() {
            Some(mut receiver) => {
                // A dropped handle can never cancel
                if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }

    async fn deadline_elapsed(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}
