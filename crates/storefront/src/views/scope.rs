//! Cancellation scope for a view's API calls.
//!
//! Every API call a view issues runs through [`ViewScope::run`]. Dropping the
//! scope (the handler future went away) or calling [`ViewScope::cancel`]
//! aborts whatever is still in flight, and the call resolves to
//! [`ApiError::Cancelled`] so callers can skip their store writes.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, Abortable};

use crate::api::ApiError;

#[derive(Debug, Default)]
struct ScopeInner {
    handles: Mutex<Vec<AbortHandle>>,
    cancelled: AtomicBool,
}

impl ScopeInner {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let handles =
            std::mem::take(&mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in handles {
            handle.abort();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Owns the in-flight API calls of one view. Cancels them when dropped.
#[derive(Debug, Default)]
pub struct ViewScope {
    inner: Arc<ScopeInner>,
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run an API call inside this scope.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or [`ApiError::Cancelled`] if the scope
    /// is cancelled before or while it runs.
    pub async fn run<F, T>(&self, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let (handle, registration) = AbortHandle::new_pair();
        self.inner
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle.clone());
        // A cancel that raced the registration above already drained the list.
        if self.is_cancelled() {
            handle.abort();
        }

        Abortable::new(call, registration)
            .await
            .unwrap_or(Err(ApiError::Cancelled))
    }

    /// Abort every in-flight call and refuse new ones.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// A handle that can cancel this scope from elsewhere.
    #[must_use]
    pub fn canceller(&self) -> ScopeCanceller {
        ScopeCanceller {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}

/// Cancels a [`ViewScope`] without owning it.
#[derive(Debug, Clone)]
pub struct ScopeCanceller {
    inner: Arc<ScopeInner>,
}

impl ScopeCanceller {
    pub fn cancel(&self) {
        self.inner.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { Ok::<_, ApiError>(7) }).await, Ok(7));

        let err = ApiError::Transport("refused".into());
        assert_eq!(
            scope.run(async { Err::<u8, _>(err.clone()) }).await,
            Err(err)
        );
    }

    #[tokio::test]
    async fn test_cancelled_scope_refuses_calls() {
        let scope = ViewScope::new();
        scope.cancel();
        let result = scope.run(async { Ok::<_, ApiError>(1) }).await;
        assert_eq!(result, Err(ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_call() {
        let scope = ViewScope::new();
        let canceller = scope.canceller();
        let slow = scope.run(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ApiError>(())
        });
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        };
        let (result, ()) = tokio::join!(slow, cancel);
        assert_eq!(result, Err(ApiError::Cancelled));
        assert!(scope.is_cancelled());
    }

    #[test]
    fn test_drop_cancels() {
        let scope = ViewScope::new();
        let canceller = scope.canceller();
        drop(scope);
        assert!(canceller.inner.is_cancelled());
    }
}
