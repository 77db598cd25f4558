// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Execution context carrying cancellation and deadlines
//!
//! A [`Context`] is cheap to clone and is threaded through every evaluable.
//! Derived contexts observe their parent's cancellation: cancelling a parent
//! cancels every context derived from it, never the other way around.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::error::{EvaluationError, EvaluationResult};

/// Execution context for one or more evaluations
#[derive(Debug, Clone, Default)]
pub struct Context {
    signals: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

/// Handle that cancels the context it was created with
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Cancel the associated context and everything derived from it
    pub fn cancel(&self) {
        self.signal.store(true, Ordering::Release);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.signal.load(Ordering::Acquire)
    }
}

impl Context {
    /// Non-cancellable context without deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context together with the handle that cancels it
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let signal = Arc::new(AtomicBool::new(false));
        let mut signals = self.signals.clone();
        signals.push(Arc::clone(&signal));
        let child = Self {
            signals,
            deadline: self.deadline,
        };
        (child, CancelHandle { signal })
    }

    /// Derive a child context that expires at `deadline`
    ///
    /// An earlier deadline inherited from the parent stays in force.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            signals: self.signals.clone(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Deadline in force, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check if the context was cancelled or its deadline passed
    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    /// Fail with the cancellation error if evaluation must stop
    #[inline]
    pub fn check(&self) -> EvaluationResult<()> {
        if self.signals.iter().any(|s| s.load(Ordering::Acquire)) {
            return Err(EvaluationError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(EvaluationError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_cancels() {
        let context = Context::background();
        assert!(context.check().is_ok());
        assert!(context.deadline().is_none());
    }

    #[test]
    fn test_parent_cancellation_reaches_children() {
        let (parent, handle) = Context::background().with_cancel();
        let (child, child_handle) = parent.with_cancel();
        let timed = child.with_timeout(Duration::from_secs(60));

        child_handle.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        handle.cancel();
        assert!(matches!(parent.check(), Err(EvaluationError::Cancelled)));
        assert!(matches!(timed.check(), Err(EvaluationError::Cancelled)));
    }

    #[test]
    fn test_expired_deadline() {
        let context = Context::background().with_deadline(Instant::now());
        assert!(matches!(
            context.check(),
            Err(EvaluationError::DeadlineExceeded)
        ));
    }

    #[test]
    fn test_earlier_deadline_is_kept() {
        let soon = Instant::now() + Duration::from_millis(10);
        let context = Context::background()
            .with_deadline(soon)
            .with_timeout(Duration::from_secs(3600));
        assert_eq!(context.deadline(), Some(soon));
    }
}
