// Connectivity probe port (database reachability check before startup)
// reason: async-trait 필요 (dyn dispatch from the daemon)
use async_trait::async_trait;

use crate::error::Result;

/// Checks that an external dependency answers
///
/// Used by StartupRetry before the listener is started.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Single reachability check
    ///
    /// # Errors
    /// - ListenerError::Connectivity if the dependency does not answer
    async fn ping(&self) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::ListenerError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Probe that fails a fixed number of times before answering
    pub struct ScriptedProbe {
        /// None = never answers
        failures_before_success: Option<u32>,
        calls: AtomicU32,
    }

    impl ScriptedProbe {
        pub fn reachable() -> Self {
            Self::failing_times(0)
        }

        pub fn failing_times(failures: u32) -> Self {
            Self {
                failures_before_success: Some(failures),
                calls: AtomicU32::new(0),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                failures_before_success: None,
                calls: AtomicU32::new(0),
            }
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConnectivityProbe for ScriptedProbe {
        async fn ping(&self) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.failures_before_success {
                Some(failures) if call > failures => Ok(()),
                _ => Err(ListenerError::Connectivity(format!(
                    "connection refused (ping #{})",
                    call
                ))),
            }
        }
    }
}
