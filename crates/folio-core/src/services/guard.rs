use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::DomainError;

/// Busy flag for mutating actions: one outstanding request at a time.
#[derive(Debug, Default)]
pub(crate) struct InFlight(AtomicBool);

impl InFlight {
    pub(crate) fn begin(&self, action: &'static str) -> Result<InFlightGuard<'_>, DomainError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DomainError::Busy(action))?;
        Ok(InFlightGuard(&self.0))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the busy flag when dropped.
pub(crate) struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
