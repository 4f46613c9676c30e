//! Checking-context identity.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_CONTEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one global type universe (a full-check context, an
/// autocomplete context, ...). Caches keyed by context use this rather than
/// an address, so a dropped context's id is never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    pub fn fresh() -> ContextId {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}
