use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket handed out when a request is issued on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Orders overlapping requests on one channel so that only the response to
/// the most recently issued request is applied.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.issued.load(Ordering::Acquire) == token.0
    }
}
