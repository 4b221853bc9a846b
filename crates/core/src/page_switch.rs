//! Versioned tracking of in-flight page loads
//!
//! Page renders and document loads complete asynchronously and cannot be
//! cancelled. Every request gets a [`RenderToken`]; a newer request supersedes
//! all older ones, and a completion carrying a superseded token is rejected so
//! a slow callback cannot overwrite state for a page the user already left.

/// Token handed out when a load starts and presented again on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderToken {
    version: u64,
    page: u32,
}

impl RenderToken {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Page the load was started for (0 for whole-document loads)
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Outcome of presenting a token on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSwitchResult {
    /// The token is the newest one; apply the result
    Current,
    /// A newer load was started; drop the result
    Stale,
}

impl PageSwitchResult {
    pub fn is_current(&self) -> bool {
        matches!(self, PageSwitchResult::Current)
    }
}

/// Issues monotonically increasing tokens and remembers the newest one
#[derive(Debug, Clone, Default)]
pub struct PageLoadTracker {
    version: u64,
    pending: Option<RenderToken>,
}

impl PageLoadTracker {
    /// Create a new tracker with nothing in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load for `page`, superseding any load still in flight
    pub fn begin(&mut self, page: u32) -> RenderToken {
        self.version += 1;
        let token = RenderToken {
            version: self.version,
            page,
        };
        self.pending = Some(token);
        token
    }

    /// Finish a load
    ///
    /// Only the newest token is accepted, and only once.
    pub fn complete(&mut self, token: RenderToken) -> PageSwitchResult {
        if self.pending == Some(token) {
            self.pending = None;
            PageSwitchResult::Current
        } else {
            log::warn!(
                "discarding stale load for page {} (version {}, current {})",
                token.page,
                token.version,
                self.version
            );
            PageSwitchResult::Stale
        }
    }

    /// Drop whatever is in flight; every outstanding token becomes stale
    pub fn invalidate(&mut self) {
        self.version += 1;
        self.pending = None;
    }

    /// Whether a load is still waiting for completion
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the load still waiting for completion
    pub fn pending(&self) -> Option<RenderToken> {
        self.pending
    }

    pub fn current_version(&self) -> u64 {
        self.version
    }
}
