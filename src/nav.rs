//! Navigation seam and visited-path history.

use std::collections::VecDeque;

use crate::routes::HOME_ROUTE;

/// Most recent paths kept for the "go back" fallback.
const HISTORY_CAPACITY: usize = 50;

/// Abstract push/replace routing capability.
///
/// The session controller uses it for the forced redirect on logout; a
/// UI shell implements it over its router. Absence of a navigator is
/// tolerated everywhere.
pub trait Navigator: Send + Sync {
    /// Navigate, pushing the current location onto the history stack.
    fn push(&self, path: &str);

    /// Navigate, replacing the current location.
    fn replace(&self, path: &str);
}

// =============================================================================
// NAVIGATION HISTORY
// =============================================================================

/// Bounded trace of visited paths; oldest entries are evicted first.
///
/// Single writer/reader (the owning shell), so this is plain bookkeeping
/// with no locking.
#[derive(Clone, Debug, Default)]
pub struct NavigationHistory {
    paths: VecDeque<String>,
}

impl NavigationHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visited path, evicting the oldest entry past capacity.
    pub fn push(&mut self, path: &str) {
        if self.paths.len() == HISTORY_CAPACITY {
            self.paths.pop_front();
        }
        self.paths.push_back(path.to_owned());
    }

    /// Path to go back to: the entry before the current one, or home when
    /// there is nothing to go back to.
    #[must_use]
    pub fn back_target(&self) -> &str {
        if self.paths.len() < 2 {
            return HOME_ROUTE;
        }
        &self.paths[self.paths.len() - 2]
    }

    /// Drop the current entry, making the previous one current again.
    pub fn pop(&mut self) -> Option<String> {
        self.paths.pop_back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Most recently visited path.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.paths.back().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;
