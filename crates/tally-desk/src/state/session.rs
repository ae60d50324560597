//! # Session State
//!
//! The shared, mutable sale draft behind the desk facade.
//!
//! The draft itself (operations, caps, snapshots) lives in
//! `tally_core::sale`; this wrapper only adds the locking discipline the
//! service layer needs.

use std::sync::{Arc, Mutex};

use tally_core::SaleDraft;

/// Shared sale session state.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<SaleDraft>>` because:
/// - `Arc`: Allows shared ownership across threads
/// - `Mutex`: Ensures only one caller mutates the draft at a time
///
/// ## Why Not RwLock?
/// Draft operations are quick, and most operations modify state.
/// A RwLock would add complexity with minimal benefit.
#[derive(Debug, Clone)]
pub struct SessionState {
    draft: Arc<Mutex<SaleDraft>>,
}

impl SessionState {
    /// Creates a new empty session.
    pub fn new() -> Self {
        SessionState {
            draft: Arc::new(Mutex::new(SaleDraft::new())),
        }
    }

    /// Executes a function with read access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let subtotal = session.with_draft(|d| d.subtotal());
    /// ```
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SaleDraft) -> R,
    {
        let draft = self.draft.lock().expect("Sale draft mutex poisoned");
        f(&draft)
    }

    /// Executes a function with write access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session.with_draft_mut(|d| d.add_product(&product, 1))?;
    /// ```
    pub fn with_draft_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SaleDraft) -> R,
    {
        let mut draft = self.draft.lock().expect("Sale draft mutex poisoned");
        f(&mut draft)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_empty() {
        let session = SessionState::new();
        assert!(session.with_draft(|d| d.is_empty()));
    }

    #[test]
    fn test_clones_share_the_draft() {
        let session = SessionState::new();
        let other = session.clone();

        session.with_draft_mut(|d| d.discount_cents = 500);
        assert_eq!(other.with_draft(|d| d.discount_cents), 500);
    }
}
