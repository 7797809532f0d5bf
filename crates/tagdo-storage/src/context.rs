//! Context identity within a storage scope.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one execution context ("tab") within a storage scope.
///
/// Ids are issued by the scope in the order contexts are opened, starting
/// at [`ContextId::FIRST`]. They can't be built from outside this crate,
/// so two handles compare equal only if the same scope issued the id to
/// the same context. Ids from different scopes are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// The context returned by [`ScopedStorage::open`](crate::ScopedStorage::open).
    pub const FIRST: Self = Self(1);

    /// Position of this context in its scope's opening order, from 1.
    pub fn ordinal(self) -> u64 {
        self.0
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Issues the [`ContextId`]s of one scope.
#[derive(Debug)]
pub(crate) struct ContextIds {
    next: AtomicU64,
}

impl ContextIds {
    /// An allocator whose first context ([`ContextId::FIRST`]) is already
    /// taken by the scope's opener.
    pub(crate) fn after_first() -> Self {
        Self {
            next: AtomicU64::new(ContextId::FIRST.0 + 1),
        }
    }

    pub(crate) fn issue(&self) -> ContextId {
        ContextId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_issue_follows_opening_order() {
        let ids = ContextIds::after_first();

        let second = ids.issue();
        let third = ids.issue();

        assert!(ContextId::FIRST.is_first());
        assert_eq!(second.ordinal(), 2);
        assert!(ContextId::FIRST < second && second < third);
        assert_eq!(third.to_string(), "ctx-3");
    }

    #[test]
    fn test_issue_is_unique_across_threads() {
        let ids = Arc::new(ContextIds::after_first());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..250).map(|_| ids.issue()).collect::<Vec<_>>())
            })
            .collect();
        let issued: HashSet<ContextId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(issued.len(), 1000);
        assert!(!issued.contains(&ContextId::FIRST));
    }
}
