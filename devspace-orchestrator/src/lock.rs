//! Optional per-identity serialization of the create path.
//!
//! Without it, concurrent first requests for one identity race to create the
//! same container and the loser recovers through the name-conflict path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::naming::Identity;

#[derive(Debug, Default)]
pub struct IdentityLocks {
    slots: Mutex<HashMap<Identity, Arc<Mutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutex shared by every caller asking for the same identity.
    pub fn slot(&self, id: &Identity) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(id.clone()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_identity_shares_a_slot() {
        let locks = IdentityLocks::new();
        let a = locks.slot(&Identity::from(1));
        let b = locks.slot(&Identity::from(1));
        let c = locks.slot(&Identity::from(2));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
