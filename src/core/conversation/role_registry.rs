// Process-wide role assignments. Nothing here is persisted: a restart
// forgets every assignment except the configured administrator.

use super::conversation_models::Role;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct RoleRegistry {
    configured_admin: Option<u64>,
    assignments: DashMap<u64, Role>,
    // Flipped exactly once, by whoever wins the first-admin race.
    first_admin_claimed: AtomicBool,
}

impl RoleRegistry {
    pub fn new(configured_admin: Option<u64>) -> Self {
        Self {
            configured_admin,
            assignments: DashMap::new(),
            first_admin_claimed: AtomicBool::new(false),
        }
    }

    pub fn configured_admin(&self) -> Option<u64> {
        self.configured_admin
    }

    /// Makes `user_id` admin if nobody has been assigned a role yet.
    /// Returns true only for the single caller that won.
    pub fn claim_first_admin(&self, user_id: u64) -> bool {
        let won = self
            .first_admin_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.assignments.insert(user_id, Role::Admin);
            tracing::info!(user_id, "First user claimed the admin role");
        }
        won
    }

    pub fn role_of(&self, user_id: u64) -> Role {
        if self.configured_admin == Some(user_id) {
            return Role::Admin;
        }
        self.assignments
            .get(&user_id)
            .map(|role| *role)
            .unwrap_or(Role::Staff)
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.role_of(user_id) == Role::Admin
    }

    /// Explicit assignment. Counts as "an assignment exists", so the
    /// first-caller promotion no longer applies afterwards.
    pub fn assign(&self, user_id: u64, role: Role) {
        self.first_admin_claimed.store(true, Ordering::Release);
        self.assignments.insert(user_id, role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let roles = RoleRegistry::new(None);
        assert!(roles.claim_first_admin(1));
        assert!(!roles.claim_first_admin(2));
        assert_eq!(roles.role_of(1), Role::Admin);
        assert_eq!(roles.role_of(2), Role::Staff);
    }

    #[test]
    fn test_configured_admin_is_always_admin() {
        let roles = RoleRegistry::new(Some(99));
        assert!(roles.claim_first_admin(1));
        assert!(roles.is_admin(99));
        roles.assign(99, Role::Staff);
        assert!(roles.is_admin(99));
    }

    #[test]
    fn test_assignment_blocks_first_claim() {
        let roles = RoleRegistry::new(Some(99));
        roles.assign(5, Role::Staff);
        assert!(!roles.claim_first_admin(1));
        assert_eq!(roles.role_of(1), Role::Staff);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_produce_one_admin() {
        let roles = Arc::new(RoleRegistry::new(None));
        let mut handles = Vec::new();
        for user_id in 0..32u64 {
            let roles = Arc::clone(&roles);
            handles.push(tokio::spawn(async move { roles.claim_first_admin(user_id) }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!((0..32u64).filter(|id| roles.is_admin(*id)).count(), 1);
    }
}
