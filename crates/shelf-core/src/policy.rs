//! # Access Policy
//!
//! Pure authorization decisions. Every read/write rule in the system goes
//! through these functions; nothing else inspects [`Role`].
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  can_write(caller, owner)     = caller.id == owner || caller is admin  │
//! │  can_read_full(caller, owner) = same rule                               │
//! │  can_administer(caller)       = caller is admin                         │
//! │                                                                         │
//! │  Write denied      → AuthorizationError (403), nothing changes          │
//! │  Full read denied  → reduced projection, never an error                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::types::{Profile, Role, User, UserId};

/// The resolved identity acting on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: Role,
}

impl Caller {
    pub const fn new(id: UserId, role: Role) -> Self {
        Caller { id, role }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Caller::new(user.id, user.role)
    }
}

/// May `caller` modify a resource owned by `owner`?
pub fn can_write(caller: &Caller, owner: UserId) -> bool {
    caller.id == owner || caller.is_admin()
}

/// May `caller` see the full version of a resource owned by `owner`?
pub fn can_read_full(caller: &Caller, owner: UserId) -> bool {
    can_write(caller, owner)
}

/// May `caller` perform catalog-wide administrative actions (tag removal)?
pub fn can_administer(caller: &Caller) -> bool {
    caller.is_admin()
}

/// Picks the profile projection `caller` is allowed to see for `target`.
pub fn visible_profile(caller: &Caller, target: &User) -> Profile {
    if can_read_full(caller, target.id) {
        Profile::Full(target.profile())
    } else {
        Profile::Public(target.public_profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    const OWNER: UserId = UserId::new(1);

    fn ordinary(id: i64) -> Caller {
        Caller::new(UserId::new(id), Role::Ordinary)
    }

    fn admin(id: i64) -> Caller {
        Caller::new(UserId::new(id), Role::Admin)
    }

    #[test]
    fn test_owner_can_write() {
        assert!(can_write(&ordinary(1), OWNER));
    }

    #[test]
    fn test_admin_can_write_others() {
        assert!(can_write(&admin(2), OWNER));
    }

    #[test]
    fn test_other_ordinary_cannot_write() {
        assert!(!can_write(&ordinary(3), OWNER));
    }

    #[test]
    fn test_read_full_follows_write_rule() {
        assert!(can_read_full(&ordinary(1), OWNER));
        assert!(can_read_full(&admin(2), OWNER));
        assert!(!can_read_full(&ordinary(3), OWNER));
    }

    #[test]
    fn test_only_admin_administers() {
        assert!(can_administer(&admin(5)));
        assert!(!can_administer(&ordinary(1)));
    }

    #[test]
    fn test_visible_profile_degrades() {
        let target = User {
            id: OWNER,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            cep: None,
            cpf: None,
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            age: 34,
            password_hash: String::new(),
            role: Role::Ordinary,
            created_at: Utc::now(),
        };

        assert!(matches!(visible_profile(&ordinary(1), &target), Profile::Full(_)));
        assert!(matches!(visible_profile(&admin(9), &target), Profile::Full(_)));
        assert!(matches!(visible_profile(&ordinary(3), &target), Profile::Public(_)));
    }
}
