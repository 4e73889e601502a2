//! Pure authorization decisions. No I/O: handlers gather the actor from the
//! verified token and the target id from the path, then consult the table.

use crate::users::repo::Role;

/// What a request is trying to do to a target user. A role change is its
/// own action so the table can gate it separately from profile edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    UpdateProfile,
    UpdateRole,
    Delete,
}

/// The decision table. Unauthenticated requests never get here (the token
/// extractor rejects them with 401), so actors always carry a role.
pub fn permits(role: Role, actor_id: i64, target_id: i64, action: Action) -> bool {
    match role {
        Role::Admin => true,
        Role::User => match action {
            // Read by id is gated by authentication only, not ownership.
            Action::Read => true,
            Action::UpdateProfile | Action::Delete => actor_id == target_id,
            Action::UpdateRole => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF: i64 = 7;
    const OTHER: i64 = 8;

    #[test]
    fn admin_is_allowed_everything() {
        for action in [
            Action::Read,
            Action::UpdateProfile,
            Action::UpdateRole,
            Action::Delete,
        ] {
            assert!(permits(Role::Admin, SELF, SELF, action));
            assert!(permits(Role::Admin, SELF, OTHER, action));
        }
    }

    #[test]
    fn user_may_read_any_target() {
        assert!(permits(Role::User, SELF, SELF, Action::Read));
        assert!(permits(Role::User, SELF, OTHER, Action::Read));
    }

    #[test]
    fn user_may_edit_and_delete_only_self() {
        assert!(permits(Role::User, SELF, SELF, Action::UpdateProfile));
        assert!(permits(Role::User, SELF, SELF, Action::Delete));
        assert!(!permits(Role::User, SELF, OTHER, Action::UpdateProfile));
        assert!(!permits(Role::User, SELF, OTHER, Action::Delete));
    }

    #[test]
    fn user_may_never_change_roles() {
        assert!(!permits(Role::User, SELF, SELF, Action::UpdateRole));
        assert!(!permits(Role::User, SELF, OTHER, Action::UpdateRole));
    }
}
