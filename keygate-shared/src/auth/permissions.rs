/// Permission resolution and the authorize check
///
/// Both functions here are pure: no I/O, no hidden state. The roles
/// repository fetches a user's roles with their granted permission names
/// (`LoadedRole`); `resolve` folds them into a flat, de-duplicated set; and
/// `authorize` implements the allow-list check the gate enforces.

use std::collections::BTreeSet;

use crate::models::role::LoadedRole;

/// Permission names granted and checked by this service itself.
///
/// Applications register additional names meaningful within their own scope;
/// these are only the ones the core grants or gates on.
pub mod names {
    pub const UPDATE_ORGANIZATION: &str = "UpdateOrganization";
    pub const VIEW_ORGANIZATIONS: &str = "ViewOrganizations";
    pub const VIEW_USERS: &str = "ViewUsers";
    pub const UPDATE_USERS: &str = "UpdateUsers";
    pub const VIEW_ROLES: &str = "ViewRoles";
    pub const UPDATE_ROLES: &str = "UpdateRoles";
    pub const MANAGE_APPLICATIONS: &str = "ManageApplications";
}

/// Derives the caller's effective permission set from their role memberships.
///
/// The result is the union of permission names across all non-deleted roles,
/// de-duplicated and order-independent (a `BTreeSet` keeps it canonical). A
/// user with no roles resolves to the empty set; that is not an error.
pub fn resolve(roles: &[LoadedRole]) -> BTreeSet<String> {
    roles
        .iter()
        .filter(|r| !r.deleted)
        .flat_map(|r| r.permission_names.iter().cloned())
        .collect()
}

/// Allow-list check: true iff every required permission is granted.
///
/// AND semantics only; there is no any-of mode. An empty requirement always
/// authorizes (the route opted out of the check).
pub fn authorize<G, R>(granted: &[G], required: &[R]) -> bool
where
    G: AsRef<str>,
    R: AsRef<str>,
{
    required
        .iter()
        .all(|req| granted.iter().any(|g| g.as_ref() == req.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn loaded(deleted: bool, perms: &[&str]) -> LoadedRole {
        LoadedRole {
            role_id: Uuid::new_v4(),
            deleted,
            permission_names: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_unions_and_dedups() {
        let roles = vec![
            loaded(false, &["ViewUsers", "ViewRoles"]),
            loaded(false, &["ViewRoles", "UpdateRoles"]),
        ];

        let resolved = resolve(&roles);
        let expected: Vec<&str> = vec!["UpdateRoles", "ViewRoles", "ViewUsers"];
        assert_eq!(resolved.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_resolve_is_order_independent() {
        let a = loaded(false, &["A", "B"]);
        let b = loaded(false, &["B", "C"]);

        let forward = resolve(&[a.clone(), b.clone()]);
        let backward = resolve(&[b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_resolve_skips_deleted_roles() {
        let roles = vec![
            loaded(false, &["ViewUsers"]),
            loaded(true, &["UpdateRoles"]),
        ];

        let resolved = resolve(&roles);
        assert!(resolved.contains("ViewUsers"));
        assert!(!resolved.contains("UpdateRoles"));
    }

    #[test]
    fn test_resolve_no_roles_is_empty_set() {
        assert!(resolve(&[]).is_empty());
    }

    #[test]
    fn test_authorize_requires_subset() {
        let granted = vec!["ViewUsers".to_string(), "ViewRoles".to_string()];

        assert!(authorize(&granted, &["ViewUsers"]));
        assert!(authorize(&granted, &["ViewUsers", "ViewRoles"]));
        assert!(!authorize(&granted, &["ViewUsers", "UpdateRoles"]));
        assert!(!authorize(&granted, &["UpdateRoles"]));
    }

    #[test]
    fn test_authorize_empty_requirement_always_passes() {
        let granted = vec!["ViewUsers".to_string()];
        let none: Vec<String> = vec![];

        assert!(authorize(&granted, &none));
        assert!(authorize::<String, String>(&[], &[]));
    }

    #[test]
    fn test_authorize_empty_grant_fails_any_requirement() {
        let granted: Vec<String> = vec![];
        assert!(!authorize(&granted, &["ViewUsers"]));
    }
}
