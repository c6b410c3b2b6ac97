/// Per-route required-permission policies
///
/// Each protected route declares which permissions a caller must hold,
/// either as a static list (all required) or as a function of the inbound
/// request (dynamic, e.g. exempting callers acting on their own resource).
/// The permission gate evaluates both shapes uniformly.

use axum::extract::Request;
use uuid::Uuid;

use super::middleware::AuthContext;

/// A route's required-permission declaration.
///
/// `Static` lists permissions that are all required. `Dynamic` computes the
/// required list from the request and the authenticated caller; returning an
/// empty list authorizes unconditionally.
#[derive(Clone)]
pub enum RequiredPermissions {
    /// Fixed list; every named permission is required
    Static(Vec<String>),

    /// Computed per request; evaluated by the gate on every call
    Dynamic(fn(&Request, &AuthContext) -> Vec<String>),
}

impl RequiredPermissions {
    /// Convenience constructor for a static policy.
    pub fn of(names: &[&str]) -> Self {
        Self::Static(names.iter().map(|n| n.to_string()).collect())
    }

    /// No permission required (authenticated access only).
    pub fn none() -> Self {
        Self::Static(Vec::new())
    }

    /// Evaluates the policy to the concrete required list for this request.
    pub fn evaluate(&self, req: &Request, ctx: &AuthContext) -> Vec<String> {
        match self {
            RequiredPermissions::Static(names) => names.clone(),
            RequiredPermissions::Dynamic(f) => f(req, ctx),
        }
    }
}

impl std::fmt::Debug for RequiredPermissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredPermissions::Static(names) => f.debug_tuple("Static").field(names).finish(),
            RequiredPermissions::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<fn>").finish(),
        }
    }
}

/// Dynamic policy for user-scoped routes: no permission needed when the
/// caller acts on their own user id (last path segment), otherwise
/// `ViewUsers` is required.
pub fn self_service_or_view_users(req: &Request, ctx: &AuthContext) -> Vec<String> {
    match trailing_uuid(req.uri().path()) {
        Some(id) if id == ctx.user_id => Vec::new(),
        _ => vec![super::permissions::names::VIEW_USERS.to_string()],
    }
}

/// Parses the last path segment as a UUID, if there is one.
fn trailing_uuid(path: &str) -> Option<Uuid> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| Uuid::parse_str(segment).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    fn ctx(user_id: Uuid) -> AuthContext {
        AuthContext {
            user_id,
            permissions: Vec::new(),
        }
    }

    #[test]
    fn test_static_policy_evaluates_to_its_list() {
        let policy = RequiredPermissions::of(&["ViewUsers", "ViewRoles"]);
        let required = policy.evaluate(&request("/v1/users"), &ctx(Uuid::new_v4()));
        assert_eq!(required, vec!["ViewUsers".to_string(), "ViewRoles".to_string()]);
    }

    #[test]
    fn test_none_policy_is_empty() {
        let policy = RequiredPermissions::none();
        assert!(policy
            .evaluate(&request("/v1/anything"), &ctx(Uuid::new_v4()))
            .is_empty());
    }

    #[test]
    fn test_self_service_exempts_own_resource() {
        let user_id = Uuid::new_v4();
        let policy = RequiredPermissions::Dynamic(self_service_or_view_users);

        let own = request(&format!("/v1/users/{}", user_id));
        assert!(policy.evaluate(&own, &ctx(user_id)).is_empty());

        let other = request(&format!("/v1/users/{}", Uuid::new_v4()));
        assert_eq!(
            policy.evaluate(&other, &ctx(user_id)),
            vec!["ViewUsers".to_string()]
        );
    }

    #[test]
    fn test_self_service_requires_permission_without_uuid() {
        let policy = RequiredPermissions::Dynamic(self_service_or_view_users);
        let required = policy.evaluate(&request("/v1/users"), &ctx(Uuid::new_v4()));
        assert_eq!(required, vec!["ViewUsers".to_string()]);
    }

    #[test]
    fn test_trailing_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(trailing_uuid(&format!("/v1/users/{}", id)), Some(id));
        assert_eq!(trailing_uuid(&format!("/v1/users/{}/", id)), Some(id));
        assert_eq!(trailing_uuid("/v1/users"), None);
    }
}
