/// Outcome of a route check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    Redirect(String),
}

/// Request interception rules for session-gated routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    /// Path prefixes that need a session.
    pub protected_prefixes: Vec<String>,
    /// Sign-in/sign-up pages a signed-in user is bounced away from.
    pub auth_pages: Vec<String>,
    pub sign_in_path: String,
    pub home_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            protected_prefixes: vec![
                "/dashboard".to_string(),
                "/tasks".to_string(),
                "/goals".to_string(),
                "/journal".to_string(),
                "/settings".to_string(),
            ],
            auth_pages: vec!["/sign-in".to_string(), "/sign-up".to_string()],
            sign_in_path: "/sign-in".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

impl RouteGuard {
    pub fn decide(&self, path: &str, has_session: bool) -> RouteDecision {
        let path = strip_query(path);
        if !has_session && self.protected_prefixes.iter().any(|prefix| matches_prefix(path, prefix)) {
            return RouteDecision::Redirect(self.sign_in_path.clone());
        }
        if has_session && self.auth_pages.iter().any(|page| matches_prefix(path, page)) {
            return RouteDecision::Redirect(self.home_path.clone());
        }
        RouteDecision::Continue
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// `/tasks` matches `/tasks` and `/tasks/42`, not `/tasksboard`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteDecision, RouteGuard};

    #[test]
    fn anonymous_user_is_sent_to_sign_in() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.decide("/tasks/42?view=board", false),
            RouteDecision::Redirect("/sign-in".to_string())
        );
        assert_eq!(guard.decide("/tasksboard", false), RouteDecision::Continue);
        assert_eq!(guard.decide("/", false), RouteDecision::Continue);
    }

    #[test]
    fn signed_in_user_skips_auth_pages() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.decide("/sign-in", true),
            RouteDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(guard.decide("/dashboard", true), RouteDecision::Continue);
        assert_eq!(guard.decide("/sign-up", false), RouteDecision::Continue);
    }
}
