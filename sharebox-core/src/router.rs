//! Route table, navigation history and the route guard
//!
//! Routes mirror the service's web paths so links and logs read the same
//! everywhere. The File Share screen has no path of its own: it is only
//! reachable from the dashboard, carrying the file it shares.

use crate::models::FileRecord;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`, the entry screen
    Login,
    /// `/register`
    Register,
    /// `/dashboard` (protected)
    Dashboard,
    /// `/share` (protected)
    Share,
    /// `/view/:id` (public)
    View { id: String },
    /// Share-link generation for one file (protected)
    FileShare(FileRecord),
}

impl Route {
    /// Parse a path. Unknown paths resolve to the entry screen.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/share" => Route::Share,
            _ => match trimmed.strip_prefix("/view/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::View { id: id.to_string() },
                _ => Route::Login,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Share => "/share".to_string(),
            Route::View { id } => format!("/view/{}", id),
            Route::FileShare(file) => format!("/dashboard#share-{}", file.id),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Share | Route::FileShare(_))
    }
}

/// A navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

impl Navigation {
    pub fn push(route: Route) -> Self {
        Self { route, replace: false }
    }

    pub fn replace(route: Route) -> Self {
        Self { route, replace: true }
    }
}

/// Outcome of guarding a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Render,
    Redirect(Navigation),
}

/// Gate protected routes on the presence of a session token
pub fn guard(route: &Route, session: &Session) -> Guard {
    if route.is_protected() && session.token().is_none() {
        Guard::Redirect(Navigation::replace(Route::Login))
    } else {
        Guard::Render
    }
}

/// Navigation history; never empty
#[derive(Debug, Clone)]
pub struct Router {
    history: Vec<Route>,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            history: vec![initial],
        }
    }

    pub fn current(&self) -> &Route {
        // history always holds at least the initial route
        &self.history[self.history.len() - 1]
    }

    pub fn navigate(&mut self, nav: Navigation) {
        tracing::debug!("navigate {} (replace: {})", nav.route.path(), nav.replace);
        if nav.replace {
            let last = self.history.len() - 1;
            self.history[last] = nav.route;
        } else {
            self.history.push(nav.route);
        }
    }

    /// Go back one entry. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Apply pending session redirects and the route guard, returning the
    /// route that should be rendered.
    pub fn resolve(&mut self, session: &Session) -> &Route {
        while let Some(nav) = session.take_redirect() {
            self.navigate(nav);
        }

        if let Guard::Redirect(nav) = guard(self.current(), session) {
            self.navigate(nav);
        }

        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse(""), Route::Login);
        assert_eq!(Route::parse("/register"), Route::Register);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/share"), Route::Share);
        assert_eq!(
            Route::parse("/view/abc-123?x=1"),
            Route::View { id: "abc-123".to_string() }
        );
        assert_eq!(Route::parse("/view/"), Route::Login);
        assert_eq!(Route::parse("/view/a/b"), Route::Login);
        assert_eq!(Route::parse("/nowhere"), Route::Login);
    }

    #[test]
    fn test_path_roundtrip() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::Share,
            Route::View { id: "f1".to_string() },
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_guard_without_session() {
        let session = Session::init(Arc::new(MemoryTokenStore::new()));

        assert_eq!(
            guard(&Route::Dashboard, &session),
            Guard::Redirect(Navigation::replace(Route::Login))
        );
        assert_eq!(guard(&Route::Share, &session), Guard::Redirect(Navigation::replace(Route::Login)));
        assert_eq!(guard(&Route::Login, &session), Guard::Render);
        assert_eq!(guard(&Route::View { id: "x".to_string() }, &session), Guard::Render);
    }

    #[test]
    fn test_resolve_replaces_protected_entry() {
        let session = Session::init(Arc::new(MemoryTokenStore::new()));
        let mut router = Router::new(Route::Register);
        router.navigate(Navigation::push(Route::Dashboard));
        assert_eq!(router.depth(), 2);

        assert_eq!(router.resolve(&session), &Route::Login);
        // Replaced, not pushed
        assert_eq!(router.depth(), 2);
        assert!(router.back());
        assert_eq!(router.current(), &Route::Register);
        assert!(!router.back());
    }
}
