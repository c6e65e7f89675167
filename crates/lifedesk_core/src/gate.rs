//! Authentication gate: maps a navigation path to a route decision.
//!
//! Pure function of session state; no I/O and no side effects.

use crate::model::EntityId;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Expenses,
    Groups,
    GroupDetail(EntityId),
    Notes,
    Todos,
    CompletedTodos,
    Problems,
}

impl Route {
    /// Parses a path, ignoring query, fragment and trailing slashes.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();
        match segments.as_slice() {
            [] => Some(Self::Landing),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["dashboard"] => Some(Self::Dashboard),
            ["expenses"] => Some(Self::Expenses),
            ["groups"] => Some(Self::Groups),
            ["groups", id] => id.parse().ok().map(Self::GroupDetail),
            ["notes"] => Some(Self::Notes),
            ["todos"] => Some(Self::Todos),
            ["todos", "completed"] => Some(Self::CompletedTodos),
            ["problems"] => Some(Self::Problems),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Expenses => "/expenses".to_string(),
            Self::Groups => "/groups".to_string(),
            Self::GroupDetail(id) => format!("/groups/{id}"),
            Self::Notes => "/notes".to_string(),
            Self::Todos => "/todos".to_string(),
            Self::CompletedTodos => "/todos/completed".to_string(),
            Self::Problems => "/problems".to_string(),
        }
    }

    /// Reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Landing | Self::Login | Self::Register)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
    NotFound,
}

/// Decides what to show for `path` under `state`.
///
/// Authenticated users may still open login and register.
pub fn resolve(state: &SessionState, path: &str) -> RouteDecision {
    let route = Route::parse(path);
    if !state.is_authenticated() {
        return match route {
            Some(route) if route.is_public() => RouteDecision::Render(route),
            _ => RouteDecision::Redirect(Route::Landing),
        };
    }

    match route {
        Some(Route::Landing) => RouteDecision::Redirect(Route::Dashboard),
        Some(route) => RouteDecision::Render(route),
        None => RouteDecision::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, Route, RouteDecision};
    use crate::session::SessionState;

    fn signed_in() -> SessionState {
        SessionState::Authenticated {
            token: "tok".to_string(),
            profile: None,
        }
    }

    #[test]
    fn anonymous_users_are_sent_to_landing() {
        let state = SessionState::Anonymous;
        assert_eq!(resolve(&state, "/expenses"), RouteDecision::Redirect(Route::Landing));
        assert_eq!(resolve(&state, "/nowhere"), RouteDecision::Redirect(Route::Landing));
        assert_eq!(resolve(&state, "/login"), RouteDecision::Render(Route::Login));
        assert_eq!(resolve(&state, "/"), RouteDecision::Render(Route::Landing));
    }

    #[test]
    fn authenticated_users_land_on_dashboard() {
        let state = signed_in();
        assert_eq!(resolve(&state, "/"), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(
            resolve(&state, "/groups/12/"),
            RouteDecision::Render(Route::GroupDetail(12))
        );
        assert_eq!(resolve(&state, "/register"), RouteDecision::Render(Route::Register));
        assert_eq!(resolve(&state, "/groups/abc"), RouteDecision::NotFound);
        assert_eq!(resolve(&state, "/problems"), RouteDecision::Render(Route::Problems));
        assert_eq!(resolve(&state, "/dsa"), RouteDecision::NotFound);
    }

    #[test]
    fn paths_round_trip_through_parse() {
        for route in [Route::CompletedTodos, Route::GroupDetail(3), Route::Landing] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/todos?tab=1"), Some(Route::Todos));
    }
}
