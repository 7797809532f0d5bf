//! Route guards driven by the session's `authenticated` signal.

use tagdo_session::SessionSnapshot;

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where authenticated users are sent away from login-only pages.
pub const HOME_PATH: &str = "/";

/// A rule attached to a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only for logged-in users; everyone else goes to [`LOGIN_PATH`].
    Protected,
    /// Only for logged-out users (the login page); everyone else goes to
    /// [`HOME_PATH`].
    RedirectIfAuthenticated,
}

/// The outcome of evaluating a [`Guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the requested route.
    Allow,
    /// Replace the current location with `to`. `from` is the route the
    /// user asked for, so login can send them back afterwards.
    Redirect { to: String, from: Option<String> },
}

impl Guard {
    /// Decides what happens when `requested` is visited with `snapshot`.
    pub fn evaluate(self, snapshot: &SessionSnapshot, requested: &str) -> Navigation {
        match (self, snapshot.authenticated) {
            (Self::Protected, false) => Navigation::Redirect {
                to: LOGIN_PATH.to_owned(),
                from: Some(requested.to_owned()),
            },
            (Self::RedirectIfAuthenticated, true) => Navigation::Redirect {
                to: HOME_PATH.to_owned(),
                from: None,
            },
            _ => Navigation::Allow,
        }
    }
}
