//! Route admission policy — pure decisions over the current session.
//!
//! Re-evaluated on every navigation attempt. The one hard rule: while the
//! initial verification is still in flight, every route is admitted, so a
//! cold start never flickers through a sign-in redirect.

use crate::session::Session;

/// Canonical home route; the empty/root path always redirects here.
pub const HOME_ROUTE: &str = "/home";

/// Sign-in page; target of redirects for unauthenticated access.
pub const SIGN_IN_ROUTE: &str = "/signin";

/// Capability a route demands of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteGuard {
    /// Open to everyone.
    #[default]
    Public,
    /// Requires a signed-in user.
    RequiresAuth,
    /// Requires an admin-capable role.
    RequiresAdmin,
    /// Sign-in/sign-up pages; signed-in users are bounced home.
    GuestOnly,
}

/// Outcome of an admission check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Render the target route.
    Admit,
    /// Navigate to this path instead.
    RedirectTo(String),
}

/// Decide whether navigation to `path` is permitted.
///
/// Rules in priority order: root-path canonicalization, then admit-all
/// while auth is still being checked, then the auth/admin/guest guards.
#[must_use]
pub fn admit(path: &str, guard: RouteGuard, session: &Session) -> RouteAccess {
    if path.is_empty() || path == "/" {
        return RouteAccess::RedirectTo(HOME_ROUTE.to_owned());
    }

    if session.checking_auth {
        return RouteAccess::Admit;
    }

    match guard {
        RouteGuard::RequiresAuth | RouteGuard::RequiresAdmin if !session.is_authenticated() => {
            RouteAccess::RedirectTo(SIGN_IN_ROUTE.to_owned())
        }
        RouteGuard::RequiresAdmin if !session.is_admin() => {
            RouteAccess::RedirectTo(HOME_ROUTE.to_owned())
        }
        RouteGuard::GuestOnly if session.is_authenticated() => {
            RouteAccess::RedirectTo(HOME_ROUTE.to_owned())
        }
        _ => RouteAccess::Admit,
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
