//! Session authentication for the catalog API.
//!
//! Dual-token system: access tokens (24 hours) authorize requests,
//! refresh tokens (7 days) mint a new pair. Both travel in HttpOnly
//! cookies. [`require_auth`] gates protected routes and attaches a
//! [`RequestIdentity`]; handlers check roles with [`Auth`].

mod cookie;
mod errors;
mod extractors;
mod identity;
mod middleware;
mod session;
mod state;
mod types;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_cookie, cleared_cookies, get_cookie,
    get_token_cookie, pair_cookies, token_cookie,
};
pub use errors::AuthError;
pub use extractors::{AdminOnly, AnyRole, Auth, RoleConstraint, UserOnly, require_role};
pub use identity::{IdentityError, IdentityProvider, LoginRequest};
pub use middleware::require_auth;
pub use session::{SessionManager, SessionPolicy};
pub use state::AuthState;
pub use types::RequestIdentity;
