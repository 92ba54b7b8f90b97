//! Server-only routes and middleware
//!
//! - `middleware` - cookie check in front of the app's private sections
//! - `callback` - the OAuth redirect target that trades a code for a session

pub mod callback;
pub mod middleware;

pub use callback::{callback_router, complete_oauth_sign_in};
pub use middleware::{PROTECTED_PREFIXES, is_protected, require_session_cookie};
