//! Session state for signed requests
//!
//! This module holds the cookie-derived credentials every request is signed
//! and sent with.
//!
//! # Components
//!
//! - `Session`: shared handle, refreshed atomically after an external login
//! - `SessionSnapshot`: an immutable view read by in-flight requests
//! - `Cookie`: a name/value pair as exported by the login browser

mod cookies;
mod state;

pub use cookies::{load_cookies, parse_cookie_header, Cookie};
pub(crate) use state::header_value;
pub use state::{default_headers, Session, SessionSnapshot, REQUIRED_COOKIE};
