//! Authentication
//!
//! Resolves the identity and credential attached to management API requests.

mod provider;

pub use provider::{AuthProvider, LoggedInUser, StaticAuthProvider};
