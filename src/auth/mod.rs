//! Authentication module
//!
//! Supports: Bearer, API Key, Basic, Custom Headers
//!
//! Credentials are resolved when the manifest is compiled. Applying them to
//! a request is a pure header/query insertion with no I/O, so the request
//! builder stays side-effect free.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, Location};
