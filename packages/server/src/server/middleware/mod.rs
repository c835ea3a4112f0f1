// HTTP middleware
pub mod api_key_auth;
pub mod security_headers;

pub use api_key_auth::*;
pub use security_headers::*;
