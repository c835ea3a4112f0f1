// HTTP server: API router, middleware and the local vendor stub
pub mod app;
pub mod middleware;
pub mod routes;
pub mod stub;

pub use app::{build_app, ApiKeys, AppState};
pub use stub::stub_router;
