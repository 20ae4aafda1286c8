pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, CurrentUser};
pub use cors::create_cors;
