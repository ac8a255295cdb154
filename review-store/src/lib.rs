//! Users, reviews and session tokens.

pub mod auth;
pub mod db;
pub mod errors;
mod schema;

pub use auth::{AuthConfig, Claims, JwtManager};
pub use db::{NewReview, REVIEW_LIST_LIMIT, Review, ReviewStore, STATUS_COMPLETED, User};
pub use errors::{StoreError, StoreResult};
