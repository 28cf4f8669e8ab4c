pub mod middleware;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;

pub use middleware::jwt_auth;
pub use service::AuthService;
pub use token::TokenConfig;
pub use types::{CurrentUser, TokenClaims, TokenPair};
