// Library crate for the media gallery backend
// This file exposes the public API for integration tests

pub mod account;
pub mod auth;
pub mod gallery;
pub mod routes;
pub mod shared;
pub mod storage;

// Re-export commonly used types for easier access in tests
pub use account::{AccountService, UserModel, UserProfile};
pub use auth::{AuthService, CurrentUser, TokenConfig, TokenPair};
pub use gallery::{GalleryService, MediaKind};
pub use routes::create_router;
pub use shared::{AppError, AppState};
pub use storage::{LocalMediaStore, MediaStore, StorageError};
