pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
pub mod validation;

pub use models::{GalleryModel, MediaItemModel, MediaKind};
pub use service::GalleryService;
