use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::account::handlers as account;
use crate::auth;
use crate::gallery::handlers as gallery;
use crate::shared::AppState;

/// Builds the full application router. Public routes cover registration
/// and token issuance; everything else sits behind the JWT middleware.
/// Stored media is served read-only under `/media`.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/signup", post(account::signup))
        .route("/signin", post(account::signin))
        .route("/token/refresh", post(account::refresh_token))
        .route("/emailvalidator", post(account::email_validator))
        .route("/username-validator", post(account::username_validator));

    let protected = Router::new()
        .route("/sign_out", post(account::sign_out))
        .route(
            "/userprofile",
            get(account::get_profile)
                .put(account::update_profile)
                .patch(account::patch_profile),
        )
        .route(
            "/image-gallery",
            get(gallery::list_image_galleries).post(gallery::create_image_gallery),
        )
        .route(
            "/image-gallery/:id",
            get(gallery::get_image_gallery)
                .put(gallery::update_image_gallery)
                .delete(gallery::delete_image_gallery),
        )
        .route(
            "/video-gallery",
            get(gallery::list_video_galleries).post(gallery::create_video_gallery),
        )
        .route(
            "/video-gallery/:id",
            get(gallery::get_video_gallery)
                .put(gallery::update_video_gallery)
                .delete(gallery::delete_video_gallery),
        )
        .route("/images", get(gallery::list_images).post(gallery::upload_images))
        .route(
            "/images/:id",
            get(gallery::get_image).delete(gallery::delete_image),
        )
        .route("/videos", get(gallery::list_videos).post(gallery::upload_videos))
        .route(
            "/videos/:id",
            get(gallery::get_video).delete(gallery::delete_video),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ))
        // A batch can carry up to ten 10 MiB videos plus multipart
        // framing; per-file caps are enforced by the upload validation.
        .layer(DefaultBodyLimit::max(110 * 1024 * 1024));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/media", ServeDir::new(state.media_root.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
