use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use super::models::MediaKind;
use super::service::GalleryService;
use super::types::{GalleryCreateRequest, GalleryUpdateRequest};
use super::validation::{self, messages, UploadFile};
use crate::auth::types::CurrentUser;
use crate::shared::{AppError, AppState, Envelope};

fn gallery_service(state: &AppState) -> GalleryService {
    GalleryService::new(
        Arc::clone(&state.gallery_repository),
        Arc::clone(&state.media_repository),
        Arc::clone(&state.media_store),
    )
}

/// Pulls the gallery id text field and the file parts out of a multipart
/// upload. Field names are kind-specific (`image_gallery_id`/`image`,
/// `video_gallery_id`/`video`); unknown parts are ignored.
async fn read_upload(
    kind: MediaKind,
    mut multipart: Multipart,
) -> Result<(Option<String>, Vec<UploadFile>), AppError> {
    let id_field = validation::gallery_id_field(kind);
    let file_field = validation::field_name(kind);

    let mut gallery_id = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        if name == id_field {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            gallery_id = Some(value);
        } else if name == file_field {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            files.push(UploadFile {
                file_name,
                data: data.to_vec(),
            });
        }
    }

    Ok((gallery_id, files))
}

// Image gallery CRUD

/// GET /image-gallery (protected)
#[instrument(skip(state))]
pub async fn list_image_galleries(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let galleries = gallery_service(&state)
        .list_galleries(&user, MediaKind::Image)
        .await?;
    if galleries.is_empty() {
        return Ok(Json(json!({ "message": messages::NO_ALBUM })).into_response());
    }
    Ok(Json(galleries).into_response())
}

/// POST /image-gallery (protected)
#[instrument(skip(state, payload))]
pub async fn create_image_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<GalleryCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = gallery_service(&state)
        .create_gallery(&user, MediaKind::Image, &payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(messages::GALLERY_CREATED, summary)),
    ))
}

/// GET /image-gallery/:id (protected)
#[instrument(skip(state))]
pub async fn get_image_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(gallery_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let gallery = gallery_service(&state)
        .get_gallery(&user, MediaKind::Image, &gallery_id)
        .await?;
    Ok(Json(gallery))
}

/// PUT /image-gallery/:id (protected)
#[instrument(skip(state, payload))]
pub async fn update_image_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(gallery_id): Path<String>,
    Json(payload): Json<GalleryUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = gallery_service(&state)
        .rename_gallery(&user, MediaKind::Image, &gallery_id, &payload)
        .await?;
    Ok(Json(Envelope::new(messages::GALLERY_UPDATED, summary)))
}

/// DELETE /image-gallery/:id (protected)
#[instrument(skip(state))]
pub async fn delete_image_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(gallery_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    gallery_service(&state)
        .delete_gallery(&user, MediaKind::Image, &gallery_id)
        .await?;
    Ok(Json(Envelope::<()>::message_only(messages::GALLERY_DELETED)))
}

// Video gallery CRUD

/// GET /video-gallery (protected)
#[instrument(skip(state))]
pub async fn list_video_galleries(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let galleries = gallery_service(&state)
        .list_galleries(&user, MediaKind::Video)
        .await?;
    if galleries.is_empty() {
        return Ok(Json(json!({ "message": messages::NO_ALBUM })).into_response());
    }
    Ok(Json(galleries).into_response())
}

/// POST /video-gallery (protected)
#[instrument(skip(state, payload))]
pub async fn create_video_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<GalleryCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = gallery_service(&state)
        .create_gallery(&user, MediaKind::Video, &payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(messages::GALLERY_CREATED, summary)),
    ))
}

/// GET /video-gallery/:id (protected)
#[instrument(skip(state))]
pub async fn get_video_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(gallery_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let gallery = gallery_service(&state)
        .get_gallery(&user, MediaKind::Video, &gallery_id)
        .await?;
    Ok(Json(gallery))
}

/// PUT /video-gallery/:id (protected)
#[instrument(skip(state, payload))]
pub async fn update_video_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(gallery_id): Path<String>,
    Json(payload): Json<GalleryUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = gallery_service(&state)
        .rename_gallery(&user, MediaKind::Video, &gallery_id, &payload)
        .await?;
    Ok(Json(Envelope::new(messages::GALLERY_UPDATED, summary)))
}

/// DELETE /video-gallery/:id (protected)
#[instrument(skip(state))]
pub async fn delete_video_gallery(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(gallery_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    gallery_service(&state)
        .delete_gallery(&user, MediaKind::Video, &gallery_id)
        .await?;
    Ok(Json(Envelope::<()>::message_only(messages::GALLERY_DELETED)))
}

// Media items

/// GET /images (protected) - every image the caller owns
#[instrument(skip(state))]
pub async fn list_images(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let items = gallery_service(&state)
        .list_media(&user, MediaKind::Image)
        .await?;
    if items.is_empty() {
        return Ok(Json(json!({ "message": messages::NO_IMAGES })).into_response());
    }
    Ok(Json(items).into_response())
}

/// POST /images (protected, multipart)
#[instrument(skip(state, multipart))]
pub async fn upload_images(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (gallery_id, files) = read_upload(MediaKind::Image, multipart).await?;
    let items = gallery_service(&state)
        .upload_media(&user, MediaKind::Image, gallery_id.as_deref(), files)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(messages::IMAGE_CREATED, items)),
    ))
}

/// GET /images/:id (protected)
#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = gallery_service(&state)
        .get_media(&user, MediaKind::Image, &item_id)
        .await?;
    Ok(Json(item))
}

/// DELETE /images/:id (protected)
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    gallery_service(&state)
        .delete_media(&user, MediaKind::Image, &item_id)
        .await?;
    Ok(Json(Envelope::<()>::message_only(messages::IMAGE_DELETED)))
}

/// GET /videos (protected) - every video the caller owns
#[instrument(skip(state))]
pub async fn list_videos(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let items = gallery_service(&state)
        .list_media(&user, MediaKind::Video)
        .await?;
    Ok(Json(items))
}

/// POST /videos (protected, multipart)
#[instrument(skip(state, multipart))]
pub async fn upload_videos(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (gallery_id, files) = read_upload(MediaKind::Video, multipart).await?;
    let items = gallery_service(&state)
        .upload_media(&user, MediaKind::Video, gallery_id.as_deref(), files)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(messages::VIDEO_CREATED, items)),
    ))
}

/// GET /videos/:id (protected)
#[instrument(skip(state))]
pub async fn get_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = gallery_service(&state)
        .get_media(&user, MediaKind::Video, &item_id)
        .await?;
    Ok(Json(item))
}

/// DELETE /videos/:id (protected)
#[instrument(skip(state))]
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    gallery_service(&state)
        .delete_media(&user, MediaKind::Video, &item_id)
        .await?;
    Ok(Json(Envelope::<()>::message_only(messages::VIDEO_DELETED)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt; // for `oneshot`

    async fn send_json(
        router: &axum::Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Hand-built multipart body with one text field and one file field.
    fn multipart_body(
        boundary: &str,
        id_field: &str,
        gallery_id: &str,
        file_field: &str,
        file_name: &str,
        data: &[u8],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{id_field}\"\r\n\r\n{gallery_id}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{file_field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    async fn signed_in(router: &axum::Router) -> String {
        send_json(
            router,
            Method::POST,
            "/signup",
            None,
            serde_json::json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "username": "jane@doe1",
                "email": "jane@example.com",
                "contact": "9876543210",
                "password": "Sup3r@secret"
            }),
        )
        .await;
        let (_, tokens) = send_json(
            router,
            Method::POST,
            "/signin",
            None,
            serde_json::json!({ "username": "jane@doe1", "password": "Sup3r@secret" }),
        )
        .await;
        tokens["access"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_empty_listing_reports_no_album() {
        let router = create_router(AppStateBuilder::new().build());
        let access = signed_in(&router).await;

        let (status, body) = send_json(
            &router,
            Method::GET,
            "/image-gallery",
            Some(&access),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No album found");
    }

    #[tokio::test]
    async fn test_gallery_crud_round_trip() {
        let router = create_router(AppStateBuilder::new().build());
        let access = signed_in(&router).await;

        let (status, body) = send_json(
            &router,
            Method::POST,
            "/image-gallery",
            Some(&access),
            serde_json::json!({ "gallery_name": "holiday" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Gallery created successfully");
        let gallery_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send_json(
            &router,
            Method::PUT,
            &format!("/image-gallery/{}", gallery_id),
            Some(&access),
            serde_json::json!({ "gallery_name": "archive" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["gallery_name"], "archive");

        let (status, body) = send_json(
            &router,
            Method::GET,
            "/image-gallery",
            Some(&access),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["gallery_name"], "archive");

        let (status, body) = send_json(
            &router,
            Method::DELETE,
            &format!("/image-gallery/{}", gallery_id),
            Some(&access),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Gallery deleted successfully");
    }

    #[tokio::test]
    async fn test_short_gallery_name_rejected() {
        let router = create_router(AppStateBuilder::new().build());
        let access = signed_in(&router).await;

        let (status, body) = send_json(
            &router,
            Method::POST,
            "/video-gallery",
            Some(&access),
            serde_json::json!({ "gallery_name": "abc" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["gallery_name"][0]
            .as_str()
            .unwrap()
            .contains("between 5 and 20"));
    }

    #[tokio::test]
    async fn test_image_upload_and_delete() {
        let router = create_router(AppStateBuilder::new().build());
        let access = signed_in(&router).await;

        let (_, body) = send_json(
            &router,
            Method::POST,
            "/image-gallery",
            Some(&access),
            serde_json::json!({ "gallery_name": "holiday" }),
        )
        .await;
        let gallery_id = body["data"]["id"].as_str().unwrap().to_string();

        let boundary = "galleria-test-boundary";
        let body_bytes = multipart_body(
            boundary,
            "image_gallery_id",
            &gallery_id,
            "image",
            "pic.png",
            b"not-a-real-png",
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/images")
            .header(header::AUTHORIZATION, format!("Bearer {}", access))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body_bytes))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Image uploaded successfully");
        let item = &body["data"][0];
        let item_id = item["id"].as_str().unwrap();
        assert!(item["url"]
            .as_str()
            .unwrap()
            .starts_with("/media/jane@doe1/image/holiday/"));

        let (status, body) = send_json(
            &router,
            Method::DELETE,
            &format!("/images/{}", item_id),
            Some(&access),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Image deleted successfully");
    }

    #[tokio::test]
    async fn test_video_upload_rejects_non_mp4() {
        let router = create_router(AppStateBuilder::new().build());
        let access = signed_in(&router).await;

        let (_, body) = send_json(
            &router,
            Method::POST,
            "/video-gallery",
            Some(&access),
            serde_json::json!({ "gallery_name": "clips" }),
        )
        .await;
        let gallery_id = body["data"]["id"].as_str().unwrap().to_string();

        let boundary = "galleria-test-boundary";
        let body_bytes = multipart_body(
            boundary,
            "video_gallery_id",
            &gallery_id,
            "video",
            "clip.avi",
            b"riff",
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/videos")
            .header(header::AUTHORIZATION, format!("Bearer {}", access))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body_bytes))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["video"][0], "Only mp4 files are allowed.");
    }

    #[tokio::test]
    async fn test_gallery_routes_require_token() {
        let router = create_router(AppStateBuilder::new().build());
        let (status, _) = send_json(
            &router,
            Method::GET,
            "/image-gallery",
            None,
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
