/**
 * Upload Route
 * Accepts one multipart file, stores it under the public upload directory,
 * and returns the relative URL later embedded in a post's image_url.
 */
use axum::{extract::{Multipart, State}, http::HeaderMap, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::ApiError;
use crate::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "mp4", "webm", "ogg"];

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub message: String,
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

/// POST /upload (auth required). The extension allow-list is checked before
/// any byte reaches disk and before the upload directory is created.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let mut found = None;
    loop {
        let next = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid multipart data: {e}")))?;
        let field = match next {
            Some(field) => field,
            None => break,
        };
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let ext = extension_of(&original_name);

        if !is_allowed_extension(&ext) {
            return Err(ApiError::validation(
                "File type not allowed. Images and videos (mp4, webm, ogg) only.",
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read file data: {e}")))?;

        found = Some((ext, bytes));
        break;
    }

    let (ext, bytes) = found.ok_or_else(|| ApiError::validation("No file uploaded"))?;

    if bytes.is_empty() {
        return Err(ApiError::validation("No file uploaded"));
    }

    tokio::fs::create_dir_all(&state.config.upload_dir).await?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let path = state.config.upload_dir.join(&filename);
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!("File uploaded: {} ({} bytes)", filename, bytes.len());

    Ok(Json(UploadResponse {
        success: true,
        url: format!("/uploads/{filename}"),
        message: "Upload complete".to_string(),
    }))
}
