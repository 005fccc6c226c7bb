/**
 * Blog Routes
 * CRUD API endpoints for blog posts
 */
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer};

use crate::auth::require_admin;
use crate::db::models::BlogPost;
use crate::error::ApiError;
use crate::routes::ApiResponse;
use crate::AppState;

const POST_COLUMNS: &str =
    "id, title, content, image_url, video_url, video_vertical, published, created_at, updated_at";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for GET /blog (read-one when `id` is present, list
/// otherwise)
#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub id: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub offset: Option<i64>,
    pub published: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Request body for POST /blog (create)
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub video_vertical: Option<bool>,
    pub published: Option<bool>,
}

/// Request body for PUT /blog (partial update). For `image_url`/`video_url`
/// a present-but-null (or empty) value clears the column, while an absent
/// field leaves it untouched, so those two are doubly optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlogRequest {
    pub id: Option<serde_json::Value>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub video_url: Option<Option<String>>,
    pub video_vertical: Option<bool>,
    pub published: Option<bool>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Query parameters carrying the target id for PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// `published=true` selects published rows; any other present value selects
/// unpublished ones. Absent means no filter.
fn parse_published(raw: Option<&str>) -> Option<bool> {
    raw.map(|v| v == "true")
}

fn resolve_offset(page: i64, limit: i64, explicit: Option<i64>) -> i64 {
    explicit.unwrap_or((page - 1) * limit).max(0)
}

/// Empty and null URL values both clear the column.
fn cleared_or_set(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /blog - Read one post (`?id=`) or list posts with pagination
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<Response, ApiError> {
    let pool = state.pool()?;

    if let Some(id) = query.id.as_deref() {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id::text = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        return Ok(Json(ApiResponse::data(post)).into_response());
    }

    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let offset = resolve_offset(page, limit, query.offset);

    let posts: Vec<BlogPost> = if let Some(published) = parse_published(query.published.as_deref())
    {
        sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts \
             WHERE published = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(published)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    };

    Ok(Json(ApiResponse::data(posts)).into_response())
}

/// POST /blog - Create new blog post (auth required)
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let payload: CreateBlogRequest = crate::routes::parse_json(&body)?;
    let pool = state.pool()?;

    let title = payload.title.map(|t| t.trim().to_string());
    let image_url = cleared_or_set(payload.image_url);
    let video_url = cleared_or_set(payload.video_url);

    let post = sqlx::query_as::<_, BlogPost>(&format!(
        "INSERT INTO blog_posts (title, content, image_url, video_url, video_vertical, published) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(&title)
    .bind(&payload.content)
    .bind(&image_url)
    .bind(&video_url)
    .bind(payload.video_vertical.unwrap_or(false))
    .bind(payload.published.unwrap_or(true))
    .fetch_one(pool)
    .await?;

    tracing::info!("Blog post created: id={}", post.id);

    Ok(Json(ApiResponse::created(post, "Post created")))
}

/// PUT /blog - Partial update (auth required); id from the query string or
/// the body. Only fields present in the payload are written.
pub async fn update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let payload: UpdateBlogRequest = crate::routes::parse_json(&body)?;

    let id = query
        .id
        .filter(|v| !v.is_empty())
        .or_else(|| match &payload.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ApiError::validation("Missing id parameter"))?;

    let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE blog_posts SET ");
    let mut any_field = false;
    {
        let mut fields = builder.separated(", ");
        if let Some(title) = payload.title {
            fields.push("title = ");
            fields.push_bind_unseparated(title.trim().to_string());
            any_field = true;
        }
        if let Some(content) = payload.content {
            fields.push("content = ");
            fields.push_bind_unseparated(content);
            any_field = true;
        }
        if let Some(image_url) = payload.image_url {
            fields.push("image_url = ");
            fields.push_bind_unseparated(cleared_or_set(image_url));
            any_field = true;
        }
        if let Some(video_url) = payload.video_url {
            fields.push("video_url = ");
            fields.push_bind_unseparated(cleared_or_set(video_url));
            any_field = true;
        }
        if let Some(video_vertical) = payload.video_vertical {
            fields.push("video_vertical = ");
            fields.push_bind_unseparated(video_vertical);
            any_field = true;
        }
        if let Some(published) = payload.published {
            fields.push("published = ");
            fields.push_bind_unseparated(published);
            any_field = true;
        }
    }

    if !any_field {
        return Ok(Json(ApiResponse::<()>::message("Nothing to update")));
    }

    let pool = state.pool()?;

    builder.push(" WHERE id::text = ");
    builder.push_bind(&id);
    builder.build().execute(pool).await?;

    tracing::info!("Blog post updated: id={}", id);

    Ok(Json(ApiResponse::<()>::message("Post updated")))
}

/// DELETE /blog?id= - Delete blog post (auth required). Deleting an id that
/// does not exist still reports success; the affected-row count is not
/// checked.
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let id = query
        .id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("Missing id parameter"))?;

    let pool = state.pool()?;

    sqlx::query("DELETE FROM blog_posts WHERE id::text = $1")
        .bind(&id)
        .execute(pool)
        .await?;

    tracing::info!("Blog post deleted: id={}", id);

    Ok(Json(ApiResponse::<()>::message("Post deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use crate::routes::testing::{test_state, TEST_SECRET};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = create_app(test_state());
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn put_json(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::put(uri).header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_create_without_token_is_unauthorized() {
        let req = Request::post("/blog")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title":"x"}"#))
            .unwrap();
        let (status, json) = send(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_create_with_token_reaches_the_store() {
        // No pool in the test state: a 503 (not 401/400) proves the gate and
        // body validation both passed before the data layer was consulted.
        let req = Request::post("/blog")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {TEST_SECRET}"))
            .body(Body::from(r#"{"title":"x","published":false}"#))
            .unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_create_with_malformed_body_is_a_validation_error() {
        let req = Request::post("/blog")
            .header("content-type", "application/json")
            .header("authorization", TEST_SECRET)
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], serde_json::json!("Invalid request body"));
    }

    #[tokio::test]
    async fn test_update_without_id_is_a_validation_error() {
        let (status, json) = send(put_json("/blog", r#"{"title":"x"}"#, Some(TEST_SECRET))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], serde_json::json!("Missing id parameter"));
    }

    #[tokio::test]
    async fn test_update_with_no_recognized_fields_is_a_noop() {
        let (status, json) = send(put_json("/blog?id=5", "{}", Some(TEST_SECRET))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["message"], serde_json::json!("Nothing to update"));
    }

    #[tokio::test]
    async fn test_update_accepts_id_from_the_body() {
        let (status, json) = send(put_json("/blog", r#"{"id":"5"}"#, Some(TEST_SECRET))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], serde_json::json!("Nothing to update"));
    }

    #[tokio::test]
    async fn test_update_without_token_is_unauthorized() {
        let (status, _) = send(put_json("/blog?id=5", "{}", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_without_id_is_a_validation_error() {
        let req = Request::delete("/blog")
            .header("authorization", TEST_SECRET)
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], serde_json::json!("Missing id parameter"));
    }

    #[tokio::test]
    async fn test_delete_without_token_is_unauthorized() {
        let req = Request::delete("/blog?id=1").body(Body::empty()).unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405_with_envelope() {
        let req = Request::patch("/blog")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["success"], serde_json::json!(false));
    }

    #[test]
    fn test_update_body_distinguishes_absent_null_and_empty() {
        let absent: UpdateBlogRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.image_url, None);

        let null: UpdateBlogRequest = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        assert_eq!(null.image_url, Some(None));

        let empty: UpdateBlogRequest = serde_json::from_str(r#"{"image_url":""}"#).unwrap();
        assert_eq!(empty.image_url, Some(Some(String::new())));

        let set: UpdateBlogRequest = serde_json::from_str(r#"{"image_url":"/x.png"}"#).unwrap();
        assert_eq!(set.image_url, Some(Some("/x.png".to_string())));
    }

    #[test]
    fn test_cleared_or_set_clears_null_and_empty() {
        assert_eq!(cleared_or_set(None), None);
        assert_eq!(cleared_or_set(Some("".to_string())), None);
        assert_eq!(cleared_or_set(Some("  ".to_string())), None);
        assert_eq!(
            cleared_or_set(Some(" /img.png ".to_string())),
            Some("/img.png".to_string())
        );
    }

    #[test]
    fn test_parse_published_treats_only_true_as_true() {
        assert_eq!(parse_published(None), None);
        assert_eq!(parse_published(Some("true")), Some(true));
        assert_eq!(parse_published(Some("false")), Some(false));
        assert_eq!(parse_published(Some("1")), Some(false));
    }

    #[test]
    fn test_offset_override_wins_over_page_arithmetic() {
        assert_eq!(resolve_offset(3, 10, None), 20);
        assert_eq!(resolve_offset(3, 10, Some(7)), 7);
        assert_eq!(resolve_offset(1, 10, None), 0);
        assert_eq!(resolve_offset(1, 10, Some(-5)), 0);
    }
}
