/**
 * Client SDK
 * Typed wrappers over the HTTP surface, mirroring what the admin dashboard
 * and public pages consume. Any `success:false` or non-2xx response is
 * surfaced as an error carrying the server's message string.
 */
use reqwest::{header::AUTHORIZATION, multipart, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::db::models::{BlogPost, Lead};
use crate::routes::upload::UploadResponse;
use crate::routes::{ApiResponse, Pagination};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with `success:false`; carries its message.
    #[error("{0}")]
    Api(String),
}

/// Contact-form payload for lead creation.
#[derive(Debug, Clone, Serialize)]
pub struct LeadPayload {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Partial blog-post payload for create and update. Absent fields are left
/// untouched by an update; `image_url`/`video_url` set to `Some(None)`
/// serialize as explicit nulls, which clear the stored value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlogPostPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_vertical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SiteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach the admin credential sent in the Authorization header.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    async fn handle<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>, ClientError> {
        let status = response.status();
        let body: ApiResponse<T> = response.json().await?;
        if !status.is_success() || !body.success {
            return Err(ClientError::Api(
                body.message
                    .unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        Ok(body)
    }

    // === Leads ===

    pub async fn create_lead(&self, payload: &LeadPayload) -> Result<Lead, ClientError> {
        if payload.name.trim().is_empty()
            || payload.email.trim().is_empty()
            || payload.whatsapp.trim().is_empty()
            || payload.service.trim().is_empty()
        {
            return Err(ClientError::Api(
                "All required fields must be filled".to_string(),
            ));
        }
        if !payload.email.contains('@') {
            return Err(ClientError::Api("Invalid email".to_string()));
        }

        let response = self
            .http
            .post(self.url("/leads"))
            .json(payload)
            .send()
            .await?;
        Self::handle::<Lead>(response)
            .await?
            .data
            .ok_or_else(|| ClientError::Api("Response carried no lead".to_string()))
    }

    pub async fn fetch_leads(
        &self,
        search: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Lead>, Option<Pagination>), ClientError> {
        let mut request = self
            .http
            .get(self.url("/leads"))
            .query(&[("page", page.to_string()), ("limit", limit.to_string())]);
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }

        let response = self.authorize(request).send().await?;
        let body = Self::handle::<Vec<Lead>>(response).await?;
        Ok((body.data.unwrap_or_default(), body.pagination))
    }

    pub async fn delete_lead(&self, id: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.url("/leads"))
            .query(&[("id", id)]);
        let response = self.authorize(request).send().await?;
        Self::handle::<()>(response).await?;
        Ok(())
    }

    // === Blog ===

    pub async fn fetch_blog_posts(
        &self,
        page: i64,
        limit: i64,
        published_only: bool,
    ) -> Result<Vec<BlogPost>, ClientError> {
        let request = self.http.get(self.url("/blog")).query(&[
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("published", published_only.to_string()),
        ]);
        let response = request.send().await?;
        let body = Self::handle::<Vec<BlogPost>>(response).await?;
        Ok(body.data.unwrap_or_default())
    }

    pub async fn fetch_blog_post(&self, id: &str) -> Result<BlogPost, ClientError> {
        let response = self
            .http
            .get(self.url("/blog"))
            .query(&[("id", id)])
            .send()
            .await?;
        Self::handle::<BlogPost>(response)
            .await?
            .data
            .ok_or_else(|| ClientError::Api("Response carried no post".to_string()))
    }

    pub async fn create_blog_post(
        &self,
        payload: &BlogPostPayload,
    ) -> Result<BlogPost, ClientError> {
        let request = self.http.post(self.url("/blog")).json(payload);
        let response = self.authorize(request).send().await?;
        Self::handle::<BlogPost>(response)
            .await?
            .data
            .ok_or_else(|| ClientError::Api("Response carried no post".to_string()))
    }

    /// Sends `{ id, ...payload }`, matching how the editor submits updates.
    pub async fn update_blog_post(
        &self,
        id: &str,
        payload: &BlogPostPayload,
    ) -> Result<(), ClientError> {
        let mut body = serde_json::to_value(payload)
            .map_err(|e| ClientError::Api(e.to_string()))?;
        body.as_object_mut()
            .expect("payload serializes to an object")
            .insert("id".to_string(), serde_json::Value::String(id.to_string()));

        let request = self.http.put(self.url("/blog")).json(&body);
        let response = self.authorize(request).send().await?;
        Self::handle::<()>(response).await?;
        Ok(())
    }

    pub async fn delete_blog_post(&self, id: &str) -> Result<(), ClientError> {
        let request = self.http.delete(self.url("/blog")).query(&[("id", id)]);
        let response = self.authorize(request).send().await?;
        Self::handle::<()>(response).await?;
        Ok(())
    }

    // === Upload ===

    /// Uploads one file and returns the public URL to embed as `image_url`.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, ClientError> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let request = self.http.post(self.url("/upload")).multipart(form);
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: ApiResponse<()> = response.json().await?;
            return Err(ClientError::Api(
                body.message.unwrap_or_else(|| "Upload failed".to_string()),
            ));
        }

        let body: UploadResponse = response.json().await?;
        Ok(body.url)
    }
}
