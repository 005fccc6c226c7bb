//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Surrogate keys are stored as integers but travel as JSON strings on the
/// wire. Deserialization accepts both forms.
pub mod id_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrInt {
            String(String),
            Int(i64),
        }

        match StringOrInt::deserialize(deserializer)? {
            StringOrInt::String(s) => s.parse().map_err(de::Error::custom),
            StringOrInt::Int(i) => Ok(i),
        }
    }
}

/// Contact-form submission
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lead {
    #[serde(with = "id_string")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub service: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Blog article
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(with = "id_string")]
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub video_vertical: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
