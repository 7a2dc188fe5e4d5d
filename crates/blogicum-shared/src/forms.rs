//! Form payloads accepted by the write endpoints, with their validation rules.
//!
//! Rules are declared with `validator`; [`messages`] flattens a failure into
//! one `"field: message"` entry per problem. Checks that need storage
//! (unique usernames, existing categories) are done by the handlers.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Create/edit payload for a post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[validate(
        length(min = 1, max = 256, message = "between 1 and 256 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// A future date schedules the post.
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Image path relative to the media root.
    #[serde(default)]
    #[validate(custom(function = "safe_media_path"))]
    pub image: Option<String>,
}

/// Payload for adding or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

/// Editable part of the current user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(
        length(min = 1, max = 150, message = "between 1 and 150 characters"),
        custom(function = "username_charset")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "at most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "at most 150 characters"))]
    pub last_name: String,
    /// Optional; a blank value clears it.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "enter a valid email address"))]
    pub email: Option<String>,
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(
        length(min = 1, max = 150, message = "between 1 and 150 characters"),
        custom(function = "username_charset")
    )]
    pub username: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "enter a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 150, message = "at most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "at most 150 characters"))]
    pub last_name: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Flatten validation failures into sorted `"field: message"` entries.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut out: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e.message.as_deref().unwrap_or(&*e.code);
                format!("{}: {}", field, message)
            })
        })
        .collect();
    out.sort();
    out
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "this field is required"));
    }
    Ok(())
}

fn username_charset(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(rule("charset", "letters, digits and @/./+/-/_ only"));
    }
    Ok(())
}

fn safe_media_path(path: &str) -> Result<(), ValidationError> {
    let safe = !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path.split('/').all(|part| !part.is_empty() && part != "..");
    if !safe {
        return Err(rule(
            "media_path",
            "must be a relative path inside the media root",
        ));
    }
    Ok(())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
