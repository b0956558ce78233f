//! Input validation rules for usernames, passwords, and target URLs.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Validates a username: 3-32 characters, lowercase letters, digits,
/// hyphens and underscores, starting with a letter or digit.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(AppError::bad_request(
            "Username must be 3-32 characters",
            json!({ "username": username }),
        ));
    }

    let mut chars = username.chars();
    let first = chars.next().unwrap_or('-');
    if !first.is_ascii_alphanumeric() {
        return Err(AppError::bad_request(
            "Username must start with a letter or digit",
            json!({ "username": username }),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Username may contain only lowercase letters, digits, '-' and '_'",
            json!({ "username": username }),
        ));
    }

    Ok(())
}

/// Validates password strength: at least 8 characters with at least one
/// letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::bad_request(
            "Password must be at least 8 characters",
            json!({}),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AppError::bad_request(
            "Password must contain at least one letter and one digit",
            json!({}),
        ));
    }

    Ok(())
}

/// Validates a redirect target: parseable absolute URL with an http(s)
/// scheme and a host.
pub fn validate_target_url(raw: &str) -> Result<(), AppError> {
    let parsed = Url::parse(raw).map_err(|e| {
        AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "URL scheme must be http or https",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(AppError::bad_request("URL must have a host", json!({})));
    }

    Ok(())
}
