//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on reasonable UX limits for names, descriptions
//! and comments; the storage layer does not enforce lengths itself.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Product names (catalog)
pub const MIN_PRODUCT_NAME_LEN: usize = 3;
pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Display names (users)
pub const MAX_NAME_LEN: usize = 100;

/// Product descriptions and comment bodies
pub const MAX_TEXT_LEN: usize = 500;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a product name (non-empty, bounded length).
pub fn validate_product_name(name: &str) -> Result<(), AppError> {
    validate_required_text(name, "name", MAX_PRODUCT_NAME_LEN)?;
    if name.trim().len() < MIN_PRODUCT_NAME_LEN {
        return Err(AppError::validation(format!(
            "name must be at least {MIN_PRODUCT_NAME_LEN} chars"
        )));
    }
    Ok(())
}

/// Shallow email shape check: one '@' with non-empty local part and a dotted domain.
/// Deliverability is not our problem; this only rejects obvious garbage.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation(format!("Invalid email: {email}")));
    }
    Ok(())
}

/// Validate a password (bounded length, before hashing).
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} chars"
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN} chars)"
        )));
    }
    Ok(())
}
