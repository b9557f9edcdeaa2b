//! Input checks applied before a request is sent.
//!
//! They mirror the backend's own constraints so obviously invalid input
//! fails without a round trip.

use crate::error::{ApiError, ApiResult};

/// Minimum length of a base64 image payload accepted for verification.
pub const MIN_IMAGE_BASE64_LEN: usize = 100;

pub(crate) fn non_empty<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

pub(crate) fn email(value: &str) -> ApiResult<&str> {
    let value = non_empty("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value),
        _ => Err(ApiError::Validation(format!("{:?} is not a valid email", value))),
    }
}

pub(crate) fn password(value: &str) -> ApiResult<&str> {
    if value.is_empty() {
        return Err(ApiError::Validation("password is required".into()));
    }
    Ok(value)
}

pub(crate) fn allowance(value: f64) -> ApiResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::Validation("allowance must be zero or more".into()));
    }
    Ok(value)
}

pub(crate) fn amount(value: f64) -> ApiResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::Validation("amount must be greater than zero".into()));
    }
    Ok(value)
}

pub(crate) fn price(value: f64) -> ApiResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::Validation("price must be greater than zero".into()));
    }
    Ok(value)
}

pub(crate) fn points(value: i32) -> ApiResult<i32> {
    if value < 1 {
        return Err(ApiError::Validation("points must be at least 1".into()));
    }
    Ok(value)
}

pub(crate) fn image_base64(value: &str) -> ApiResult<&str> {
    let value = value.trim();
    if value.len() < MIN_IMAGE_BASE64_LEN {
        return Err(ApiError::Validation("image is missing or too small".into()));
    }
    Ok(value)
}
