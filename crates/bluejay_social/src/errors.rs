//! XRPC error classification.

use bluejay_error::{TransportError, TransportErrorKind};

const AUTH_ERRORS: &[&str] = &["AuthenticationRequired", "InvalidToken", "ExpiredToken"];

/// Map an XRPC failure to a transport error kind.
///
/// Anything indicating the target is gone becomes `NotFound` (permanent);
/// credential problems become `Authentication`; the rest is `Transient`.
///
/// # Examples
///
/// ```
/// use bluejay_social::classify_xrpc_error;
///
/// assert!(classify_xrpc_error(400, Some("NotFound"), Some("Post not found")).is_not_found());
/// assert!(classify_xrpc_error(404, None, None).is_not_found());
/// assert!(!classify_xrpc_error(502, None, None).is_not_found());
/// ```
#[track_caller]
pub fn classify_xrpc_error(
    status: u16,
    error: Option<&str>,
    message: Option<&str>,
) -> TransportError {
    let detail = format!(
        "HTTP {}: {}: {}",
        status,
        error.unwrap_or("-"),
        message.unwrap_or("-")
    );
    let not_found = status == 404
        || error == Some("NotFound")
        || message.is_some_and(|m| m.to_lowercase().contains("not found"));

    let kind = if not_found {
        TransportErrorKind::NotFound(detail)
    } else if status == 401 || error.is_some_and(|e| AUTH_ERRORS.contains(&e)) {
        TransportErrorKind::Authentication(detail)
    } else {
        TransportErrorKind::Transient(detail)
    };
    TransportError::new(kind)
}
