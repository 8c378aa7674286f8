//! Path name validation and URL mapping.
//!
//! A path is a dot-delimited hierarchical identifier such as
//! `switch.interfaces`. Segments are non-empty and made of lower-case ASCII
//! letters, digits, `-` and `_`. Names are lower-case because URLs are
//! lower-cased before lookup.

use crate::error::AppError;
use crate::result::AppResult;

/// Check that `name` is a well-formed path name.
pub fn validate_path_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("Path name must not be empty"));
    }

    for segment in name.split('.') {
        if segment.is_empty() {
            return Err(AppError::validation(format!(
                "Path '{name}' contains an empty segment"
            )));
        }
        if let Some(bad) = segment
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(AppError::validation(format!(
                "Path '{name}' contains invalid character '{bad}'"
            )));
        }
    }

    Ok(())
}

/// Map a request URL path onto a path name.
///
/// Leading and trailing slashes are dropped, remaining slashes become dots,
/// and the result is lower-cased: `/Server/Load` → `server.load`.
pub fn path_from_url(url_path: &str) -> String {
    url_path
        .trim_matches('/')
        .replace('/', ".")
        .to_lowercase()
}
