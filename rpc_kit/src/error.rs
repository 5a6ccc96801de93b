use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Startup-time failures. Per-request failures are reported as
/// [`Status`](crate::status::Status) values instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid route name {0:?}")]
    InvalidName(String),
    #[error("service {0:?} is mounted more than once")]
    DuplicateService(String),
    #[error("{0} is not a known status code")]
    UnknownCode(u16),
    #[error("SerdeJson Error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Checks that `name` can be used as a single path segment. A leading `:` or
/// `*` is refused because axum reads it as an old-style capture.
pub(crate) fn check_route_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "help"
        || name.contains(['/', '{', '}'])
        || name.starts_with([':', '*'])
    {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_names_reject_path_separators_and_help() {
        assert!(check_route_name("Users").is_ok());
        assert!(check_route_name("GetByUUID").is_ok());
        assert!(matches!(check_route_name(""), Err(Error::InvalidName(_))));
        assert!(matches!(check_route_name("a/b"), Err(Error::InvalidName(_))));
        assert!(matches!(check_route_name("help"), Err(Error::InvalidName(_))));
        assert!(matches!(check_route_name("{id}"), Err(Error::InvalidName(_))));
        assert!(matches!(check_route_name(":id"), Err(Error::InvalidName(_))));
        assert!(matches!(check_route_name("*rest"), Err(Error::InvalidName(_))));
        assert!(check_route_name("Get:ById").is_ok());
    }
}
