use reqwest::StatusCode;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Empty not allowed")]
    Empty,
}

/// A response was received but the server did not report success
///
/// The body is kept as received so callers see the server's own message
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("{}", response_message(.status, .body))]
pub struct ResponseError {
    pub status: StatusCode,
    pub body: String,
}

impl ResponseError {
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

fn response_message(status: &StatusCode, body: &str) -> String {
    if body.is_empty() {
        format!("request failed with status code: {status} and no body")
    } else {
        body.to_string()
    }
}

/// Returns the [`ResponseError`] inside `err` if the failure came from the
/// server rather than the transport
pub fn response_error(err: &anyhow::Error) -> Option<&ResponseError> {
    err.downcast_ref::<ResponseError>()
}
