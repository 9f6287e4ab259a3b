use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Ошибки инициализации и работы выбора мест.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("unit price `{0}` is not a valid amount")]
    InvalidPrice(String),
    #[error("unit price must be non-negative, got {0}")]
    NegativePrice(f64),
    #[error("duplicate seat id `{0}` in booking container")]
    DuplicateSeat(String),
    #[error("unknown render target `{0}`")]
    UnknownTarget(String),
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("failed to encode booking form: {0}")]
    FormEncoding(#[from] serde_urlencoded::ser::Error),
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn to_api_error(status: StatusCode, message: &str) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { success: false, message: message.to_string() }))
}

impl From<BookingError> for (StatusCode, Json<ApiError>) {
    fn from(err: BookingError) -> Self {
        let status = match err {
            BookingError::FormEncoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            tracing::error!("booking error: {:?}", err);
        }
        to_api_error(status, &err.to_string())
    }
}
