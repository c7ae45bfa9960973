use axum::http::StatusCode;

/// 收货日志错误分类
#[derive(Debug, thiserror::Error)]
pub enum ReceivingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Report error: {0}")]
    Report(String),
}

impl ReceivingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReceivingError::Validation(_) => StatusCode::BAD_REQUEST,
            ReceivingError::NotFound(_) | ReceivingError::EmptyInput(_) => StatusCode::NOT_FOUND,
            ReceivingError::Storage(_)
            | ReceivingError::ReferenceData(_)
            | ReceivingError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReceivingError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ReceivingError::Report(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReceivingError>;
