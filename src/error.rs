use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors raised while turning an uploaded roster into a week schedule.
///
/// The assignment engine itself never fails; everything here comes from
/// reading files, decoding workbooks or loading configuration.
#[derive(Error, Debug)]
pub enum RotaError {
    // source not found
    #[error("Sheet \"{sheet}\" not found. Sheets: {}", .available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },

    #[error("Roster file not found: {0}")]
    FileNotFound(String),

    // malformed input
    #[error("No Excel bytes received")]
    EmptyPayload,

    #[error("Could not read workbook: {0}")]
    MalformedWorkbook(String),

    #[error("Could not read CSV roster: {0}")]
    MalformedCsv(String),

    #[error("Unsupported roster format: {0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("Invalid staffing configuration: {0}")]
    InvalidConfig(String),

    // internal failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RotaResult<T> = Result<T, RotaError>;

impl From<csv::Error> for RotaError {
    fn from(err: csv::Error) -> Self {
        RotaError::MalformedCsv(err.to_string())
    }
}

impl From<calamine::XlsxError> for RotaError {
    fn from(err: calamine::XlsxError) -> Self {
        RotaError::MalformedWorkbook(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for RotaError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        RotaError::Internal(err.to_string())
    }
}

impl RotaError {
    /// True for errors caused by what the caller sent rather than by us.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for RotaError {
    fn status_code(&self) -> StatusCode {
        match self {
            RotaError::SheetNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RotaError::FileNotFound(_) => StatusCode::NOT_FOUND,
            RotaError::EmptyPayload
            | RotaError::MalformedWorkbook(_)
            | RotaError::MalformedCsv(_)
            | RotaError::UnsupportedFormat(_)
            | RotaError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            RotaError::Io(_) | RotaError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_not_found_lists_available_sheets() {
        let err = RotaError::SheetNotFound {
            sheet: "SHO Rota".to_string(),
            available: vec!["Sheet1".to_string(), "FY1 Rota".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Sheet \"SHO Rota\" not found. Sheets: Sheet1, FY1 Rota"
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn status_codes_separate_client_and_server_failures() {
        assert!(RotaError::EmptyPayload.is_client_error());
        assert!(RotaError::MalformedWorkbook("zip".into()).is_client_error());
        assert!(RotaError::FileNotFound("rota.xlsx".into()).is_client_error());
        assert!(!RotaError::Internal("pool closed".into()).is_client_error());
        assert_eq!(
            RotaError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unreadable_config_json_is_a_client_error() {
        let err = crate::config::RotaConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, RotaError::InvalidConfig(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
