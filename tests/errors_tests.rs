use actix_web::http::StatusCode;
use cityrank::api::services::ErrorCode;
use cityrank::errors::{RankingError, Result};
use std::error::Error;

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let error = RankingError::invalid_input("amount must be positive");

        assert!(matches!(error, RankingError::InvalidInput(_)));
        assert!(error.to_string().contains("Invalid Input"));
        assert!(error.to_string().contains("amount must be positive"));
    }

    #[test]
    fn test_not_found_error() {
        let error = RankingError::not_found("Nowhere");

        assert!(matches!(error, RankingError::NotFound(_)));
        assert_eq!(error.to_string(), "Resource Not Found: Nowhere");
    }

    #[test]
    fn test_storage_failure_error() {
        let error = RankingError::storage_failure("disk full");

        assert!(matches!(error, RankingError::StorageFailure(_)));
        assert_eq!(error.message(), "disk full");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            RankingError::invalid_input(""),
            RankingError::not_found(""),
            RankingError::storage_failure(""),
            RankingError::database_config(""),
            RankingError::database_connection(""),
            RankingError::serialization(""),
            RankingError::file_operation(""),
            RankingError::configuration(""),
            RankingError::committed(""),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}

#[cfg(test)]
mod error_classification_tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            RankingError::invalid_input("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RankingError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RankingError::storage_failure("x").http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RankingError::configuration("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_retryable() {
        assert!(RankingError::storage_failure("x").is_retryable());
        assert!(RankingError::database_connection("x").is_retryable());
        assert!(!RankingError::invalid_input("x").is_retryable());
        assert!(!RankingError::database_config("x").is_retryable());
        // 已计入的捐赠不可重试
        assert!(!RankingError::committed("x").is_retryable());
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(
            ErrorCode::from(&RankingError::invalid_input("x")),
            ErrorCode::InvalidDonation
        );
        assert_eq!(
            ErrorCode::from(&RankingError::not_found("x")),
            ErrorCode::CityNotFound
        );
        assert_eq!(
            ErrorCode::from(&RankingError::storage_failure("x")),
            ErrorCode::StorageError
        );
        assert_eq!(
            ErrorCode::from(&RankingError::file_operation("x")),
            ErrorCode::InternalServerError
        );
    }
}

#[cfg(test)]
mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let error: RankingError = io.into();
        assert!(matches!(error, RankingError::FileOperation(_)));
        assert!(error.message().contains("missing file"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: RankingError = parse_err.into();
        assert!(matches!(error, RankingError::Serialization(_)));
    }

    #[test]
    fn test_from_db_error() {
        let db = sea_orm::DbErr::Custom("constraint".to_string());
        let error: RankingError = db.into();
        assert!(matches!(error, RankingError::StorageFailure(_)));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_question_mark_propagation() {
        fn parse(input: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(input)?)
        }
        assert!(parse("[1, 2]").is_ok());
        assert!(matches!(
            parse("[1,"),
            Err(RankingError::Serialization(_))
        ));
    }
}
