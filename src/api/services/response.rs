//! 统一 JSON 响应封装与错误码

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::RankingError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 排行榜错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    CityNotFound = 3000,
    InvalidDonation = 3001,
    StorageError = 3005,
    DonationCommitted = 3006,
}

impl From<&RankingError> for ErrorCode {
    fn from(err: &RankingError) -> Self {
        match err {
            RankingError::InvalidInput(_) => ErrorCode::InvalidDonation,
            RankingError::NotFound(_) => ErrorCode::CityNotFound,
            RankingError::StorageFailure(_) => ErrorCode::StorageError,
            RankingError::Committed(_) => ErrorCode::DonationCommitted,
            RankingError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            _ => ErrorCode::InternalServerError,
        }
    }
}

/// `{code, message, data}` 响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 RankingError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_ranking(err: &RankingError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<RankingError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: RankingError = e.into();
            if err.http_status().is_server_error() {
                tracing::error!("Request failed: {}", err);
            }
            error_from_ranking(&err)
        }
    }
}
