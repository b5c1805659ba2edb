//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LinkSaverError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 链接错误
/// - 3100-3199: 抓取错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkDatabaseError = 3005,
    LinkListAborted = 3007,

    // 抓取错误 3100-3199
    SourceUnreachable = 3100,
    SourceForbidden = 3101,
}

impl From<&LinkSaverError> for ErrorCode {
    fn from(err: &LinkSaverError) -> Self {
        match err {
            LinkSaverError::NotFound(_) => ErrorCode::LinkNotFound,
            LinkSaverError::InvalidSource(_) => ErrorCode::SourceUnreachable,
            LinkSaverError::Forbidden(_) => ErrorCode::SourceForbidden,
            LinkSaverError::AlreadyExists(_) => ErrorCode::LinkAlreadyExists,
            LinkSaverError::Validation(_) => ErrorCode::LinkInvalidUrl,
            LinkSaverError::Aborted(_) => ErrorCode::LinkListAborted,
            LinkSaverError::DatabaseConfig(_) | LinkSaverError::DatabaseConnection(_) => {
                ErrorCode::LinkDatabaseError
            }
            LinkSaverError::CacheConnection(_) | LinkSaverError::CachePluginNotFound(_) => {
                ErrorCode::ServiceUnavailable
            }
            LinkSaverError::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}
