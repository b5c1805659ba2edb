use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LinkSaverError {
    /// Link, resource or token absent
    NotFound(String),
    /// Root document unreachable, timed out, or answered with a non-2xx status
    InvalidSource(String),
    /// Origin rejected the root fetch with 403
    Forbidden(String),
    /// Persistence-level conflict
    AlreadyExists(String),
    /// Storage or cache transport failure
    Internal(String),
    /// Bulk listing failure
    Aborted(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    CacheConnection(String),
    CachePluginNotFound(String),
    Validation(String),
}

impl LinkSaverError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkSaverError::NotFound(_) => "E001",
            LinkSaverError::InvalidSource(_) => "E002",
            LinkSaverError::Forbidden(_) => "E003",
            LinkSaverError::AlreadyExists(_) => "E004",
            LinkSaverError::Internal(_) => "E005",
            LinkSaverError::Aborted(_) => "E006",
            LinkSaverError::DatabaseConfig(_) => "E007",
            LinkSaverError::DatabaseConnection(_) => "E008",
            LinkSaverError::CacheConnection(_) => "E009",
            LinkSaverError::CachePluginNotFound(_) => "E010",
            LinkSaverError::Validation(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkSaverError::NotFound(_) => "Not Found",
            LinkSaverError::InvalidSource(_) => "Invalid Source",
            LinkSaverError::Forbidden(_) => "Source Forbidden",
            LinkSaverError::AlreadyExists(_) => "Already Exists",
            LinkSaverError::Internal(_) => "Internal Error",
            LinkSaverError::Aborted(_) => "Aborted",
            LinkSaverError::DatabaseConfig(_) => "Database Configuration Error",
            LinkSaverError::DatabaseConnection(_) => "Database Connection Error",
            LinkSaverError::CacheConnection(_) => "Cache Connection Error",
            LinkSaverError::CachePluginNotFound(_) => "Cache Plugin Not Found",
            LinkSaverError::Validation(_) => "Validation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkSaverError::NotFound(msg)
            | LinkSaverError::InvalidSource(msg)
            | LinkSaverError::Forbidden(msg)
            | LinkSaverError::AlreadyExists(msg)
            | LinkSaverError::Internal(msg)
            | LinkSaverError::Aborted(msg)
            | LinkSaverError::DatabaseConfig(msg)
            | LinkSaverError::DatabaseConnection(msg)
            | LinkSaverError::CacheConnection(msg)
            | LinkSaverError::CachePluginNotFound(msg)
            | LinkSaverError::Validation(msg) => msg,
        }
    }

    /// HTTP status used when the error reaches a response
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkSaverError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkSaverError::InvalidSource(_) => StatusCode::BAD_GATEWAY,
            LinkSaverError::Forbidden(_) => StatusCode::FORBIDDEN,
            LinkSaverError::AlreadyExists(_) => StatusCode::CONFLICT,
            LinkSaverError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkSaverError::Aborted(_)
            | LinkSaverError::Internal(_)
            | LinkSaverError::DatabaseConfig(_)
            | LinkSaverError::DatabaseConnection(_)
            | LinkSaverError::CacheConnection(_)
            | LinkSaverError::CachePluginNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LinkSaverError::NotFound(_))
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkSaverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkSaverError {}

// 便捷的构造函数
impl LinkSaverError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::NotFound(msg.into())
    }

    pub fn invalid_source<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::InvalidSource(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::Forbidden(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::AlreadyExists(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::Internal(msg.into())
    }

    pub fn aborted<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::Aborted(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::DatabaseConnection(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::CacheConnection(msg.into())
    }

    pub fn cache_plugin_not_found<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::CachePluginNotFound(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkSaverError::Validation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkSaverError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return LinkSaverError::AlreadyExists(detail);
        }
        LinkSaverError::Internal(format!("database error: {}", err))
    }
}

impl From<redis::RedisError> for LinkSaverError {
    fn from(err: redis::RedisError) -> Self {
        LinkSaverError::Internal(format!("cache error: {}", err))
    }
}

impl From<reqwest::Error> for LinkSaverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return LinkSaverError::Internal(format!("http client error: {}", err));
        }
        match err.status() {
            Some(reqwest::StatusCode::FORBIDDEN) => {
                LinkSaverError::Forbidden(format!("source refused access: {}", err))
            }
            _ if err.is_timeout() => {
                LinkSaverError::InvalidSource(format!("source timed out: {}", err))
            }
            _ => LinkSaverError::InvalidSource(format!("source unreachable: {}", err)),
        }
    }
}

impl From<serde_json::Error> for LinkSaverError {
    fn from(err: serde_json::Error) -> Self {
        LinkSaverError::Internal(format!("serialization error: {}", err))
    }
}

impl From<std::io::Error> for LinkSaverError {
    fn from(err: std::io::Error) -> Self {
        LinkSaverError::Internal(format!("io error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, LinkSaverError>;
