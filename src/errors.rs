use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RankingError {
    InvalidInput(String),
    NotFound(String),
    StorageFailure(String),
    /// The donation was counted but a later step (activity append, ranking
    /// pass) failed. Retrying would count it twice; `rebuild_ranking` repairs
    /// stale ranks.
    Committed(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    Serialization(String),
    FileOperation(String),
    Configuration(String),
}

impl RankingError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            RankingError::InvalidInput(_) => "E001",
            RankingError::NotFound(_) => "E002",
            RankingError::StorageFailure(_) => "E003",
            RankingError::DatabaseConfig(_) => "E004",
            RankingError::DatabaseConnection(_) => "E005",
            RankingError::Serialization(_) => "E006",
            RankingError::FileOperation(_) => "E007",
            RankingError::Configuration(_) => "E008",
            RankingError::Committed(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            RankingError::InvalidInput(_) => "Invalid Input",
            RankingError::NotFound(_) => "Resource Not Found",
            RankingError::StorageFailure(_) => "Storage Failure",
            RankingError::DatabaseConfig(_) => "Database Configuration Error",
            RankingError::DatabaseConnection(_) => "Database Connection Error",
            RankingError::Serialization(_) => "Serialization Error",
            RankingError::FileOperation(_) => "File Operation Error",
            RankingError::Configuration(_) => "Configuration Error",
            RankingError::Committed(_) => "Donation Counted With Errors",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            RankingError::InvalidInput(msg) => msg,
            RankingError::NotFound(msg) => msg,
            RankingError::StorageFailure(msg) => msg,
            RankingError::DatabaseConfig(msg) => msg,
            RankingError::DatabaseConnection(msg) => msg,
            RankingError::Serialization(msg) => msg,
            RankingError::FileOperation(msg) => msg,
            RankingError::Configuration(msg) => msg,
            RankingError::Committed(msg) => msg,
        }
    }

    /// Whether the caller may safely retry the failed operation
    ///
    /// Failures after the aggregate increment surface as `Committed`, which
    /// is never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RankingError::StorageFailure(_) | RankingError::DatabaseConnection(_)
        )
    }

    /// 映射 HTTP 状态码
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            RankingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RankingError::NotFound(_) => StatusCode::NOT_FOUND,
            RankingError::StorageFailure(_) | RankingError::DatabaseConnection(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for RankingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RankingError {}

// 便捷的构造函数
impl RankingError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        RankingError::InvalidInput(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RankingError::NotFound(msg.into())
    }

    pub fn storage_failure<T: Into<String>>(msg: T) -> Self {
        RankingError::StorageFailure(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        RankingError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        RankingError::DatabaseConnection(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RankingError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        RankingError::FileOperation(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        RankingError::Configuration(msg.into())
    }

    pub fn committed<T: Into<String>>(msg: T) -> Self {
        RankingError::Committed(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for RankingError {
    fn from(err: sea_orm::DbErr) -> Self {
        RankingError::StorageFailure(err.to_string())
    }
}

impl From<std::io::Error> for RankingError {
    fn from(err: std::io::Error) -> Self {
        RankingError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for RankingError {
    fn from(err: serde_json::Error) -> Self {
        RankingError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for RankingError {
    fn from(err: toml::ser::Error) -> Self {
        RankingError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for RankingError {
    fn from(err: config::ConfigError) -> Self {
        RankingError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
