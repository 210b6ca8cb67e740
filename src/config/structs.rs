use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量、CORS
/// - database: 数据库连接与重试配置
/// - logging: 日志配置
/// - ranking: 排行榜默认参数
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.toml";

    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：CR，分隔符：__
    /// 示例：CR__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        // .env 文件中的变量同样参与覆盖
        dotenvy::dotenv().ok();

        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                if let Err(e) = config.validate() {
                    eprintln!("[ERROR] Invalid configuration: {}", e);
                    return Self::default();
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// Build the layered configuration without falling back to defaults
    pub fn try_load(path: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 CR，分隔符 __
            .add_source(
                Environment::with_prefix("CR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<AppConfig>()
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(format!(
                "Invalid logging.format: '{}'. Valid: text, json",
                self.logging.format
            ));
        }
        if self.ranking.max_city_length == 0 || self.ranking.max_donor_id_length == 0 {
            return Err("ranking.max_city_length and ranking.max_donor_id_length must be > 0".into());
        }
        if self.database.retry_base_delay_ms > self.database.retry_max_delay_ms {
            return Err(format!(
                "database.retry_base_delay_ms ({}) exceeds retry_max_delay_ms ({})",
                self.database.retry_base_delay_ms, self.database.retry_max_delay_ms
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 允许跨域的来源；空列表表示仅同源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// memory:// | sqlite://... | mysql://... | postgres://...
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 排行榜配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// top_cities 默认返回数量
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    /// city_context 默认半径
    #[serde(default = "default_context_radius")]
    pub context_radius: u32,
    /// city_statistics 中最近活动条数
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
    /// 全局统计使用去重后的捐赠者数（默认按城市累加）
    #[serde(default)]
    pub distinct_global_donors: bool,
    #[serde(default = "default_max_city_length")]
    pub max_city_length: usize,
    #[serde(default = "default_max_donor_id_length")]
    pub max_donor_id_length: usize,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://cityrank.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_top_limit() -> usize {
    3
}

fn default_context_radius() -> u32 {
    3
}

fn default_recent_activity_limit() -> usize {
    10
}

fn default_max_city_length() -> usize {
    100
}

fn default_max_donor_id_length() -> usize {
    64
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_limit: default_top_limit(),
            context_radius: default_context_radius(),
            recent_activity_limit: default_recent_activity_limit(),
            distinct_global_donors: false,
            max_city_length: default_max_city_length(),
            max_donor_id_length: default_max_donor_id_length(),
        }
    }
}
