use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 参考数据 (物料主数据 / GRN 预期数量) 文件位置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub item_master_path: String,
    pub expected_qty_path: String,
    /// 文件不存在时写入示例数据
    pub seed_samples: bool,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://inbound_log.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ITEM_MASTER_PATH: &str = "databases/AURRSGLBD0250 - Item Stockroom Balance.csv";
const DEFAULT_EXPECTED_QTY_PATH: &str =
    "databases/AURRSGLBD0280 - Stock In Goods Inwards And Inspection.csv";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            reference: ReferenceConfig {
                item_master_path: DEFAULT_ITEM_MASTER_PATH.to_string(),
                expected_qty_path: DEFAULT_EXPECTED_QTY_PATH.to_string(),
                seed_samples: true,
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> receiving.toml (可选) -> RECEIVING__* 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("receiving")
    }

    /// 从指定配置文件 (不含扩展名) 加载
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .set_default("database.max_connections", i64::from(DEFAULT_MAX_CONNECTIONS))?
            .set_default("reference.item_master_path", DEFAULT_ITEM_MASTER_PATH)?
            .set_default("reference.expected_qty_path", DEFAULT_EXPECTED_QTY_PATH)?
            .set_default("reference.seed_samples", true)?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("RECEIVING").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_sqlite() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert!(config.database.url.starts_with("sqlite:"));
        assert!(config.reference.seed_samples);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receiving.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[reference]\nseed_samples = false\n",
        )
        .unwrap();

        let stem = dir.path().join("receiving");
        let config = AppConfig::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.reference.seed_samples);
        assert_eq!(config.database.max_connections, 5);
    }
}
