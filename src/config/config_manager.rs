// ==========================================
// 商品目录导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn.lock()?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.conn.lock()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.conn.lock()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&config_map)
            .map_err(|e| RepositoryError::InternalError(format!("配置快照序列化失败: {}", e)))
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_report_dir(&self) -> RepositoryResult<PathBuf> {
        let value = self.get_config_or_default(config_keys::REPORT_DIR, defaults::REPORT_DIR)?;
        let value = value.trim();
        if value.is_empty() {
            Ok(PathBuf::from(defaults::REPORT_DIR))
        } else {
            Ok(PathBuf::from(value))
        }
    }

    async fn get_csv_delimiter(&self) -> RepositoryResult<char> {
        let value = self.get_config_or_default(config_keys::CSV_DELIMITER, ",")?;

        // 仅接受单个 ASCII 字符（csv 解析器按字节分隔）
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c),
            _ => {
                tracing::warn!(
                    config_key = config_keys::CSV_DELIMITER,
                    raw_value = %value,
                    "分隔符配置无效，使用默认 ','"
                );
                Ok(defaults::CSV_DELIMITER)
            }
        }
    }

    async fn get_fail_on_report_error(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::FAIL_ON_REPORT_ERROR, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        ))
    }

    async fn get_upload_rate_limit(&self) -> RepositoryResult<u32> {
        let value = self.get_config_or_default(config_keys::UPLOAD_RATE_LIMIT, "0")?;
        Ok(value.trim().parse::<u32>().unwrap_or(0))
    }

    async fn get_upload_rate_window_secs(&self) -> RepositoryResult<u64> {
        let value = self.get_config_or_default(config_keys::UPLOAD_RATE_WINDOW_SECS, "60")?;
        Ok(value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|&secs| secs > 0)
            .unwrap_or(defaults::UPLOAD_RATE_WINDOW_SECS))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const REPORT_DIR: &str = "import/report_dir";
    pub const CSV_DELIMITER: &str = "import/csv_delimiter";
    pub const FAIL_ON_REPORT_ERROR: &str = "import/fail_on_report_error";
    pub const UPLOAD_RATE_LIMIT: &str = "import/upload_rate_limit";
    pub const UPLOAD_RATE_WINDOW_SECS: &str = "import/upload_rate_window_secs";
}

// 默认值
pub mod defaults {
    pub const REPORT_DIR: &str = "error-reports";
    pub const CSV_DELIMITER: char = ',';
    pub const UPLOAD_RATE_WINDOW_SECS: u64 = 60;
}
