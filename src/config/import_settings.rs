// ==========================================
// 商品目录导入 - 导入参数快照
// ==========================================
// 职责: 一次导入调用使用的已解析配置（纯值对象）
// ==========================================

use crate::config::config_manager::defaults;
use crate::config::import_config_trait::ImportConfigReader;
use crate::repository::error::RepositoryResult;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub report_dir: PathBuf,
    pub csv_delimiter: char,
    /// false: 报告写入失败只记日志，汇总不带报告标识
    pub fail_on_report_error: bool,
    pub upload_rate_limit: u32,
    pub upload_rate_window: Duration,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from(defaults::REPORT_DIR),
            csv_delimiter: defaults::CSV_DELIMITER,
            fail_on_report_error: false,
            upload_rate_limit: 0,
            upload_rate_window: Duration::from_secs(defaults::UPLOAD_RATE_WINDOW_SECS),
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> RepositoryResult<Self> {
        Ok(Self {
            report_dir: config.get_report_dir().await?,
            csv_delimiter: config.get_csv_delimiter().await?,
            fail_on_report_error: config.get_fail_on_report_error().await?,
            upload_rate_limit: config.get_upload_rate_limit().await?,
            upload_rate_window: Duration::from_secs(config.get_upload_rate_window_secs().await?),
        })
    }
}
