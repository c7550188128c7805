// ==========================================
// 商品目录导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::path::PathBuf;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 报告目录
    ///
    /// # 默认值
    /// - error-reports
    async fn get_report_dir(&self) -> RepositoryResult<PathBuf>;

    /// CSV 固定分隔符（不支持引号/转义）
    ///
    /// # 默认值
    /// - ','
    async fn get_csv_delimiter(&self) -> RepositoryResult<char>;

    /// 报告写入失败时是否让整个导入失败
    ///
    /// # 默认值
    /// - false（记录日志并吞掉，汇总中不带报告标识）
    async fn get_fail_on_report_error(&self) -> RepositoryResult<bool>;

    /// 每个时间窗口允许的上传次数（0 = 不限制）
    ///
    /// # 默认值
    /// - 0
    async fn get_upload_rate_limit(&self) -> RepositoryResult<u32>;

    /// 上传限流窗口（秒）
    ///
    /// # 默认值
    /// - 60
    async fn get_upload_rate_window_secs(&self) -> RepositoryResult<u64>;
}
