// ==========================================
// 商品目录导入 - API 层
// ==========================================
// 职责: 提供导入业务接口，供外部传输层（HTTP/CLI）调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod rate_tracker;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{DefaultImportApi, ImportApi, ReportDownload, REPORT_CONTENT_TYPE};
pub use rate_tracker::UploadRateTracker;
