// ==========================================
// 商品导入API
// ==========================================
// 职责: 封装商品导入相关功能（薄层）
// - 上传 CSV / Excel（由入口决定格式，不做嗅探）
// - 按标识下载差异报告
// - 上传限流（实例级计数器）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::rate_tracker::UploadRateTracker;
use crate::config::{ConfigManager, ImportSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::import::ImportSummary;
use crate::domain::types::SourceFormat;
use crate::importer::{ProductImporter, ProductImporterImpl};
use crate::repository::{CatalogRepository, CatalogRepositoryImpl, FsReportStore, ReportStore};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 报告内容类型（表格文本）
pub const REPORT_CONTENT_TYPE: &str = "text/csv";

/// 报告下载响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDownload {
    /// 下载文件名（由报告标识派生）
    pub file_name: String,
    pub content_type: String,
    pub body: String,
}

/// 默认装配: SQLite 目录 + 本地文件报告
pub type DefaultImportApi = ImportApi<CatalogRepositoryImpl, FsReportStore>;

/// 导入API
pub struct ImportApi<R, S>
where
    R: CatalogRepository,
    S: ReportStore,
{
    importer: ProductImporterImpl<R, S>,
    rate_tracker: UploadRateTracker,
}

impl<R, S> ImportApi<R, S>
where
    R: CatalogRepository,
    S: ReportStore,
{
    /// 创建新的ImportApi实例
    pub fn new(importer: ProductImporterImpl<R, S>, rate_tracker: UploadRateTracker) -> Self {
        Self {
            importer,
            rate_tracker,
        }
    }

    /// 按导入参数创建（限流器由参数决定）
    pub fn with_settings(catalog_repo: R, report_store: S, settings: ImportSettings) -> Self {
        let rate_tracker =
            UploadRateTracker::new(settings.upload_rate_limit, settings.upload_rate_window);
        Self::new(
            ProductImporterImpl::new(catalog_repo, report_store, settings),
            rate_tracker,
        )
    }

    pub fn importer(&self) -> &ProductImporterImpl<R, S> {
        &self.importer
    }

    pub fn rate_tracker(&self) -> &UploadRateTracker {
        &self.rate_tracker
    }

    /// 上传 CSV 文件导入商品
    ///
    /// # 参数
    /// - upload: 上传内容流（逐行读取，不整体载入内存）
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入汇总
    /// - Err(InvalidFile): 文件不可读/无表头
    /// - Err(RateLimited): 上传过于频繁
    pub async fn upload_csv<U>(&self, upload: U) -> ApiResult<ImportSummary>
    where
        U: Read + Seek + Send + 'static,
    {
        self.upload(SourceFormat::Delimited, upload).await
    }

    /// 上传 Excel (.xlsx) 文件导入商品
    pub async fn upload_xlsx<U>(&self, upload: U) -> ApiResult<ImportSummary>
    where
        U: Read + Seek + Send + 'static,
    {
        self.upload(SourceFormat::Spreadsheet, upload).await
    }

    /// 上传指定格式的文件流
    pub async fn upload<U>(&self, format: SourceFormat, upload: U) -> ApiResult<ImportSummary>
    where
        U: Read + Seek + Send + 'static,
    {
        self.rate_tracker.try_acquire()?;

        let summary = self.importer.import(format, upload).await.map_err(|e| {
            warn!(format = %format, error = %e, "上传导入失败");
            ApiError::from(e)
        })?;

        info!(format = %format, total = summary.total_rows(), "上传导入完成");
        Ok(summary)
    }

    /// 导入本地文件（按扩展名判断格式）
    pub async fn import_file<P>(&self, file_path: P) -> ApiResult<ImportSummary>
    where
        P: AsRef<Path> + Send,
    {
        self.rate_tracker.try_acquire()?;
        Ok(self.importer.import_file(file_path).await?)
    }

    /// 下载差异报告
    ///
    /// # 返回
    /// - Err(NotFound): 标识未知
    pub async fn download_report(&self, report_id: &str) -> ApiResult<ReportDownload> {
        let report = self.importer.report_store().retrieve(report_id).await?;

        Ok(ReportDownload {
            file_name: report.file_name,
            content_type: REPORT_CONTENT_TYPE.to_string(),
            body: report.content,
        })
    }
}

impl DefaultImportApi {
    /// 打开数据库并按 config_kv 中的配置装配
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在则创建，schema 幂等初始化）
    pub async fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseError(format!("数据库打开失败: {}", e)))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(format!("schema 初始化失败: {}", e)))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())?;
        let settings = ImportSettings::load(&config).await?;
        let report_store = FsReportStore::new(&settings.report_dir);
        let catalog_repo = CatalogRepositoryImpl::from_connection(conn)?;

        info!(
            db_path,
            report_dir = %settings.report_dir.display(),
            rate_limit = settings.upload_rate_limit,
            "导入API已初始化"
        );
        Ok(Self::with_settings(catalog_repo, report_store, settings))
    }
}
