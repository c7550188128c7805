// ==========================================
// 商品目录导入 - 差异报告存储
// ==========================================
// 职责: 按标识写入/读取报告文件
// 布局: <report_dir>/<id>.csv（CSV 来源）或 <report_dir>/<id>-excel.csv（Excel 来源）
// 说明: 检索只凭标识，不做归属校验（由外部鉴权层把关）
// ==========================================

use crate::domain::types::SourceFormat;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// 已存储的报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    pub file_name: String,
    pub content: String,
}

// ==========================================
// ReportStore Trait
// ==========================================
// 实现者: FsReportStore
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// 写入报告（一次写入，不再修改）
    async fn store(&self, id: &str, origin: SourceFormat, content: &str) -> RepositoryResult<()>;

    /// 按标识读取报告
    ///
    /// # 返回
    /// - Err(NotFound): 标识未知
    async fn retrieve(&self, id: &str) -> RepositoryResult<StoredReport>;
}

fn not_found(id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "ErrorReport".to_string(),
        id: id.to_string(),
    }
}

// ==========================================
// FsReportStore - 本地文件系统实现
// ==========================================
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn file_name(id: &str, origin: SourceFormat) -> String {
        format!("{}{}", id, origin.report_suffix())
    }
}

#[async_trait]
impl ReportStore for FsReportStore {
    async fn store(&self, id: &str, origin: SourceFormat, content: &str) -> RepositoryResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(Self::file_name(id, origin));
        tokio::fs::write(&path, content).await?;

        debug!(path = %path.display(), "报告已写入");
        Ok(())
    }

    async fn retrieve(&self, id: &str) -> RepositoryResult<StoredReport> {
        // 标识必须是 UUID，避免路径穿越
        if Uuid::parse_str(id).is_err() {
            return Err(not_found(id));
        }

        for origin in SourceFormat::all() {
            let file_name = Self::file_name(id, origin);
            let path = self.dir.join(&file_name);

            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok(StoredReport { file_name, content }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(not_found(id))
    }
}
