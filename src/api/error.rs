// ==========================================
// 商品目录导入 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将导入/仓储错误转换为调用方可区分的错误
// 区分: 客户端错误（文件无效、报告不存在、限流）与服务端错误
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 客户端错误
    // ==========================================
    /// 上传文件不可读或容器损坏（未处理任何行）
    #[error("文件无效: {0}")]
    InvalidFile(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("上传过于频繁: 每{window_secs}秒最多{limit}次")]
    RateLimited { limit: u32, window_secs: u64 },

    // ==========================================
    // 服务端错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为调用方可修正的错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidFile(_) | ApiError::NotFound(_) | ApiError::RateLimited { .. }
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => {
                ApiError::DatabaseError(format!("数据库连接失败: {}", msg))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::Io(e) => ApiError::InternalError(format!("文件读写失败: {}", e)),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_invalid_file() {
            return ApiError::InvalidFile(err.to_string());
        }

        match err {
            ImportError::Repository(e) => ApiError::from(e),
            ImportError::Other(e) => ApiError::Other(e),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
