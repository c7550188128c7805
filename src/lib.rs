// ==========================================
// 商品目录导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 表格文件 → 商品目录的批量导入流水线
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与值对象
pub mod domain;

// 数据仓储层 - 目录存储与报告存储
pub mod repository;

// 导入层 - 解码/校验/去重/落库/报告
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 上传与报告下载
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{ImportSummary, ReportKind, RowOutcome, SourceFormat};

// 领域实体
pub use domain::{Category, Product};

// 导入器
pub use importer::{ImportError, ProductImporter, ProductImporterImpl};

// API
pub use api::{ApiError, DefaultImportApi, ImportApi, ReportDownload};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "catalog-import";
