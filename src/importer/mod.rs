// ==========================================
// 商品目录导入 - 导入层
// ==========================================
// 职责: 外部文件 → 目录商品/分类 + 差异报告
// 支持: Excel (.xlsx), 分隔文本 (.csv)
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod product_importer_impl;
pub mod product_importer_trait;
pub mod report;

// 重导出核心类型
pub use conflict_handler::CatalogResolver;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnLayout, FieldMapper};
pub use file_parser::{decode_rows, detect_format, CsvRowDecoder, ExcelRowDecoder};
pub use product_importer_impl::ProductImporterImpl;
pub use report::ReportGenerator;

// 重导出 Trait 接口
pub use product_importer_trait::ProductImporter;
