// ==========================================
// 商品目录导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、导入过程值对象、枚举类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod import;
pub mod product;
pub mod types;

// 重导出核心类型
pub use import::{CandidateRecord, ImportSummary, RawRow, ReportEntry, RowOutcome};
pub use product::{Category, NewProduct, Product};
pub use types::{ReportKind, SourceFormat};
