// ==========================================
// 商品目录导入 - 领域类型定义
// ==========================================
// 职责: 导入来源格式、报告条目类型等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SourceFormat - 导入来源格式
// ==========================================
// 决定: 行解码器 / 列布局 / 报告文件后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Delimited,   // 分隔符文本（CSV）
    Spreadsheet, // 电子表格（xlsx，仅第一个工作表）
}

impl SourceFormat {
    /// 报告文件名后缀（含扩展名）
    ///
    /// 同一标识在两种来源下的文件名不同，检索时两者都会尝试。
    pub fn report_suffix(&self) -> &'static str {
        match self {
            SourceFormat::Delimited => ".csv",
            SourceFormat::Spreadsheet => "-excel.csv",
        }
    }

    /// 所有来源格式（按检索优先级）
    pub fn all() -> [SourceFormat; 2] {
        [SourceFormat::Delimited, SourceFormat::Spreadsheet]
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Delimited => write!(f, "delimited-text"),
            SourceFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

// ==========================================
// ReportKind - 差异报告条目类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    Error,   // 行格式错误（Rejected）
    Skipped, // 识别但跳过（重复/缺少名称）
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Error => "ERROR",
            ReportKind::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
