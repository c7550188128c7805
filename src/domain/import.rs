// ==========================================
// 商品目录导入 - 导入过程领域模型
// ==========================================
// 职责: 行记录 / 候选记录 / 行结果 / 导入汇总 / 报告条目
// 生命周期:
// - RawRow / CandidateRecord: 仅在单行处理期间存在
// - ImportSummary / ReportEntry: 返回给调用方或写入报告
// ==========================================

use crate::domain::types::ReportKind;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

// ==========================================
// RawRow - 原始行
// ==========================================
// 行号: 1 起，与源文件行号一致（表头不产生 RawRow）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub index: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        Self { index, cells }
    }

    /// 按列位置取值（越界返回 None）
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// 还原原始行文本（用于错误诊断）
    pub fn raw_text(&self, delimiter: char) -> String {
        self.cells.join(&delimiter.to_string())
    }
}

// ==========================================
// CandidateRecord - 校验通过的候选记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub row: usize,
    pub name: String, // 展示名称（电子表格含变体时为 "<name> - <variant>"）
    pub price: BigDecimal,
    pub description: String,
    pub stock: i32, // 负数不在此层拦截
    pub sku: Option<String>,
    pub variant: Option<String>,
    pub category: Option<String>,
}

// ==========================================
// RowOutcome - 行处理结果
// ==========================================
// Skipped: 可识别的非错误情况（重复/缺少名称）
// Rejected: 行格式错误（解析/类型失败）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(String),
    Skipped {
        row: usize,
        reason: String,
    },
    Rejected {
        row: usize,
        raw: String,
        reason: String,
    },
}

impl RowOutcome {
    pub fn skipped(row: usize, reason: impl Into<String>) -> Self {
        RowOutcome::Skipped {
            row,
            reason: reason.into(),
        }
    }

    pub fn rejected(row: usize, raw: impl Into<String>, reason: impl Into<String>) -> Self {
        RowOutcome::Rejected {
            row,
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// 转换为报告条目（Accepted 不进入报告）
    pub fn to_report_entry(&self) -> Option<ReportEntry> {
        match self {
            RowOutcome::Accepted(_) => None,
            RowOutcome::Skipped { row, reason } => Some(ReportEntry {
                kind: ReportKind::Skipped,
                message: format!("Row {}: {} (SKIPPED)", row, reason),
            }),
            RowOutcome::Rejected { row, raw, reason } => Some(ReportEntry {
                kind: ReportKind::Error,
                message: format!("Row {}: {} | Error: {}", row, raw, reason),
            }),
        }
    }
}

// ==========================================
// ReportEntry - 报告条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub kind: ReportKind,
    pub message: String,
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
// 对外契约: {successCount, errorCount, skippedCount, errorReportId|null}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
    pub error_report_id: Option<String>,
}

impl ImportSummary {
    /// 数据行总数（不含表头）
    pub fn total_rows(&self) -> usize {
        self.success_count + self.error_count + self.skipped_count
    }

    pub fn has_discrepancies(&self) -> bool {
        self.error_count + self.skipped_count > 0
    }
}
