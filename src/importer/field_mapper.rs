// ==========================================
// 商品目录导入 - 字段映射/校验器
// ==========================================
// 职责: RawRow → CandidateRecord 或 行级结果（Skipped / Rejected）
// 规则:
// - 名称缺失/空白 → Skipped("missing product name")
// - 必填字段缺失、越界或类型不符 → Rejected("<field> parse error")
// - 价格: 任意精度小数，不做舍入
// - 库存: 整数，负数不在此层拦截
// ==========================================

use crate::domain::import::{CandidateRecord, RawRow, RowOutcome};
use crate::domain::types::SourceFormat;
use bigdecimal::{BigDecimal, Signed};
use std::str::FromStr;

pub const MISSING_NAME_REASON: &str = "missing product name";

// ==========================================
// ColumnLayout - 列布局
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: usize,
    pub price: usize,
    pub stock: usize,
    pub description: Option<usize>,
    pub sku: Option<usize>,
    pub variant: Option<usize>,
    pub category: Option<usize>,
}

impl ColumnLayout {
    /// CSV: Name,Price,Description,Stock
    pub const fn delimited() -> Self {
        Self {
            name: 0,
            price: 1,
            description: Some(2),
            stock: 3,
            sku: None,
            variant: None,
            category: None,
        }
    }

    /// Excel: Name,SKU,Variant,Category,Price,Stock
    pub const fn spreadsheet() -> Self {
        Self {
            name: 0,
            sku: Some(1),
            variant: Some(2),
            category: Some(3),
            price: 4,
            stock: 5,
            description: None,
        }
    }

    pub const fn for_format(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Delimited => Self::delimited(),
            SourceFormat::Spreadsheet => Self::spreadsheet(),
        }
    }
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper {
    layout: ColumnLayout,
    delimiter: char, // 用于还原原始行文本
}

impl FieldMapper {
    pub fn new(layout: ColumnLayout, delimiter: char) -> Self {
        Self { layout, delimiter }
    }

    pub fn for_format(format: SourceFormat, delimiter: char) -> Self {
        let delimiter = match format {
            SourceFormat::Delimited => delimiter,
            SourceFormat::Spreadsheet => ',',
        };
        Self::new(ColumnLayout::for_format(format), delimiter)
    }

    /// 原始行文本（诊断用）
    pub fn raw_text(&self, row: &RawRow) -> String {
        row.raw_text(self.delimiter)
    }

    /// 识别行的展示名称（去重键）
    ///
    /// 只读取名称/变体列，不做其它字段校验
    /// - Err(Skipped): 名称缺失/空白
    pub fn display_name(&self, row: &RawRow) -> Result<String, RowOutcome> {
        let name = self.optional_text(row, Some(self.layout.name)).unwrap_or_default();
        if name.is_empty() {
            return Err(RowOutcome::skipped(row.index, MISSING_NAME_REASON));
        }

        // 有变体时拼接
        Ok(match self.variant(row) {
            Some(v) => format!("{} - {}", name, v),
            None => name,
        })
    }

    /// 将原始行映射为候选记录
    ///
    /// # 返回
    /// - Ok(CandidateRecord): 所有必填字段存在且可解析
    /// - Err(RowOutcome): Skipped / Rejected
    pub fn map_row(&self, row: &RawRow) -> Result<CandidateRecord, RowOutcome> {
        let display_name = self.display_name(row)?;

        let price = self.parse_price(row)?;

        let description = match self.layout.description {
            Some(column) => self.required_text(row, column, "description")?,
            None => String::new(),
        };

        let stock = self.parse_stock(row)?;

        let sku = self.optional_text(row, self.layout.sku);
        let category = self.optional_text(row, self.layout.category).filter(|c| !c.is_empty());

        // SKU 布局: 描述由 SKU 合成
        let description = match self.layout.sku {
            Some(_) => format!("SKU: {}", sku.as_deref().unwrap_or_default()),
            None => description,
        };

        Ok(CandidateRecord {
            row: row.index,
            name: display_name,
            price,
            description,
            stock,
            sku,
            variant: self.variant(row),
            category,
        })
    }

    fn variant(&self, row: &RawRow) -> Option<String> {
        self.optional_text(row, self.layout.variant).filter(|v| !v.is_empty())
    }

    fn reject(&self, row: &RawRow, field: &str) -> RowOutcome {
        RowOutcome::rejected(
            row.index,
            row.raw_text(self.delimiter),
            format!("{} parse error", field),
        )
    }

    fn optional_text(&self, row: &RawRow, column: Option<usize>) -> Option<String> {
        column
            .and_then(|c| row.cell(c))
            .map(|value| value.trim().to_string())
    }

    fn required_text(&self, row: &RawRow, column: usize, field: &str) -> Result<String, RowOutcome> {
        row.cell(column)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| self.reject(row, field))
    }

    fn parse_price(&self, row: &RawRow) -> Result<BigDecimal, RowOutcome> {
        let raw = self.required_text(row, self.layout.price, "price")?;
        // BigDecimal 接受数字分组下划线（"1_000"），导入格式不接受
        if raw.contains('_') {
            return Err(self.reject(row, "price"));
        }
        let price = BigDecimal::from_str(&raw).map_err(|_| self.reject(row, "price"))?;

        // 价格不得为负
        if price.is_negative() {
            return Err(self.reject(row, "price"));
        }
        Ok(price)
    }

    fn parse_stock(&self, row: &RawRow) -> Result<i32, RowOutcome> {
        let raw = self.required_text(row, self.layout.stock, "stock")?;
        raw.parse::<i32>().map_err(|_| self.reject(row, "stock"))
    }
}
