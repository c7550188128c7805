// ==========================================
// 商品目录导入 - 商品/分类领域模型
// ==========================================
// 职责: 目录存储中的商品与分类实体
// 对齐: db::init_schema products / categories 表
// ==========================================

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Category - 商品分类
// ==========================================
// 红线: 名称忽略大小写唯一（Unicode 大小写，不限 ASCII）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,   // UUID
    pub name: String, // 首次使用时的原样名称
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// 忽略大小写比较用的名称键
    ///
    /// 先转小写再转大写: "Straße" / "STRASSE"、"Обувь" / "обувь" 得到同一个键
    pub fn name_key(name: &str) -> String {
        name.to_lowercase().to_uppercase()
    }
}

// ==========================================
// Product - 商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String, // 去重键（区分大小写精确匹配）
    pub description: String,
    pub price: BigDecimal, // 任意精度，按 TEXT 落库
    pub stock: i32,
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewProduct - 待写入商品
// ==========================================
// 用途: 导入编排器 → 目录存储
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub category_id: Option<String>,
}
