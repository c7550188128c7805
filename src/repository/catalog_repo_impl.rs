// ==========================================
// 商品目录导入 - 目录存储 Repository 实现
// ==========================================
// 职责: 实现商品/分类数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::product::{Category, NewProduct, Product};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// products 行的原始形态（price 仍为 TEXT）
type ProductRow = (String, String, String, String, i32, Option<String>, DateTime<Utc>);

fn read_product_row(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn product_from_row(raw: ProductRow) -> RepositoryResult<Product> {
    let (id, name, description, price, stock, category_id, created_at) = raw;
    let price = BigDecimal::from_str(&price).map_err(|e| {
        RepositoryError::InternalError(format!("商品 {} 价格格式损坏: {}", id, e))
    })?;

    Ok(Product {
        id,
        name,
        description,
        price,
        stock,
        category_id,
        created_at,
    })
}

fn read_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

// ==========================================
// CatalogRepositoryImpl
// ==========================================
pub struct CatalogRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（会再次应用统一 PRAGMA，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn.lock()?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn find_product_by_name(&self, name: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.conn.lock()?;

        let raw = conn
            .query_row(
                r#"
                SELECT id, name, description, price, stock, category_id, created_at
                FROM products
                WHERE name = ?1
                LIMIT 1
                "#,
                params![name],
                read_product_row,
            )
            .optional()?;

        raw.map(product_from_row).transpose()
    }

    async fn insert_product(&self, product: NewProduct) -> RepositoryResult<Product> {
        let conn = self.conn.lock()?;

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        conn.execute(
            r#"
            INSERT INTO products (id, name, description, price, stock, category_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                product.name,
                product.description,
                product.price.to_string(),
                product.stock,
                product.category_id,
                created_at,
            ],
        )?;

        Ok(Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            created_at,
        })
    }

    async fn count_products(&self) -> RepositoryResult<usize> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn find_category_by_name_ignore_case(
        &self,
        name: &str,
    ) -> RepositoryResult<Option<Category>> {
        let conn = self.conn.lock()?;

        let category = conn
            .query_row(
                "SELECT id, name, created_at FROM categories WHERE name_key = ?1 LIMIT 1",
                params![Category::name_key(name)],
                read_category,
            )
            .optional()?;

        Ok(category)
    }

    async fn insert_category(&self, name: &str) -> RepositoryResult<Category> {
        let conn = self.conn.lock()?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO categories (id, name, name_key, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.id,
                category.name,
                Category::name_key(name),
                category.created_at
            ],
        )?;

        Ok(category)
    }

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let conn = self.conn.lock()?;

        let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], read_category)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }
}
