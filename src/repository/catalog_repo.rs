// ==========================================
// 商品目录导入 - 目录存储 Repository Trait
// ==========================================
// 职责: 定义商品/分类数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::product::{Category, NewProduct, Product};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogRepository Trait
// ==========================================
// 用途: 导入管道访问目录存储
// 实现者: CatalogRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ===== 商品 =====

    /// 按名称精确查找商品（区分大小写）
    async fn find_product_by_name(&self, name: &str) -> RepositoryResult<Option<Product>>;

    /// 写入商品，返回带 id 的实体
    async fn insert_product(&self, product: NewProduct) -> RepositoryResult<Product>;

    /// 商品总数
    async fn count_products(&self) -> RepositoryResult<usize>;

    // ===== 分类 =====

    /// 按名称查找分类（忽略大小写）
    async fn find_category_by_name_ignore_case(
        &self,
        name: &str,
    ) -> RepositoryResult<Option<Category>>;

    /// 以原样名称新建分类
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 同名（忽略大小写）分类已存在
    async fn insert_category(&self, name: &str) -> RepositoryResult<Category>;

    /// 列出所有分类（按名称排序）
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
}
