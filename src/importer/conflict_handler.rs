// ==========================================
// 商品目录导入 - 去重与引用解析
// ==========================================
// 职责:
// - 按展示名称（区分大小写精确匹配）检测目录中已存在的商品
// - 按名称（忽略大小写）解析分类，不存在则按原样名称新建
// 并发: 查-建之间存在竞态；新建遇到唯一约束冲突时重新查询一次
// ==========================================

use crate::domain::import::RowOutcome;
use crate::domain::product::Category;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use tracing::{debug, warn};

// ==========================================
// CatalogResolver
// ==========================================
pub struct CatalogResolver<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R> CatalogResolver<'a, R>
where
    R: CatalogRepository + ?Sized,
{
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// 目录中已存在同名商品时返回 Skipped
    ///
    /// 先于字段校验执行：重复行无论其它字段是否合法都归为 Skipped
    pub async fn check_duplicate(&self, row: usize, name: &str) -> RepositoryResult<Option<RowOutcome>> {
        if self.repo.find_product_by_name(name).await?.is_none() {
            return Ok(None);
        }

        debug!(row, name, "目录中已存在同名商品");
        Ok(Some(RowOutcome::skipped(row, format!("{} | Duplicate", name))))
    }

    /// 解析可选分类引用，返回分类 ID
    pub async fn resolve_category_id(&self, name: Option<&str>) -> RepositoryResult<Option<String>> {
        match name {
            Some(name) => Ok(Some(self.resolve_category(name).await?.id)),
            None => Ok(None),
        }
    }

    /// 按名称（忽略大小写）获取分类，不存在则新建
    pub async fn resolve_category(&self, name: &str) -> RepositoryResult<Category> {
        if let Some(category) = self.repo.find_category_by_name_ignore_case(name).await? {
            return Ok(category);
        }

        match self.repo.insert_category(name).await {
            Ok(category) => {
                debug!(category = %category.name, "新建分类");
                Ok(category)
            }
            Err(RepositoryError::UniqueConstraintViolation(msg)) => {
                // 其他导入已抢先创建同名分类
                warn!(category = %name, "分类创建冲突，重新查询");
                self.repo
                    .find_category_by_name_ignore_case(name)
                    .await?
                    .ok_or(RepositoryError::UniqueConstraintViolation(msg))
            }
            Err(e) => Err(e),
        }
    }
}
