// ==========================================
// 商品目录导入 - 导入编排器实现
// ==========================================
// 职责: 整合导入流程，从文件流到目录存储
// 流程: 解码 → 名称/去重 → 字段校验 → 分类解析 → 落库|归类 → 汇总 + 差异报告
// ==========================================
// 约束:
// - 单次导入逐行顺序执行（行号报告 + 后续行可见前面行的去重/分类效果）
// - 行级失败只归类，不中断；只有文件级错误让整次调用失败
// - 报告写入失败默认只记日志（由 fail_on_report_error 控制）
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::import::{CandidateRecord, ImportSummary, RawRow, ReportEntry, RowOutcome};
use crate::domain::product::NewProduct;
use crate::domain::types::SourceFormat;
use crate::importer::conflict_handler::CatalogResolver;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::decode_rows;
use crate::importer::product_importer_trait::ProductImporter;
use crate::importer::report::ReportGenerator;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::report_store::ReportStore;
use async_trait::async_trait;
use std::io::{Read, Seek};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// OutcomeAccumulator - 行结果累加器
// ==========================================
#[derive(Debug, Default)]
struct OutcomeAccumulator {
    success_count: usize,
    error_count: usize,
    skipped_count: usize,
    entries: Vec<ReportEntry>,
}

impl OutcomeAccumulator {
    fn record(&mut self, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Accepted(_) => self.success_count += 1,
            RowOutcome::Skipped { .. } => self.skipped_count += 1,
            RowOutcome::Rejected { .. } => self.error_count += 1,
        }
        if let Some(entry) = outcome.to_report_entry() {
            self.entries.push(entry);
        }
    }

    fn into_summary(self) -> (ImportSummary, Vec<ReportEntry>) {
        let summary = ImportSummary {
            success_count: self.success_count,
            error_count: self.error_count,
            skipped_count: self.skipped_count,
            error_report_id: None,
        };
        (summary, self.entries)
    }
}

// ==========================================
// ProductImporterImpl - 商品导入器实现
// ==========================================
pub struct ProductImporterImpl<R, S>
where
    R: CatalogRepository,
    S: ReportStore,
{
    // 目录存储
    catalog_repo: R,

    // 差异报告存储
    report_store: S,

    // 导入参数
    settings: ImportSettings,
}

impl<R, S> ProductImporterImpl<R, S>
where
    R: CatalogRepository,
    S: ReportStore,
{
    /// 创建新的 ProductImporter 实例
    pub fn new(catalog_repo: R, report_store: S, settings: ImportSettings) -> Self {
        Self {
            catalog_repo,
            report_store,
            settings,
        }
    }

    /// 从配置读取器加载参数后创建
    pub async fn from_config<C>(catalog_repo: R, report_store: S, config: &C) -> ImportResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        let settings = ImportSettings::load(config).await?;
        Ok(Self::new(catalog_repo, report_store, settings))
    }

    pub fn catalog_repo(&self) -> &R {
        &self.catalog_repo
    }

    pub fn report_store(&self) -> &S {
        &self.report_store
    }

    /// 处理单行（行级错误全部折叠为 RowOutcome）
    async fn process_row(
        &self,
        mapper: &FieldMapper,
        resolver: &CatalogResolver<'_, R>,
        row: RawRow,
    ) -> RowOutcome {
        match self.classify(mapper, resolver, &row).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(row = row.index, error = %e, "行写入失败");
                RowOutcome::rejected(row.index, mapper.raw_text(&row), e.to_string())
            }
        }
    }

    /// 名称 → 去重 → 字段校验 → 分类解析 → 落库
    async fn classify(
        &self,
        mapper: &FieldMapper,
        resolver: &CatalogResolver<'_, R>,
        row: &RawRow,
    ) -> RepositoryResult<RowOutcome> {
        let display_name = match mapper.display_name(row) {
            Ok(name) => name,
            Err(outcome) => return Ok(outcome),
        };

        // 重复优先于字段校验
        if let Some(outcome) = resolver.check_duplicate(row.index, &display_name).await? {
            return Ok(outcome);
        }

        let candidate = match mapper.map_row(row) {
            Ok(candidate) => candidate,
            Err(outcome) => return Ok(outcome),
        };

        self.persist(resolver, candidate).await
    }

    async fn persist(
        &self,
        resolver: &CatalogResolver<'_, R>,
        candidate: CandidateRecord,
    ) -> RepositoryResult<RowOutcome> {
        let category_id = resolver
            .resolve_category_id(candidate.category.as_deref())
            .await?;

        let product = self
            .catalog_repo
            .insert_product(NewProduct {
                name: candidate.name,
                description: candidate.description,
                price: candidate.price,
                stock: candidate.stock,
                category_id,
            })
            .await?;

        Ok(RowOutcome::Accepted(product.id))
    }

    /// 生成差异报告，按策略处理写入失败
    async fn finalize(
        &self,
        format: SourceFormat,
        mut summary: ImportSummary,
        entries: Vec<ReportEntry>,
    ) -> ImportResult<ImportSummary> {
        if entries.is_empty() {
            return Ok(summary);
        }

        let generator = ReportGenerator::new(self.settings.csv_delimiter);
        match generator.generate(&self.report_store, format, &entries).await {
            Ok(report_id) => summary.error_report_id = Some(report_id),
            Err(e) if !self.settings.fail_on_report_error => {
                // 导入结果不受报告写入影响
                error!(error = %e, "差异报告写入失败，汇总不带报告标识");
            }
            Err(e) => return Err(e),
        }

        Ok(summary)
    }
}

#[async_trait]
impl<R, S> ProductImporter for ProductImporterImpl<R, S>
where
    R: CatalogRepository,
    S: ReportStore,
{
    #[instrument(skip(self, format, reader), fields(format = %format))]
    async fn import<Rd>(&self, format: SourceFormat, reader: Rd) -> ImportResult<ImportSummary>
    where
        Rd: Read + Seek + Send + 'static,
    {
        let start_time = Instant::now();
        info!("开始导入商品数据");

        // === 步骤 1: 打开行流（文件级错误在此终止） ===
        let rows = decode_rows(format, reader, self.settings.csv_delimiter).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;

        let mapper = FieldMapper::for_format(format, self.settings.csv_delimiter);
        let resolver = CatalogResolver::new(&self.catalog_repo);
        let mut accumulator = OutcomeAccumulator::default();

        // === 步骤 2: 逐行处理 ===
        for row in rows {
            let row = row?;
            let index = row.index;
            let outcome = self.process_row(&mapper, &resolver, row).await;
            debug!(row = index, outcome = ?outcome, "行处理完成");
            accumulator.record(outcome);
        }

        // === 步骤 3: 汇总 + 报告 ===
        let (summary, entries) = accumulator.into_summary();
        let summary = self.finalize(format, summary, entries).await?;

        info!(
            success = summary.success_count,
            errors = summary.error_count,
            skipped = summary.skipped_count,
            report_id = ?summary.error_report_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "商品数据导入完成"
        );

        Ok(summary)
    }
}
