// ==========================================
// 商品目录导入 - 导入器 Trait
// ==========================================
// 职责: 定义商品批量导入接口（不包含实现）
// ==========================================

use crate::domain::import::ImportSummary;
use crate::domain::types::SourceFormat;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::detect_format;
use async_trait::async_trait;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

// ==========================================
// ProductImporter Trait
// ==========================================
// 用途: 商品批量导入主接口
// 实现者: ProductImporterImpl
#[async_trait]
pub trait ProductImporter: Send + Sync {
    /// 从文件流导入商品
    ///
    /// # 参数
    /// - format: 来源格式（由调用入口决定，不做嗅探）
    /// - reader: 文件流（按需读取，不整体载入内存）
    ///
    /// # 返回
    /// - Ok(ImportSummary): 成功/错误/跳过计数 + 可选报告标识
    /// - Err: 文件无效（未处理任何行）或流读取中断
    ///
    /// # 导入流程
    /// 1. 行解码（跳过表头）
    /// 2. 字段映射与校验
    /// 3. 去重 + 分类解析
    /// 4. 落库（逐行独立，不回滚）
    /// 5. 存在 Skipped/Rejected 时生成差异报告
    async fn import<R>(&self, format: SourceFormat, reader: R) -> ImportResult<ImportSummary>
    where
        R: Read + Seek + Send + 'static;

    /// 从本地文件导入（按扩展名判断格式）
    async fn import_file<P>(&self, file_path: P) -> ImportResult<ImportSummary>
    where
        P: AsRef<Path> + Send,
    {
        let format = detect_format(file_path.as_ref())?;
        let file = File::open(file_path.as_ref())?;
        self.import(format, file).await
    }
}
