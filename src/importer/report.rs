// ==========================================
// 商品目录导入 - 差异报告生成
// ==========================================
// 职责: 将 Skipped / Rejected 条目序列化为两列 CSV（Type,Message）并写入报告存储
// 格式:
// - 表头 Type,Message
// - 先全部 ERROR，再全部 SKIPPED（各自保持行顺序）
// - 消息中的分隔符替换为安全字符，换行替换为空格，保证可被同一分隔格式重新解析
// ==========================================

use crate::domain::import::ReportEntry;
use crate::domain::types::{ReportKind, SourceFormat};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::report_store::ReportStore;
use csv::{QuoteStyle, WriterBuilder};
use tracing::info;
use uuid::Uuid;

pub const REPORT_HEADER: [&str; 2] = ["Type", "Message"];

pub struct ReportGenerator {
    delimiter: char,
}

impl ReportGenerator {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    fn substitute(&self) -> char {
        if self.delimiter == ';' {
            ','
        } else {
            ';'
        }
    }

    fn sanitize(&self, message: &str) -> String {
        let substitute = self.substitute();
        message
            .chars()
            .map(|c| match c {
                '\r' | '\n' => ' ',
                c if c == self.delimiter => substitute,
                c => c,
            })
            .collect()
    }

    /// 渲染报告文本
    pub fn render(&self, entries: &[ReportEntry]) -> ImportResult<String> {
        let delimiter = u8::try_from(self.delimiter)
            .map_err(|_| ImportError::ReportWrite(format!("分隔符必须是 ASCII 字符: {:?}", self.delimiter)))?;

        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Never)
            .from_writer(Vec::new());

        writer
            .write_record(REPORT_HEADER)
            .map_err(|e| ImportError::ReportWrite(e.to_string()))?;

        let ordered = [ReportKind::Error, ReportKind::Skipped]
            .into_iter()
            .flat_map(|kind| entries.iter().filter(move |entry| entry.kind == kind));
        for entry in ordered {
            writer
                .write_record([entry.kind.as_str(), self.sanitize(&entry.message).as_str()])
                .map_err(|e| ImportError::ReportWrite(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ImportError::ReportWrite(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ImportError::ReportWrite(e.to_string()))
    }

    /// 生成报告并写入存储
    ///
    /// # 返回
    /// - Ok(String): 新生成的报告标识（UUID v4，不检查冲突）
    /// - Err(ReportWrite): 渲染或写入失败
    pub async fn generate<S: ReportStore + ?Sized>(
        &self,
        store: &S,
        origin: SourceFormat,
        entries: &[ReportEntry],
    ) -> ImportResult<String> {
        let id = Uuid::new_v4().to_string();
        let content = self.render(entries)?;

        store
            .store(&id, origin, &content)
            .await
            .map_err(|e| ImportError::ReportWrite(e.to_string()))?;

        info!(report_id = %id, entries = entries.len(), origin = %origin, "差异报告已生成");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: ReportKind, message: &str) -> ReportEntry {
        ReportEntry {
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_render_orders_errors_before_skipped() {
        let generator = ReportGenerator::new(',');
        let text = generator
            .render(&[
                entry(ReportKind::Skipped, "Row 3: Widget | Duplicate (SKIPPED)"),
                entry(ReportKind::Error, "Row 4: Bad | Error: price parse error"),
            ])
            .unwrap();

        assert_eq!(
            text,
            "Type,Message\n\
             ERROR,Row 4: Bad | Error: price parse error\n\
             SKIPPED,Row 3: Widget | Duplicate (SKIPPED)\n"
        );
    }

    #[test]
    fn test_render_replaces_separator_and_newlines() {
        let generator = ReportGenerator::new(',');
        let text = generator
            .render(&[entry(
                ReportKind::Error,
                "Row 4: Bad,notanumber,X,1 | Error: price\nparse error",
            )])
            .unwrap();

        let line = text.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "ERROR,Row 4: Bad;notanumber;X;1 | Error: price parse error"
        );
        // 每行恰好两列
        for line in text.lines() {
            assert_eq!(line.split(',').count(), 2);
        }
    }

    #[test]
    fn test_render_with_semicolon_delimiter() {
        let generator = ReportGenerator::new(';');
        let text = generator
            .render(&[entry(ReportKind::Skipped, "a;b")])
            .unwrap();

        assert_eq!(text, "Type;Message\nSKIPPED;a,b\n");
    }

    #[test]
    fn test_render_does_not_quote() {
        let generator = ReportGenerator::new(',');
        let text = generator
            .render(&[entry(ReportKind::Error, "Row 2: \"quoted\" | Error: x")])
            .unwrap();

        assert!(text.contains("ERROR,Row 2: \"quoted\" | Error: x"));
    }
}
