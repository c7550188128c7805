// ==========================================
// 商品目录导入 - 行解码器
// ==========================================
// 职责: 原始文件流 → RawRow 序列（惰性、有限、不可重启）
// 支持: CSV (固定分隔符，不支持引号/转义) / Excel (.xlsx，仅第一个工作表)
// 约束:
// - 第一行固定视为表头并跳过
// - 容器级错误（损坏的 xlsx / 不可读的流）在产出任何行之前失败
// ==========================================

use crate::domain::import::RawRow;
use crate::domain::types::SourceFormat;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, DataRef, Reader, Xlsx};
use csv::{ByteRecordsIntoIter, ReaderBuilder};
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;

/// 行流（每次调用解码一次，不可重启）
pub type RowStream = Box<dyn Iterator<Item = ImportResult<RawRow>> + Send>;

// ==========================================
// CellValue - 电子表格单元格值
// ==========================================
// 显式区分文本/数值/空/其它，转换规则集中在 to_field_string
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
    Other(String),
}

impl CellValue {
    /// 转换为字段字符串
    ///
    /// - 文本: 去首尾空白
    /// - 数值: 只保留整数部分（向零截断，小数精度丢失）
    /// - 空: ""
    /// - 其它: 通用字符串形式，去首尾空白
    pub fn to_field_string(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.is_finite() {
                    (n.trunc() as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            CellValue::Empty => String::new(),
            CellValue::Other(s) => s.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Empty => CellValue::Empty,
            other => CellValue::Other(other.to_string()),
        }
    }
}

impl From<&DataRef<'_>> for CellValue {
    fn from(data: &DataRef<'_>) -> Self {
        match data {
            DataRef::String(s) => CellValue::Text(s.clone()),
            DataRef::SharedString(s) => CellValue::Text(s.to_string()),
            DataRef::Float(f) => CellValue::Number(*f),
            DataRef::Int(i) => CellValue::Number(*i as f64),
            DataRef::Empty => CellValue::Empty,
            other => CellValue::from(&Data::from(other.clone())),
        }
    }
}

// ==========================================
// CsvRowDecoder - CSV 行解码
// ==========================================
// 行号取源文件行号（表头为第 1 行）；空行由 csv 解析器忽略
pub struct CsvRowDecoder<R> {
    records: ByteRecordsIntoIter<R>,
}

impl<R: Read> CsvRowDecoder<R> {
    /// 创建解码器并立即读取表头
    ///
    /// # 返回
    /// - Err(InvalidFile): 流不可读
    pub fn new(reader: R, delimiter: char) -> ImportResult<Self> {
        let delimiter = u8::try_from(delimiter)
            .map_err(|_| ImportError::InvalidFile(format!("分隔符必须是 ASCII 字符: {:?}", delimiter)))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .quoting(false) // 不支持引号：字段内的分隔符会错列
            .delimiter(delimiter)
            .from_reader(reader);

        reader
            .byte_headers()
            .map_err(|e| ImportError::InvalidFile(format!("CSV 表头读取失败: {}", e)))?;

        Ok(Self {
            records: reader.into_byte_records(),
        })
    }
}

impl<R: Read> Iterator for CsvRowDecoder<R> {
    type Item = ImportResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let index = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        // 非 UTF-8 字节按替换字符处理，不中断整个文件
        let cells = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();

        Some(Ok(RawRow::new(index, cells)))
    }
}

// ==========================================
// ExcelRowDecoder - Excel 行解码
// ==========================================
// 行号取工作表行号（1 起）；完全空白的行跳过
// 工作表按单元格流式读取（不加载整个 Range），由独立线程解码，
// 通过有界通道交给消费方，缓冲满时解码线程阻塞
pub struct ExcelRowDecoder {
    rows: Receiver<ImportResult<RawRow>>,
}

/// 解码线程最多领先消费方的行数
const ROW_BUFFER: usize = 64;

impl ExcelRowDecoder {
    /// 打开工作簿并定位第一个工作表
    ///
    /// # 返回
    /// - Err(InvalidFile): 容器损坏 / 无工作表
    pub fn new<R>(reader: R) -> ImportResult<Self>
    where
        R: Read + Seek + Send + 'static,
    {
        let (ready_tx, ready_rx) = sync_channel(1);
        let (row_tx, row_rx) = sync_channel(ROW_BUFFER);

        thread::Builder::new()
            .name("xlsx-row-decoder".to_string())
            .spawn(move || stream_first_sheet(reader, ready_tx, row_tx))
            .map_err(|e| ImportError::InternalError(format!("Excel 解码线程启动失败: {}", e)))?;

        // 容器级错误在产出任何行之前返回
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { rows: row_rx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ImportError::InternalError("Excel 解码线程意外退出".to_string())),
        }
    }
}

impl Iterator for ExcelRowDecoder {
    type Item = ImportResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        // 发送端关闭即工作表读完
        self.rows.recv().ok()
    }
}

/// 解码线程主体: 打开 → 报告就绪 → 逐单元格读取并按行组装
fn stream_first_sheet<R: Read + Seek>(
    reader: R,
    ready: SyncSender<ImportResult<()>>,
    rows: SyncSender<ImportResult<RawRow>>,
) {
    let mut workbook: Xlsx<R> = match Xlsx::new(reader) {
        Ok(workbook) => workbook,
        Err(e) => {
            let _ = ready.send(Err(ImportError::InvalidFile(format!("Excel 文件无法打开: {}", e))));
            return;
        }
    };

    let Some(sheet) = workbook.sheet_names().into_iter().next() else {
        let _ = ready.send(Err(ImportError::InvalidFile("Excel 文件无工作表".to_string())));
        return;
    };

    let mut cells = match workbook.worksheet_cells_reader(&sheet) {
        Ok(cells) => cells,
        Err(e) => {
            let _ = ready.send(Err(ImportError::InvalidFile(format!("工作表读取失败: {}", e))));
            return;
        }
    };

    if ready.send(Ok(())).is_err() {
        return;
    }

    let mut assembler = SheetRowAssembler::default();
    loop {
        let row = match cells.next_cell() {
            Ok(Some(cell)) => {
                let (row, col) = cell.get_position();
                assembler.push(row as usize, col as usize, CellValue::from(cell.get_value()))
            }
            Ok(None) => break,
            Err(e) => {
                let _ = rows.send(Err(e.into()));
                return;
            }
        };

        // 消费方已放弃（导入中断）时停止读取
        if let Some(row) = row {
            if rows.send(Ok(row)).is_err() {
                return;
            }
        }
    }

    if let Some(row) = assembler.finish() {
        let _ = rows.send(Ok(row));
    }
}

// ==========================================
// SheetRowAssembler - 单元格 → 行
// ==========================================
// 单元格按文档顺序到达（行优先）
// 第一个非空行为表头，只记录其宽度；数据行按表头宽度补齐空单元格
#[derive(Debug, Default)]
struct SheetRowAssembler {
    current: Option<(usize, Vec<CellValue>)>,
    header_width: Option<usize>,
}

impl SheetRowAssembler {
    /// 追加一个单元格（0 起行列号），换行时返回上一行
    fn push(&mut self, row: usize, col: usize, value: CellValue) -> Option<RawRow> {
        let row_changed = matches!(&self.current, Some((current, _)) if *current != row);
        let finished = if row_changed { self.take_row() } else { None };

        let (_, cells) = self.current.get_or_insert_with(|| (row, Vec::new()));
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;

        finished
    }

    /// 工作表结束，返回最后一行
    fn finish(&mut self) -> Option<RawRow> {
        self.take_row()
    }

    fn take_row(&mut self) -> Option<RawRow> {
        let (row, mut cells) = self.current.take()?;
        if cells.iter().all(CellValue::is_empty) {
            return None;
        }

        let Some(width) = self.header_width else {
            self.header_width = Some(cells.len());
            return None;
        };

        if cells.len() < width {
            cells.resize(width, CellValue::Empty);
        }
        let fields = cells.iter().map(CellValue::to_field_string).collect();
        Some(RawRow::new(row + 1, fields))
    }
}

// ==========================================
// 统一入口
// ==========================================

/// 按格式创建行流
///
/// # 参数
/// - format: 来源格式
/// - reader: 文件流
/// - delimiter: CSV 分隔符（Excel 忽略）
pub fn decode_rows<R>(format: SourceFormat, reader: R, delimiter: char) -> ImportResult<RowStream>
where
    R: Read + Seek + Send + 'static,
{
    match format {
        SourceFormat::Delimited => Ok(Box::new(CsvRowDecoder::new(reader, delimiter)?)),
        SourceFormat::Spreadsheet => Ok(Box::new(ExcelRowDecoder::new(reader)?)),
    }
}

/// 根据扩展名判断来源格式
pub fn detect_format<P: AsRef<Path>>(file_path: P) -> ImportResult<SourceFormat> {
    let ext = file_path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" | "txt" => Ok(SourceFormat::Delimited),
        "xlsx" => Ok(SourceFormat::Spreadsheet),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode_csv(text: &str) -> Vec<RawRow> {
        CsvRowDecoder::new(Cursor::new(text.as_bytes().to_vec()), ',')
            .unwrap()
            .collect::<ImportResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_csv_skips_header_and_numbers_rows_by_line() {
        let rows = decode_csv("Name,Price,Description,Stock\nWidget,9.99,A widget,10\nGadget,1,B,2\n");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[0].cells, vec!["Widget", "9.99", "A widget", "10"]);
        assert_eq!(rows[1].index, 3);
    }

    #[test]
    fn test_csv_quotes_are_not_interpreted() {
        let rows = decode_csv("Name,Price\n\"Big, red\",5\n");

        // 已知限制：字段内的分隔符会错列
        assert_eq!(rows[0].cells, vec!["\"Big", " red\"", "5"]);
    }

    #[test]
    fn test_csv_header_only_yields_nothing() {
        assert!(decode_csv("Name,Price,Description,Stock\n").is_empty());
        assert!(decode_csv("").is_empty());
    }

    #[test]
    fn test_csv_custom_delimiter() {
        let rows = CsvRowDecoder::new(Cursor::new(b"a;b\nx;1,5\n".to_vec()), ';')
            .unwrap()
            .collect::<ImportResult<Vec<_>>>()
            .unwrap();
        assert_eq!(rows[0].cells, vec!["x", "1,5"]);
    }

    #[test]
    fn test_cell_value_numeric_truncates_to_integer_part() {
        assert_eq!(CellValue::Number(9.99).to_field_string(), "9");
        assert_eq!(CellValue::Number(10.0).to_field_string(), "10");
        assert_eq!(CellValue::Number(-3.7).to_field_string(), "-3");
    }

    #[test]
    fn test_cell_value_text_and_other() {
        assert_eq!(CellValue::Text("  Shoes ".to_string()).to_field_string(), "Shoes");
        assert_eq!(CellValue::Empty.to_field_string(), "");
        assert_eq!(CellValue::from(&Data::Bool(true)).to_field_string(), "true");
        assert_eq!(CellValue::from(&Data::Int(42)), CellValue::Number(42.0));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_invalid_file() {
        let result = ExcelRowDecoder::new(Cursor::new(b"definitely not a zip".to_vec()));
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));
    }

    #[test]
    fn test_spreadsheet_without_sheets_is_invalid_file() {
        let mut buffer = Cursor::new(Vec::new());
        zip::ZipWriter::new(&mut buffer).finish().unwrap();
        buffer.set_position(0);

        let result = ExcelRowDecoder::new(buffer);
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_assembler_groups_cells_by_row_and_skips_header() {
        let mut assembler = SheetRowAssembler::default();

        // 表头在第 2 行（0 起为 1），A..C 三列
        assert!(assembler.push(1, 0, text("Name")).is_none());
        assert!(assembler.push(1, 1, text("SKU")).is_none());
        assert!(assembler.push(1, 2, text("Price")).is_none());
        assert!(assembler.push(2, 0, text("Cap")).is_none());
        assert!(assembler.push(2, 2, CellValue::Number(9.5)).is_none());

        // 进入下一行时吐出上一行
        let row = assembler.push(4, 1, text("orphan")).unwrap();
        assert_eq!(row.index, 3);
        assert_eq!(row.cells, vec!["Cap", "", "9"]);

        let last = assembler.finish().unwrap();
        assert_eq!(last.index, 5);
        assert_eq!(last.cells, vec!["", "orphan", ""]);
        assert!(assembler.finish().is_none());
    }

    #[test]
    fn test_assembler_ignores_rows_with_only_empty_cells() {
        let mut assembler = SheetRowAssembler::default();

        // 表头之前的空白单元格不算表头
        assert!(assembler.push(0, 0, CellValue::Empty).is_none());
        assert!(assembler.push(1, 0, text("Name")).is_none());
        assert!(assembler.push(2, 0, CellValue::Empty).is_none());
        assert!(assembler.push(2, 1, CellValue::Empty).is_none());
        assert!(assembler.push(3, 0, text("Hat")).is_none());

        let row = assembler.finish().unwrap();
        assert_eq!(row.index, 4);
        assert_eq!(row.cells, vec!["Hat"]);
    }

    #[test]
    fn test_cell_value_from_streamed_cell() {
        assert_eq!(
            CellValue::from(&DataRef::SharedString("Shoes")),
            CellValue::Text("Shoes".to_string())
        );
        assert_eq!(CellValue::from(&DataRef::Int(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from(&DataRef::Bool(false)).to_field_string(), "false");
        assert!(CellValue::from(&DataRef::Empty).is_empty());
    }

    #[test]
    fn test_detect_format_by_extension() {
        assert_eq!(detect_format("a/products.CSV").unwrap(), SourceFormat::Delimited);
        assert_eq!(detect_format("products.xlsx").unwrap(), SourceFormat::Spreadsheet);
        assert!(matches!(
            detect_format("products.pdf"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
