// ==========================================
// 通用表格数据导入器 - 行读取器实现
// ==========================================
// 职责: 把具体文件格式抽象为"单元格文本的行序列"
// 支持: CSV/文本 (分隔符自动检测), Excel (.xls/.xlsx), 内存行
// ==========================================

use crate::importer::encoding::normalize_to_utf8;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_detector::{
    MIME_CSV, MIME_EXCEL, MIME_EXCEL_OOXML, MIME_PLAIN_TEXT,
};
use crate::importer::table_importer_trait::RowSource;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// 候选分隔符,检测顺序即优先级 (分号为默认)
const SEPARATORS: [u8; 2] = [b';', b','];

// ==========================================
// CsvRowSource - CSV/文本行读取器
// ==========================================
// 打开时窥视首行原始字节做分隔符检测,之后回绕文件
// 交给 csv 读取器;每个单元格经编码规范化后产出
pub struct CsvRowSource {
    reader: csv::Reader<File>,
    record: csv::ByteRecord,
    delimiter: u8,
}

impl CsvRowSource {
    /// 打开 CSV/文本文件
    ///
    /// 分隔符检测: 统计首行中各候选分隔符的出现次数,
    /// 默认取分号,仅当逗号严格更多时才换用逗号。
    pub fn open<P: AsRef<Path>>(path: P) -> ImportResult<CsvRowSource> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut file = File::open(path)?;
        let delimiter = detect_delimiter(&mut file)?;
        file.seek(SeekFrom::Start(0))?;

        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(file);

        Ok(CsvRowSource {
            reader,
            record: csv::ByteRecord::new(),
            delimiter,
        })
    }

    /// 检测到的分隔符
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl RowSource for CsvRowSource {
    fn next_row(&mut self) -> Option<ImportResult<Vec<String>>> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self.record.iter().map(normalize_to_utf8).collect())),
            Ok(false) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// 统计首行字节,选出分隔符
fn detect_delimiter(file: &mut File) -> ImportResult<u8> {
    let mut first_line = Vec::new();
    BufReader::new(&mut *file).read_until(b'\n', &mut first_line)?;

    let mut delimiter = SEPARATORS[0];
    let mut best_count = count_bytes(&first_line, delimiter);
    for candidate in &SEPARATORS[1..] {
        let count = count_bytes(&first_line, *candidate);
        if count > best_count {
            best_count = count;
            delimiter = *candidate;
        }
    }

    Ok(delimiter)
}

fn count_bytes(line: &[u8], target: u8) -> usize {
    line.iter().filter(|byte| **byte == target).count()
}

// ==========================================
// ExcelRowSource - Excel 行读取器
// ==========================================
// 仅读第一个工作表;无工作表或空表按空行序列处理
pub struct ExcelRowSource {
    rows: std::vec::IntoIter<Vec<String>>,
}

impl ExcelRowSource {
    /// 打开 Excel 文件 (.xls 二进制与 .xlsx 容器均可)
    pub fn open<P: AsRef<Path>>(path: P) -> ImportResult<ExcelRowSource> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 只读第一个工作表;无工作表按空行序列处理
        let Some(range) = workbook.worksheet_range_at(0) else {
            return Ok(ExcelRowSource {
                rows: Vec::new().into_iter(),
            });
        };
        let range = range?;

        // 全空白行不产出
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|cells| cells.iter().map(|cell| cell.to_string()).collect())
            .filter(|cells: &Vec<String>| cells.iter().any(|value| !value.trim().is_empty()))
            .collect();

        Ok(ExcelRowSource {
            rows: rows.into_iter(),
        })
    }
}

impl RowSource for ExcelRowSource {
    fn next_row(&mut self) -> Option<ImportResult<Vec<String>>> {
        self.rows.next().map(Ok)
    }
}

// ==========================================
// MemoryRowSource - 内存行读取器
// ==========================================
// 用途: 测试与已解析数据的嵌入式导入
pub struct MemoryRowSource {
    rows: std::vec::IntoIter<Vec<String>>,
}

impl MemoryRowSource {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl RowSource for MemoryRowSource {
    fn next_row(&mut self) -> Option<ImportResult<Vec<String>>> {
        self.rows.next().map(Ok)
    }
}

/// 按 MIME 类型分派行读取器
///
/// # 返回
/// - Ok(Box<dyn RowSource>): CSV 或 Excel 行读取器
/// - Err(UnsupportedFormat): 既不是文本表格也不是 Excel
pub fn open_row_source(path: &Path, mime_type: &str) -> ImportResult<Box<dyn RowSource>> {
    match mime_type {
        MIME_CSV | MIME_PLAIN_TEXT | "application/csv" | "text/comma-separated-values" => {
            Ok(Box::new(CsvRowSource::open(path)?))
        }
        MIME_EXCEL | MIME_EXCEL_OOXML | "application/excel" | "application/x-ole-storage" => {
            Ok(Box::new(ExcelRowSource::open(path)?))
        }
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn collect_rows(source: &mut dyn RowSource) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        while let Some(row) = source.next_row() {
            rows.push(row.unwrap());
        }
        rows
    }

    #[test]
    fn test_csv_semicolon_default() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Name;Age").unwrap();
        writeln!(file, "Alice;30").unwrap();

        let mut source = CsvRowSource::open(file.path()).unwrap();
        assert_eq!(source.delimiter(), b';');

        let rows = collect_rows(&mut source);
        assert_eq!(rows, vec![vec!["Name", "Age"], vec!["Alice", "30"]]);
    }

    #[test]
    fn test_csv_comma_wins_when_strictly_more() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Name,Age,City").unwrap();
        writeln!(file, "Alice,30,Paris").unwrap();

        let mut source = CsvRowSource::open(file.path()).unwrap();
        assert_eq!(source.delimiter(), b',');

        let rows = collect_rows(&mut source);
        assert_eq!(rows[0], vec!["Name", "Age", "City"]);
    }

    #[test]
    fn test_csv_mixed_line_keeps_majority() {
        // "a;b,c;d;e": 3 个分号对 1 个逗号
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;b,c;d;e").unwrap();

        let mut source = CsvRowSource::open(file.path()).unwrap();
        assert_eq!(source.delimiter(), b';');

        let rows = collect_rows(&mut source);
        assert_eq!(rows[0], vec!["a", "b,c", "d", "e"]);
    }

    #[test]
    fn test_csv_tie_keeps_semicolon() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;b,c").unwrap();

        let source = CsvRowSource::open(file.path()).unwrap();
        assert_eq!(source.delimiter(), b';');
    }

    #[test]
    fn test_csv_latin1_cells_normalized() {
        let mut file = NamedTempFile::new().unwrap();
        // "Prénom;Âge" 的 Latin-1 字节
        file.write_all(&[b'P', b'r', 0xE9, b'n', b'o', b'm', b';', 0xC2, b'g', b'e', b'\n'])
            .unwrap();
        file.write_all(b"Alice;30\n").unwrap();

        let mut source = CsvRowSource::open(file.path()).unwrap();
        let rows = collect_rows(&mut source);
        assert_eq!(rows[0], vec!["Prénom", "Âge"]);
    }

    #[test]
    fn test_csv_flexible_row_lengths() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;b;c").unwrap();
        writeln!(file, "1;2").unwrap();
        writeln!(file, "1;2;3;4").unwrap();

        let mut source = CsvRowSource::open(file.path()).unwrap();
        let rows = collect_rows(&mut source);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_csv_missing_file() {
        let result = CsvRowSource::open(Path::new("no_such_file.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let mut source = CsvRowSource::open(file.path()).unwrap();
        assert!(source.next_row().is_none());
    }

    #[test]
    fn test_excel_open_rejects_non_excel_content() {
        // 底层解析错误经 From<calamine::Error> 统一为 ExcelParseError
        let mut file = Builder::new().suffix(".xls").tempfile().unwrap();
        writeln!(file, "not a spreadsheet").unwrap();

        let result = ExcelRowSource::open(file.path());
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_excel_missing_file() {
        let result = ExcelRowSource::open(Path::new("no_such_file.xlsx"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_memory_source_forward_only() {
        let mut source = MemoryRowSource::new(vec![
            vec!["Name".to_string()],
            vec!["Alice".to_string()],
        ]);

        assert_eq!(source.next_row().unwrap().unwrap(), vec!["Name"]);
        assert_eq!(source.next_row().unwrap().unwrap(), vec!["Alice"]);
        assert!(source.next_row().is_none());
        assert!(source.next_row().is_none());
    }

    #[test]
    fn test_dispatch_rejects_unknown_mime() {
        let file = NamedTempFile::new().unwrap();
        let result = open_row_source(file.path(), "application/octet-stream");
        assert!(matches!(
            result,
            Err(ImportError::UnsupportedFormat(mime)) if mime == "application/octet-stream"
        ));
    }

    #[test]
    fn test_dispatch_csv_family() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;b").unwrap();

        for mime in ["text/csv", "text/plain", "application/csv"] {
            let mut source = open_row_source(file.path(), mime).unwrap();
            assert_eq!(source.next_row().unwrap().unwrap(), vec!["a", "b"]);
        }
    }
}
