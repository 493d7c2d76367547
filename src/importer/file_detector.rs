// ==========================================
// 通用表格数据导入器 - 文件类型识别
// ==========================================
// 职责: MimeTypeDetector 协作方的默认实现
// 策略: 先看文件头魔数,再看扩展名,兜底 octet-stream
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::table_importer_trait::MimeTypeDetector;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// OLE 复合文档魔数 (遗留 .xls 二进制格式)
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// ZIP 魔数 (.xlsx 是 ZIP 容器)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// 无法识别时的兜底类型 (分派层会拒绝)
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

pub const MIME_CSV: &str = "text/csv";
pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_EXCEL: &str = "application/vnd.ms-excel";
pub const MIME_EXCEL_OOXML: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ==========================================
// FileTypeDetector - 默认文件类型识别实现
// ==========================================
pub struct FileTypeDetector;

impl MimeTypeDetector for FileTypeDetector {
    fn detect(&self, path: &Path) -> ImportResult<String> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 内容魔数优先: 扩展名可能与实际格式不符
        let mut header = [0u8; 8];
        let read = File::open(path)?.read(&mut header)?;

        if read >= OLE_MAGIC.len() && header[..OLE_MAGIC.len()] == OLE_MAGIC {
            return Ok(MIME_EXCEL.to_string());
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        if read >= ZIP_MAGIC.len() && header[..ZIP_MAGIC.len()] == ZIP_MAGIC && extension == "xlsx"
        {
            return Ok(MIME_EXCEL_OOXML.to_string());
        }

        let mime = match extension.as_str() {
            "csv" => MIME_CSV,
            "txt" => MIME_PLAIN_TEXT,
            "xls" => MIME_EXCEL,
            "xlsx" => MIME_EXCEL_OOXML,
            _ => MIME_OCTET_STREAM,
        };

        Ok(mime.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_detect_csv_by_extension() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a;b;c").unwrap();

        let mime = FileTypeDetector.detect(file.path()).unwrap();
        assert_eq!(mime, MIME_CSV);
    }

    #[test]
    fn test_detect_txt_by_extension() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "a;b;c").unwrap();

        let mime = FileTypeDetector.detect(file.path()).unwrap();
        assert_eq!(mime, MIME_PLAIN_TEXT);
    }

    #[test]
    fn test_detect_ole_magic_beats_extension() {
        // 扩展名是 .csv 但内容是 OLE 复合文档
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(&OLE_MAGIC).unwrap();
        file.write_all(&[0u8; 16]).unwrap();

        let mime = FileTypeDetector.detect(file.path()).unwrap();
        assert_eq!(mime, MIME_EXCEL);
    }

    #[test]
    fn test_detect_zip_with_xlsx_extension() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(&ZIP_MAGIC).unwrap();
        file.write_all(&[0u8; 16]).unwrap();

        let mime = FileTypeDetector.detect(file.path()).unwrap();
        assert_eq!(mime, MIME_EXCEL_OOXML);
    }

    #[test]
    fn test_detect_unknown_falls_back() {
        let mut file = Builder::new().suffix(".dat").tempfile().unwrap();
        writeln!(file, "whatever").unwrap();

        let mime = FileTypeDetector.detect(file.path()).unwrap();
        assert_eq!(mime, MIME_OCTET_STREAM);
    }

    #[test]
    fn test_detect_missing_file() {
        let result = FileTypeDetector.detect(Path::new("no_such_file.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
