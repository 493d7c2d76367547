// ==========================================
// 通用表格数据导入器 - 导入层
// ==========================================
// 职责: 文件读取、表头解析、行转换与流程编排
// 支持: CSV/文本, Excel, 内存行序列
// ==========================================

// 模块声明
pub mod date_locale;
pub mod encoding;
pub mod error;
pub mod file_detector;
pub mod header_resolver;
pub mod row_converter;
pub mod row_source;
pub mod table_importer;
pub mod table_importer_trait;

// 重导出核心类型
pub use date_locale::LocalizedDateParser;
pub use encoding::normalize_to_utf8;
pub use error::{ImportError, ImportResult};
pub use file_detector::FileTypeDetector;
pub use header_resolver::{resolve_columns, ColumnIndexMap};
pub use row_converter::{coerce_float, coerce_integer, RowConverter};
pub use row_source::{open_row_source, CsvRowSource, ExcelRowSource, MemoryRowSource};
pub use table_importer::TableImporterImpl;

// 重导出 Trait 接口
pub use table_importer_trait::{LocaleDateParser, MimeTypeDetector, RowSource, TableImporter};
