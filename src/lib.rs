// ==========================================
// 通用表格数据导入器 - 核心库
// ==========================================
// 职责: 按列配置把 CSV/Excel 表格文件转换为结构化记录
// 能力: 表头按标题定位 / 列类型转换 / 必填校验 / 分隔符自动检测
// 定位: 嵌入式库 (无网络, 无持久化, 错误呈现交由调用方)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 列配置与记录类型
pub mod domain;

// 导入层 - 文件读取与转换流程
pub mod importer;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, ColumnConfig, ColumnSpec, ColumnType, ImportReport, RawColumnSpec, Record, Schema,
};

// 导入层实现
pub use importer::{
    coerce_float, coerce_integer, normalize_to_utf8, open_row_source, resolve_columns,
    ColumnIndexMap, CsvRowSource, ExcelRowSource, FileTypeDetector, ImportError, ImportResult,
    LocalizedDateParser, MemoryRowSource, RowConverter, TableImporterImpl,
};

// Trait 接口
pub use importer::{LocaleDateParser, MimeTypeDetector, RowSource, TableImporter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "通用表格数据导入器";

// ==========================================
// 预编译检查
// ==========================================
