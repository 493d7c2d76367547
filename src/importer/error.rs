// ==========================================
// 通用表格数据导入器 - 导入模块错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// 约定: 错误只携带结构化上下文,呈现交由调用方
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv/.txt）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 配置错误 (仅在 Schema 构建期抛出) =====
    #[error("配置无效 (列 {column}): 缺少表头标题")]
    MissingColumnTitle { column: String },

    #[error("配置无效 (列 {column}): 取值必须是标题字符串或结构化配置")]
    InvalidColumnSpec { column: String },

    #[error("配置解析失败: {0}")]
    ConfigParseError(String),

    // ===== 表头解析错误 =====
    #[error("表头列缺失: {column}")]
    MissingColumn { column: String },

    #[error("未找到任何匹配的表头列")]
    NoColumnsFound,

    // ===== 数据行错误 =====
    #[error("必填列为空 (行 {row}, 列 {column})")]
    MissingValue { column: String, row: usize },

    #[error("日期解析失败 (行 {row}, 列 {column}): {value}")]
    DateParseError {
        row: usize,
        column: String,
        value: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
