// ==========================================
// 通用表格数据导入器 - 领域模型层
// ==========================================
// 职责: 定义列配置、单元格类型值与记录结构
// 红线: 不含文件读取逻辑,不含转换流程逻辑
// ==========================================

pub mod record;
pub mod schema;

// 重导出核心类型
pub use record::{CellValue, ImportReport, Record};
pub use schema::{ColumnConfig, ColumnSpec, ColumnType, RawColumnSpec, Schema};
