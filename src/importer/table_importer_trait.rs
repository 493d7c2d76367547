// ==========================================
// 通用表格数据导入器 - 导入 Trait
// ==========================================
// 职责: 定义导入流程的接口缝 (不包含实现)
// 协作方: 行读取器 / MIME 识别 / 本地化日期解析
// ==========================================

use crate::domain::ImportReport;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// TableImporter Trait
// ==========================================
// 用途: 表格导入主接口
// 实现者: TableImporterImpl
#[async_trait]
pub trait TableImporter: Send + Sync {
    /// 导入单个表格文件 (按 MIME 类型自动分派)
    ///
    /// # 参数
    /// - file_path: 文件路径 (.csv/.txt/.xls/.xlsx)
    ///
    /// # 返回
    /// - Ok(ImportReport): 批次信息与全部逻辑记录
    /// - Err: 文件错误、表头解析错误、数据行错误
    ///
    /// # 导入流程 (4 个阶段)
    /// 1. 识别文件类型 (MIME 协作方)
    /// 2. 构造行读取器 (CSV / Excel)
    /// 3. 核心导入 (表头解析 → 逐行转换,整体成功或整体失败)
    /// 4. 汇总导入报告
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P)
        -> ImportResult<ImportReport>;

    /// 按 CSV 格式导入文件 (跳过 MIME 识别)
    async fn import_csv_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportReport>;

    /// 按 Excel 格式导入文件 (跳过 MIME 识别)
    async fn import_excel_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportReport>;

    /// 批量导入多个文件 (并发执行)
    ///
    /// # 说明
    /// - 每个文件独立持有行读取器,共享只读列配置
    /// - 单个文件失败不影响其他文件
    /// - 结果按输入顺序返回
    async fn import_batch<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ImportResult<ImportReport>>;
}

// ==========================================
// RowSource Trait
// ==========================================
// 用途: 行读取器接口 (阶段 2)
// 实现者: CsvRowSource, ExcelRowSource, MemoryRowSource
// 语义: 仅向前消费一次,首行视为表头
pub trait RowSource: Send {
    /// 读取下一物理行
    ///
    /// # 返回
    /// - Some(Ok(row)): 一行单元格文本 (已规范化为 UTF-8)
    /// - Some(Err): 底层读取/解析错误
    /// - None: 行已耗尽
    fn next_row(&mut self) -> Option<ImportResult<Vec<String>>>;
}

// ==========================================
// MimeTypeDetector Trait
// ==========================================
// 用途: 文件类型识别协作方 (阶段 1)
// 实现者: FileTypeDetector
pub trait MimeTypeDetector: Send + Sync {
    /// 识别文件的 MIME 类型
    ///
    /// # 返回
    /// - Ok(String): MIME 类型字符串 (无法识别时为
    ///   application/octet-stream,由分派层拒绝)
    /// - Err: 文件不存在或读取失败
    fn detect(&self, path: &Path) -> ImportResult<String>;
}

// ==========================================
// LocaleDateParser Trait
// ==========================================
// 用途: 本地化日期解析协作方 (行转换阶段)
// 实现者: LocalizedDateParser
pub trait LocaleDateParser: Send + Sync {
    /// 按当前语言环境解析日期文本
    ///
    /// # 返回
    /// - Ok((年, 月, 日)): 解析出的日期分量
    /// - Err: 文本不符合任何已知格式
    fn parse_localized_date(&self, raw: &str) -> anyhow::Result<(i32, u32, u32)>;
}
