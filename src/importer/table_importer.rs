// ==========================================
// 通用表格数据导入器 - 导入流程实现
// ==========================================
// 职责: 整合导入流程,从文件到逻辑记录序列
// 流程: 识别类型 → 构造读取器 → 表头解析 → 逐行转换 → 汇总报告
// 红线: 单文件导入整体成功或整体失败,不产出部分结果
// ==========================================

use crate::domain::{ImportReport, Record, Schema};
use crate::i18n;
use crate::importer::date_locale::LocalizedDateParser;
use crate::importer::error::ImportResult;
use crate::importer::file_detector::{FileTypeDetector, MIME_CSV, MIME_EXCEL};
use crate::importer::header_resolver::resolve_columns;
use crate::importer::row_converter::RowConverter;
use crate::importer::row_source::{open_row_source, CsvRowSource, ExcelRowSource};
use crate::importer::table_importer_trait::{
    LocaleDateParser, MimeTypeDetector, RowSource, TableImporter,
};
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// TableImporterImpl - 表格导入器实现
// ==========================================
// 构建后不可变: 列配置与协作方在多次导入间复用,
// 并可在并发批量导入中只读共享
pub struct TableImporterImpl {
    // 列配置
    schema: Schema,

    // 布尔真值集合 (已统一为大写)
    true_values: Vec<String>,

    // 协作方
    mime_detector: Box<dyn MimeTypeDetector>,
    date_parser: Box<dyn LocaleDateParser>,
}

impl TableImporterImpl {
    /// 按默认协作方创建导入器
    ///
    /// 默认协作方: 魔数+扩展名文件识别,当前语言环境的
    /// 日期格式列表,以及含本地化真值记号的布尔真值集合。
    pub fn new(schema: Schema) -> Self {
        Self::with_collaborators(
            schema,
            Box::new(FileTypeDetector),
            Box::new(LocalizedDateParser::new()),
        )
    }

    /// 按显式协作方创建导入器
    ///
    /// # 参数
    /// - schema: 列配置
    /// - mime_detector: 文件类型识别协作方
    /// - date_parser: 本地化日期解析协作方
    pub fn with_collaborators(
        schema: Schema,
        mime_detector: Box<dyn MimeTypeDetector>,
        date_parser: Box<dyn LocaleDateParser>,
    ) -> Self {
        Self {
            schema,
            true_values: default_true_values(),
            mime_detector,
            date_parser,
        }
    }

    /// 替换布尔真值集合 (大小写不敏感,内部统一为大写)
    pub fn with_true_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.true_values = values
            .into_iter()
            .map(|value| value.as_ref().to_uppercase())
            .collect();
        self
    }

    /// 列配置
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 核心同步导入: 行序列 → 逻辑记录序列
    ///
    /// - 首行视为表头;行序列为空时产出空结果而非错误
    /// - 数据行号从 2 起 (表头为 1)
    /// - 任一行失败即整体失败,不返回部分结果
    pub fn import_rows(&self, source: &mut dyn RowSource) -> ImportResult<Vec<Record>> {
        let header = match source.next_row() {
            None => return Ok(Vec::new()),
            Some(row) => row?,
        };

        let columns = resolve_columns(&self.schema, &header)?;
        let converter = RowConverter::new(
            &self.schema,
            &columns,
            &self.true_values,
            self.date_parser.as_ref(),
        );

        let mut records = Vec::new();
        let mut row_number = 2;
        while let Some(row) = source.next_row() {
            let row = row?;
            records.push(converter.convert(&row, row_number)?);
            row_number += 1;
        }

        Ok(records)
    }

    /// 文件级导入: 行读取器 → 导入报告
    fn import_source(
        &self,
        file_path: &Path,
        mime_type: String,
        source: &mut dyn RowSource,
        batch_id: String,
        start_time: Instant,
    ) -> ImportResult<ImportReport> {
        // === 步骤 3: 核心导入 ===
        debug!("步骤 3: 表头解析与逐行转换");
        let records = self.import_rows(source)?;
        info!(total_rows = records.len(), "核心导入完成");

        // === 步骤 4: 汇总导入报告 ===
        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string());

        Ok(ImportReport {
            batch_id,
            file_name,
            mime_type,
            total_rows: records.len(),
            records,
            imported_at: Utc::now(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

/// 默认布尔真值集合: "1" / "TRUE" / "X" / "V" 加本地化真值记号
fn default_true_values() -> Vec<String> {
    let mut values: Vec<String> = ["1", "TRUE", "X", "V"]
        .iter()
        .map(|value| value.to_string())
        .collect();

    let localized = i18n::t("importer.true_value").to_uppercase();
    if !localized.is_empty() && !values.contains(&localized) {
        values.push(localized);
    }

    values
}

#[async_trait::async_trait]
impl TableImporter for TableImporterImpl {
    /// 导入单个表格文件 (按 MIME 类型自动分派)
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let path = file_path.as_ref();
        let path_str = path.to_str().unwrap_or("unknown");

        info!(batch_id = %batch_id, file_path = %path_str, "开始导入表格文件");

        // === 步骤 1: 识别文件类型 ===
        debug!("步骤 1: 识别文件类型");
        let mime_type = self.mime_detector.detect(path).map_err(|err| {
            error!(error = %err, "文件类型识别失败");
            err
        })?;
        info!(mime_type = %mime_type, "文件类型识别完成");

        // === 步骤 2: 构造行读取器 ===
        debug!("步骤 2: 构造行读取器");
        let mut source = open_row_source(path, &mime_type).map_err(|err| {
            error!(error = %err, "行读取器构造失败");
            err
        })?;

        let report = self.import_source(path, mime_type, source.as_mut(), batch_id, start_time)?;

        info!(
            batch_id = %report.batch_id,
            total_rows = report.total_rows,
            elapsed_ms = report.elapsed_ms,
            "表格文件导入完成"
        );

        Ok(report)
    }

    /// 按 CSV 格式导入文件 (跳过 MIME 识别)
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_csv_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let path = file_path.as_ref();

        info!(batch_id = %batch_id, file_path = %path.display(), "按 CSV 格式导入");

        let mut source = CsvRowSource::open(path)?;
        self.import_source(path, MIME_CSV.to_string(), &mut source, batch_id, start_time)
    }

    /// 按 Excel 格式导入文件 (跳过 MIME 识别)
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_excel_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let path = file_path.as_ref();

        info!(batch_id = %batch_id, file_path = %path.display(), "按 Excel 格式导入");

        let mut source = ExcelRowSource::open(path)?;
        self.import_source(
            path,
            MIME_EXCEL.to_string(),
            &mut source,
            batch_id,
            start_time,
        )
    }

    /// 批量导入多个文件 (并发执行)
    async fn import_batch<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ImportResult<ImportReport>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        // 为每个文件创建导入任务,各自持有独立的行读取器
        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().to_str().unwrap_or("unknown").to_string();
            async move {
                match self.import_file(path).await {
                    Ok(report) => {
                        info!(file = %path_str, total_rows = report.total_rows, "文件导入成功");
                        Ok(report)
                    }
                    Err(err) => {
                        error!(file = %path_str, error = %err, "文件导入失败");
                        Err(err)
                    }
                }
            }
        });

        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|result| result.is_ok()).count(),
            failed = results.iter().filter(|result| result.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}
