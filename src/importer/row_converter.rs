// ==========================================
// 通用表格数据导入器 - 行转换器
// ==========================================
// 职责: 把物理数据行按列关联表转换为逻辑记录
// 规则: trim → 空值归一 → 必填校验 → 按类型转换
// 红线: 必填列为空即整体失败,不做逐行跳过
// ==========================================

use crate::domain::{CellValue, ColumnSpec, ColumnType, Record, Schema};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_resolver::ColumnIndexMap;
use crate::importer::table_importer_trait::LocaleDateParser;

// ==========================================
// RowConverter - 行转换器
// ==========================================
// 持有一次导入期间不变的上下文: 列配置、列关联表、
// 真值集合与日期解析协作方
pub struct RowConverter<'a> {
    schema: &'a Schema,
    columns: &'a ColumnIndexMap,
    true_values: &'a [String],
    date_parser: &'a dyn LocaleDateParser,
}

impl<'a> RowConverter<'a> {
    /// 创建行转换器
    ///
    /// # 参数
    /// - schema: 列配置 (调用方保证与 columns 来自同一次解析)
    /// - columns: 表头解析产出的列关联表
    /// - true_values: 布尔真值集合 (已统一为大写)
    /// - date_parser: 本地化日期解析协作方
    pub fn new(
        schema: &'a Schema,
        columns: &'a ColumnIndexMap,
        true_values: &'a [String],
        date_parser: &'a dyn LocaleDateParser,
    ) -> Self {
        Self {
            schema,
            columns,
            true_values,
            date_parser,
        }
    }

    /// 转换一行物理数据
    ///
    /// 仅处理列关联表中实际定位到的逻辑列;未定位的列
    /// 不出现在产出记录中。行短于物理下标按空值处理。
    ///
    /// # 参数
    /// - row: 物理行 (单元格已规范化为 UTF-8)
    /// - row_number: 行号 (表头为 1,数据行从 2 起)
    ///
    /// # 返回
    /// - Ok(Record): 逻辑记录,列序与配置一致
    /// - Err(MissingValue): 必填列为空 (整体失败)
    /// - Err(DateParseError): 日期协作方解析失败
    pub fn convert(&self, row: &[String], row_number: usize) -> ImportResult<Record> {
        let mut record = Record::new();

        for (name, index) in self.columns.entries() {
            let spec = self.schema.get(name).ok_or_else(|| {
                ImportError::InternalError(format!("列关联表引用了未配置的逻辑列: {}", name))
            })?;

            // 越界取值与全空白取值统一归一为空
            let raw = row
                .get(index)
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty());

            if spec.mandatory && raw.is_none() {
                return Err(ImportError::MissingValue {
                    column: name.to_string(),
                    row: row_number,
                });
            }

            let value = self.coerce(spec, raw, row_number)?;
            record.push(name, value);
        }

        Ok(record)
    }

    /// 按列类型转换单元格取值
    fn coerce(
        &self,
        spec: &ColumnSpec,
        raw: Option<&str>,
        row_number: usize,
    ) -> ImportResult<CellValue> {
        let value = match spec.column_type {
            ColumnType::Integer => CellValue::Integer(raw.map(coerce_integer).unwrap_or(0)),
            ColumnType::Float => CellValue::Float(raw.map(coerce_float).unwrap_or(0.0)),
            ColumnType::Boolean => {
                // 空值是 false 而非空,布尔列永远有取值
                let truthy = raw
                    .map(|cell| self.true_values.contains(&cell.to_uppercase()))
                    .unwrap_or(false);
                CellValue::Boolean(truthy)
            }
            ColumnType::Date => match raw {
                None => CellValue::Null,
                Some(cell) => {
                    let (year, month, day) =
                        self.date_parser.parse_localized_date(cell).map_err(|_| {
                            ImportError::DateParseError {
                                row: row_number,
                                column: spec.title.clone(),
                                value: cell.to_string(),
                            }
                        })?;
                    CellValue::Date(format!("{:04}-{:02}-{:02}", year, month, day))
                }
            },
            ColumnType::String => coerce_string(spec, raw),
        };

        Ok(value)
    }
}

/// 宽松整数转换: 取前导数字串解析,其余一律得 0
///
/// 遗留兼容行为,非数字输入不报错而是得 0;
/// 需要严格校验的调用方应在导入前预校验。
/// 超出 i64 范围时按符号饱和。
pub fn coerce_integer(value: &str) -> i64 {
    let bytes = value.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }

    let prefix = &value[..end];
    prefix.parse::<i64>().unwrap_or_else(|_| {
        // 前缀只含符号与数字,解析失败即溢出
        if prefix.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// 宽松浮点转换: 取前导数字串 (含小数与指数) 解析,其余得 0.0
///
/// 与整数转换同属遗留兼容行为。
pub fn coerce_float(value: &str) -> f64 {
    let bytes = value.as_bytes();
    let mut end = 0;
    let mut has_digits = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        has_digits = true;
    }

    // 小数部分
    if end < bytes.len() && bytes[end] == b'.' {
        let mut cursor = end + 1;
        let mut frac_digits = false;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
            frac_digits = true;
        }
        if has_digits || frac_digits {
            end = cursor;
            has_digits = has_digits || frac_digits;
        }
    }

    if !has_digits {
        return 0.0;
    }

    // 指数部分 (至少跟一位数字才纳入)
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let exponent_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exponent_start {
            end = cursor;
        }
    }

    value[..end].parse::<f64>().unwrap_or(0.0)
}

/// 文本转换: 应用填充与截断规则
///
/// 设置了 max_length 与 filler 时,先把 filler 整体追加
/// max_length 次再截断 —— 遗留实现就是这个顺序,为保证
/// 产出逐字节一致而原样保留。截断按字符计数而非字节。
fn coerce_string(spec: &ColumnSpec, raw: Option<&str>) -> CellValue {
    match spec.max_length {
        None => raw
            .map(|cell| CellValue::Text(cell.to_string()))
            .unwrap_or(CellValue::Null),
        Some(max_length) => {
            let mut value = raw.unwrap_or("").to_string();
            if let Some(filler) = &spec.filler {
                value.push_str(&filler.repeat(max_length));
            }
            CellValue::Text(value.chars().take(max_length).collect())
        }
    }
}
