// ==========================================
// 通用表格数据导入器 - 记录类型定义
// ==========================================
// 职责: 单元格类型值 / 单行逻辑记录 / 文件级导入报告
// ==========================================

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

// ==========================================
// CellValue - 单元格类型值
// ==========================================
// 序列化格式: 无标签 (JSON 原生值)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Date(String), // 规范化日期 (YYYY-MM-DD)
    Text(String),
}

impl CellValue {
    /// 是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// 以文本读取 (Text 与 Date 变体)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            CellValue::Date(value) => Some(value),
            _ => None,
        }
    }

    /// 以整数读取
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// 以浮点数读取 (整数自动加宽)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(value) => Some(*value),
            CellValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// 以布尔读取
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(value) => write!(f, "{}", value),
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{}", value),
            CellValue::Date(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{}", value),
        }
    }
}

// ==========================================
// Record - 单行逻辑记录
// ==========================================
// 有序映射: 逻辑列名 → 类型值,保持列解析顺序
// 生命周期: 逐行创建,产出后不再修改
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// 创建空记录
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    /// 追加一列取值 (调用方保证列名不重复)
    pub fn push(&mut self, name: impl Into<String>, value: CellValue) {
        self.fields.push((name.into(), value));
    }

    /// 按逻辑列名读取
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// 按解析顺序遍历 (逻辑列名, 取值)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// 列数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否无任何列
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// 序列化为 JSON 对象,保持列顺序
impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ==========================================
// ImportReport - 文件级导入报告
// ==========================================
// 用途: 记录一次文件导入的批次信息与全部产出
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: String,           // 批次 ID (UUID)
    pub file_name: Option<String>,  // 源文件名
    pub mime_type: String,          // 识别出的 MIME 类型
    pub total_rows: usize,          // 数据行数 (不含表头)
    pub records: Vec<Record>,       // 结构化记录 (按行序)
    pub imported_at: DateTime<Utc>, // 导入完成时间
    pub elapsed_ms: u64,            // 导入耗时 (毫秒)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_accessors() {
        assert!(CellValue::Null.is_null());
        assert_eq!(CellValue::Text("abc".to_string()).as_str(), Some("abc"));
        assert_eq!(
            CellValue::Date("2025-01-20".to_string()).as_str(),
            Some("2025-01-20")
        );
        assert_eq!(CellValue::Integer(42).as_i64(), Some(42));
        assert_eq!(CellValue::Integer(42).as_f64(), Some(42.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(CellValue::Text("abc".to_string()).as_i64(), None);
    }

    #[test]
    fn test_record_order_and_get() {
        let mut record = Record::new();
        record.push("name", CellValue::Text("Alice".to_string()));
        record.push("age", CellValue::Integer(30));
        record.push("note", CellValue::Null);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("age"), Some(&CellValue::Integer(30)));
        assert_eq!(record.get("missing"), None);

        let keys: Vec<&str> = record.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["name", "age", "note"]);
    }

    #[test]
    fn test_record_serializes_as_json_object() {
        let mut record = Record::new();
        record.push("name", CellValue::Text("Alice".to_string()));
        record.push("age", CellValue::Integer(30));
        record.push("vip", CellValue::Boolean(false));
        record.push("score", CellValue::Float(9.5));
        record.push("note", CellValue::Null);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Alice",
                "age": 30,
                "vip": false,
                "score": 9.5,
                "note": null
            })
        );
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Integer(7).to_string(), "7");
        assert_eq!(CellValue::Boolean(true).to_string(), "true");
        assert_eq!(CellValue::Text("词条".to_string()).to_string(), "词条");
    }
}
