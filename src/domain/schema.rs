// ==========================================
// 通用表格数据导入器 - 列配置规范化
// ==========================================
// 职责: 把调用方的列映射配置规范化为列规格集合
// 输入: 逻辑列名 → 标题简写 或 结构化配置
// 红线: 构建后不可变,导入过程中不再做配置校验
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ==========================================
// 列类型 (Column Type)
// ==========================================
// 序列化格式: 小写 (与外部配置一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,  // 文本 (默认)
    Integer, // 整数
    Float,   // 浮点数
    Date,    // 日期 (经本地化解析协作方)
    Boolean, // 布尔 (真值集合匹配)
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::String
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Boolean => write!(f, "boolean"),
        }
    }
}

// ==========================================
// 原始列配置 (规范化前)
// ==========================================
// 两种书写形式:
// - 简写: "表头标题" (其余字段全部取默认值)
// - 结构化: { "title": "...", "type": "...", ... }
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnConfig {
    /// 简写形式: 仅给出表头标题
    Shorthand(String),
    /// 结构化形式: 标题加可选约束
    Detailed(RawColumnSpec),
}

impl From<&str> for ColumnConfig {
    fn from(title: &str) -> Self {
        ColumnConfig::Shorthand(title.to_string())
    }
}

impl From<String> for ColumnConfig {
    fn from(title: String) -> Self {
        ColumnConfig::Shorthand(title)
    }
}

impl From<RawColumnSpec> for ColumnConfig {
    fn from(raw: RawColumnSpec) -> Self {
        ColumnConfig::Detailed(raw)
    }
}

/// 结构化列配置的原始字段
///
/// 未给出的字段按默认值规范化,见 [`ColumnSpec`]。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawColumnSpec {
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub force_presence: bool,
    #[serde(default)]
    pub max_length: Option<i64>,
    #[serde(default)]
    pub filler: Option<String>,
}

// ==========================================
// 规范化列规格 (Column Spec)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub title: String,             // 表头标题 (匹配时忽略大小写与首尾空白)
    pub column_type: ColumnType,   // 列类型
    pub mandatory: bool,           // 每行取值必须非空
    pub force_presence: bool,      // 表头必须存在 (取值可为空)
    pub max_length: Option<usize>, // 文本截断长度 (仅正数生效)
    pub filler: Option<String>,    // 截断前的填充串 (仅非空生效)
}

// ==========================================
// Schema - 列配置集合
// ==========================================
// 有序映射: 逻辑列名 → 列规格,保持配置书写顺序
// 构建后不可变,可在多次导入间复用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, ColumnSpec)>,
}

impl Schema {
    /// 从 (逻辑列名, 原始配置) 序列构建
    ///
    /// 同名逻辑列后写覆盖先写,位置保持首次出现处。
    ///
    /// # 返回
    /// - Ok(Schema): 规范化后的列配置
    /// - Err(MissingColumnTitle): 某列缺少标题或标题为空白
    pub fn build<K, I>(entries: I) -> ImportResult<Schema>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ColumnConfig)>,
    {
        let mut columns: Vec<(String, ColumnSpec)> = Vec::new();

        for (key, config) in entries {
            let key = key.into();
            let spec = normalize_column(&key, config)?;
            match columns.iter_mut().find(|(name, _)| *name == key) {
                Some(slot) => slot.1 = spec,
                None => columns.push((key, spec)),
            }
        }

        Ok(Schema { columns })
    }

    /// 从 JSON 配置文本构建
    ///
    /// # 示例
    /// ```
    /// use tabular_import::domain::Schema;
    ///
    /// let schema = Schema::from_json_str(
    ///     r#"{ "email": "Email", "age": { "title": "Age", "type": "integer" } }"#,
    /// ).unwrap();
    /// assert_eq!(schema.len(), 2);
    /// ```
    pub fn from_json_str(config: &str) -> ImportResult<Schema> {
        let value: Value = serde_json::from_str(config)
            .map_err(|err| ImportError::ConfigParseError(err.to_string()))?;
        Schema::from_json_value(&value)
    }

    /// 从 JSON 配置值构建
    ///
    /// 顶层必须是对象;键序即列序 (启用 preserve_order)。
    pub fn from_json_value(config: &Value) -> ImportResult<Schema> {
        let object = match config {
            Value::Object(map) => map,
            _ => {
                return Err(ImportError::ConfigParseError(
                    "配置根节点必须是对象".to_string(),
                ))
            }
        };

        let mut entries: Vec<(String, ColumnConfig)> = Vec::new();
        for (key, value) in object {
            let config = serde_json::from_value::<ColumnConfig>(value.clone()).map_err(|_| {
                ImportError::InvalidColumnSpec {
                    column: key.clone(),
                }
            })?;
            entries.push((key.clone(), config));
        }

        Schema::build(entries)
    }

    /// 按逻辑列名查找列规格
    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, spec)| spec)
    }

    /// 按配置顺序遍历 (逻辑列名, 列规格)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSpec)> {
        self.columns.iter().map(|(key, spec)| (key.as_str(), spec))
    }

    /// 列数
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// 是否为空配置
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 规范化单列配置
///
/// 规则:
/// - 简写形式等价于只含 title 的结构化配置
/// - max_length 仅在大于 0 时保留
/// - filler 仅在非空时保留
/// - title 缺失或为空白时拒绝
fn normalize_column(name: &str, config: ColumnConfig) -> ImportResult<ColumnSpec> {
    let raw = match config {
        ColumnConfig::Shorthand(title) => RawColumnSpec {
            title: Some(title),
            ..Default::default()
        },
        ColumnConfig::Detailed(raw) => raw,
    };

    let title = match raw.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => {
            return Err(ImportError::MissingColumnTitle {
                column: name.to_string(),
            })
        }
    };

    Ok(ColumnSpec {
        title,
        column_type: raw.column_type,
        mandatory: raw.mandatory,
        force_presence: raw.force_presence,
        max_length: raw.max_length.filter(|len| *len > 0).map(|len| len as usize),
        filler: raw.filler.filter(|fill| !fill.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_defaults() {
        let schema = Schema::build([("email", ColumnConfig::from("Email"))]).unwrap();

        let spec = schema.get("email").unwrap();
        assert_eq!(spec.title, "Email");
        assert_eq!(spec.column_type, ColumnType::String);
        assert!(!spec.mandatory);
        assert!(!spec.force_presence);
        assert_eq!(spec.max_length, None);
        assert_eq!(spec.filler, None);
    }

    #[test]
    fn test_detailed_full() {
        let raw = RawColumnSpec {
            title: Some("Code".to_string()),
            column_type: ColumnType::String,
            mandatory: true,
            force_presence: true,
            max_length: Some(10),
            filler: Some("0".to_string()),
        };
        let schema = Schema::build([("code", ColumnConfig::from(raw))]).unwrap();

        let spec = schema.get("code").unwrap();
        assert!(spec.mandatory);
        assert!(spec.force_presence);
        assert_eq!(spec.max_length, Some(10));
        assert_eq!(spec.filler, Some("0".to_string()));
    }

    #[test]
    fn test_missing_title_rejected() {
        let raw = RawColumnSpec {
            column_type: ColumnType::Integer,
            ..Default::default()
        };
        let result = Schema::build([("age", ColumnConfig::from(raw))]);

        assert!(matches!(
            result,
            Err(ImportError::MissingColumnTitle { column }) if column == "age"
        ));
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = Schema::build([("name", ColumnConfig::from("   "))]);
        assert!(matches!(
            result,
            Err(ImportError::MissingColumnTitle { column }) if column == "name"
        ));
    }

    #[test]
    fn test_max_length_only_positive() {
        // 零与负数都按未设置处理
        for bad in [0, -5] {
            let raw = RawColumnSpec {
                title: Some("Code".to_string()),
                max_length: Some(bad),
                ..Default::default()
            };
            let schema = Schema::build([("code", ColumnConfig::from(raw))]).unwrap();
            assert_eq!(schema.get("code").unwrap().max_length, None);
        }
    }

    #[test]
    fn test_empty_filler_dropped() {
        let raw = RawColumnSpec {
            title: Some("Code".to_string()),
            max_length: Some(5),
            filler: Some(String::new()),
            ..Default::default()
        };
        let schema = Schema::build([("code", ColumnConfig::from(raw))]).unwrap();

        let spec = schema.get("code").unwrap();
        assert_eq!(spec.max_length, Some(5));
        assert_eq!(spec.filler, None);
    }

    #[test]
    fn test_duplicate_key_replaces_in_place() {
        let schema = Schema::build([
            ("name", ColumnConfig::from("Old Title")),
            ("age", ColumnConfig::from("Age")),
            ("name", ColumnConfig::from("New Title")),
        ])
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("name").unwrap().title, "New Title");
        // 位置保持首次出现处
        let keys: Vec<&str> = schema.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[test]
    fn test_from_json_str_mixed() {
        let schema = Schema::from_json_str(
            r#"{
                "email": "Email",
                "age": { "title": "Age", "type": "integer", "mandatory": true }
            }"#,
        )
        .unwrap();

        assert_eq!(schema.get("email").unwrap().column_type, ColumnType::String);
        let age = schema.get("age").unwrap();
        assert_eq!(age.column_type, ColumnType::Integer);
        assert!(age.mandatory);
    }

    #[test]
    fn test_from_json_preserves_order() {
        let schema = Schema::from_json_str(
            r#"{ "zeta": "Z", "alpha": "A", "midway": "M" }"#,
        )
        .unwrap();

        let keys: Vec<&str> = schema.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "midway"]);
    }

    #[test]
    fn test_from_json_invalid_shape() {
        // 既不是标题字符串也不是结构化配置
        let result = Schema::from_json_str(r#"{ "age": 42 }"#);
        assert!(matches!(
            result,
            Err(ImportError::InvalidColumnSpec { column }) if column == "age"
        ));
    }

    #[test]
    fn test_from_json_object_without_title() {
        let result = Schema::from_json_str(r#"{ "age": { "type": "integer" } }"#);
        assert!(matches!(
            result,
            Err(ImportError::MissingColumnTitle { column }) if column == "age"
        ));
    }

    #[test]
    fn test_from_json_root_not_object() {
        let result = Schema::from_json_str(r#"["Email", "Age"]"#);
        assert!(matches!(result, Err(ImportError::ConfigParseError(_))));
    }

    #[test]
    fn test_from_json_malformed_text() {
        let result = Schema::from_json_str("{ not json");
        assert!(matches!(result, Err(ImportError::ConfigParseError(_))));
    }
}
