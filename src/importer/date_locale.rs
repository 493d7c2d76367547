// ==========================================
// 通用表格数据导入器 - 本地化日期解析
// ==========================================
// 职责: LocaleDateParser 协作方的默认实现
// 格式来源: 语言文件 importer.date_formats (分号分隔)
// ==========================================

use crate::i18n;
use crate::importer::table_importer_trait::LocaleDateParser;
use anyhow::bail;
use chrono::{Datelike, NaiveDate};

// ==========================================
// LocalizedDateParser - 默认日期解析实现
// ==========================================
// 按格式列表顺序逐个尝试,首个命中的格式胜出
pub struct LocalizedDateParser {
    formats: Vec<String>,
}

impl LocalizedDateParser {
    /// 按当前语言环境的格式列表创建
    pub fn new() -> Self {
        let formats = i18n::t("importer.date_formats")
            .split(';')
            .map(|format| format.to_string())
            .filter(|format| !format.is_empty())
            .collect();
        Self { formats }
    }

    /// 按显式格式列表创建 (chrono 格式串)
    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(|format| format.into()).collect(),
        }
    }
}

impl Default for LocalizedDateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleDateParser for LocalizedDateParser {
    fn parse_localized_date(&self, raw: &str) -> anyhow::Result<(i32, u32, u32)> {
        for format in &self.formats {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return Ok((date.year(), date.month(), date.day()));
            }
        }
        bail!("日期文本不符合任何已知格式: {}", raw)
    }
}
