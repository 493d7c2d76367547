// ==========================================
// 通用表格数据导入器 - 表头解析器
// ==========================================
// 职责: 按标题把逻辑列定位到物理列下标
// 规则: 忽略大小写与首尾空白,首个匹配列胜出
// 红线: 必须存在的列缺失时立即失败,不再继续扫描
// ==========================================

use crate::domain::Schema;
use crate::importer::error::{ImportError, ImportResult};

// ==========================================
// ColumnIndexMap - 列关联表
// ==========================================
// 有序映射: 逻辑列名 → 物理列下标 (0 起),保持列配置顺序
// 仅包含在表头中实际找到的逻辑列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndexMap {
    entries: Vec<(String, usize)>,
}

impl ColumnIndexMap {
    /// 按逻辑列名查物理下标
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, index)| *index)
    }

    /// 按列配置顺序遍历 (逻辑列名, 物理下标)
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(key, index)| (key.as_str(), *index))
    }

    /// 已定位的列数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否未定位任何列
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 解析表头行,计算列关联表
///
/// 算法:
/// 1. 按列配置顺序逐列扫描表头,比较规范化标题
///    (trim + 大写折叠;单元格在行读取层已规范化为 UTF-8)
/// 2. 下标最小的匹配列胜出,重复表头取首次出现处
/// 3. mandatory 或 force_presence 的列未找到 → 立即失败
/// 4. 一列都没找到 → NoColumnsFound (即使没有任何必须列)
///
/// # 返回
/// - Ok(ColumnIndexMap): 逻辑列 → 物理下标
/// - Err(MissingColumn): 必须存在的列缺失 (携带表头标题)
/// - Err(NoColumnsFound): 表头与配置完全不匹配
pub fn resolve_columns(schema: &Schema, header_row: &[String]) -> ImportResult<ColumnIndexMap> {
    let mut entries: Vec<(String, usize)> = Vec::new();

    for (name, spec) in schema.iter() {
        let target = spec.title.trim().to_uppercase();
        let found = header_row
            .iter()
            .position(|cell| cell.trim().to_uppercase() == target);

        match found {
            Some(index) => entries.push((name.to_string(), index)),
            None if spec.mandatory || spec.force_presence => {
                return Err(ImportError::MissingColumn {
                    column: spec.title.clone(),
                });
            }
            None => {}
        }
    }

    if entries.is_empty() {
        return Err(ImportError::NoColumnsFound);
    }

    Ok(ColumnIndexMap { entries })
}
