// ==========================================
// 通用表格数据导入器 - 编码规范化
// ==========================================
// 职责: 把任意字节序列规范化为合法 UTF-8 文本
// 策略: 合法 UTF-8 原样通过,否则按遗留单字节编码转码
// ==========================================

use encoding_rs::WINDOWS_1252;

/// 把单元格字节规范化为合法 UTF-8 文本
///
/// 遗留 CSV 文件常用单字节编码 (Latin-1 / Windows-1252) 书写
/// 表头与取值;这里统一按 Windows-1252 做尽力转码,
/// 表头匹配与文本取值走同一条路径。
pub fn normalize_to_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}
