// ==========================================
// 通用数据导入引擎 - 工具函数
// ==========================================
// 职责: 列名比较（忽略大小写/空白/重音）
// ==========================================

use std::cmp::Ordering;

/// 去除拉丁字母的重音符号（é → e, ü → u 等）
///
/// 仅覆盖导入文件中常见的带重音字符，未覆盖的字符原样保留。
pub fn translate_ascii(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ý' | 'ÿ' => 'y',
            'Ý' => 'Y',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            _ => c,
        })
        .collect()
}

/// 比较两个字符串（忽略空白、大小写与重音）
///
/// 返回值语义与 `str::cmp` 相同。
pub fn compare_ws_accents(s1: &str, s2: &str) -> Ordering {
    normalize(s1).cmp(&normalize(s2))
}

/// 判断两个列名在宽松比较下是否相等
pub fn equals_ws_accents(s1: &str, s2: &str) -> bool {
    compare_ws_accents(s1, s2) == Ordering::Equal
}

fn normalize(s: &str) -> String {
    translate_ascii(s)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
