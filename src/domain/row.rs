// ==========================================
// 通用数据导入引擎 - 行数据模型
// ==========================================
// 职责: 单行记录（字段名 → 标量值）的有序映射
// 说明: 保持插入顺序——转换阶段的并列排序依赖字段出现顺序
// ==========================================

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;

/// 单元格标量值（文本或整数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl CellValue {
    /// 以文本视图读取值
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Int(v) => Cow::Owned(v.to_string()),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// 值是否可解析为数字（整数或小数）
    pub fn is_numeric(&self) -> bool {
        match self {
            CellValue::Int(_) => true,
            CellValue::Text(s) => s.trim().parse::<f64>().is_ok(),
        }
    }

    /// 尝试按整数读取（文本值会被解析）
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }

    /// 去除首尾空白后是否为空
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Int(_) => false,
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

/// 一行记录：字段名 → 值 的有序映射
///
/// 每个数据源位置产生一个全新的 Row；除 fix_before_transform
/// 钩子外不在原地修改。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 (字段名, 值) 序列构造，保持给定顺序
    pub fn from_pairs<N, V>(pairs: Vec<(N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Row::new();
        for (name, value) in pairs {
            row.set(name.into(), value.into());
        }
        row
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// 写入字段值；已存在则覆盖（保持原位置），否则追加到末尾
    pub fn set(&mut self, field: impl Into<String>, value: CellValue) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, v)) => *v = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        let pos = self.entries.iter().position(|(name, _)| name == field)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 值可变遍历（供 fix_before_transform 清洗钩子使用）
    pub fn values_mut(&mut self) -> impl Iterator<Item = (&str, &mut CellValue)> {
        self.entries.iter_mut().map(|(name, v)| (name.as_str(), v))
    }

    /// 序列化为 JSON 对象（写入日志 additionalinfo）
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// Row 序列化为 JSON 对象，保持字段顺序
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_preserves_insertion_order() {
        let row = Row::from_pairs(vec![("b", "1"), ("a", "2"), ("c", "3")]);
        assert_eq!(row.field_names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_row_set_overwrites_in_place() {
        let mut row = Row::from_pairs(vec![("a", "1"), ("b", "2")]);
        row.set("a", CellValue::Text("9".to_string()));
        assert_eq!(row.field_names(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&CellValue::Text("9".to_string())));
    }

    #[test]
    fn test_cell_value_numeric() {
        assert!(CellValue::Int(5).is_numeric());
        assert!(CellValue::Text("12".to_string()).is_numeric());
        assert!(CellValue::Text("3.5".to_string()).is_numeric());
        assert!(!CellValue::Text("abc".to_string()).is_numeric());
    }

    #[test]
    fn test_row_to_json_keeps_order() {
        let row = Row::from_pairs(vec![("x", "1"), ("y", "2")]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"x":"1","y":"2"}"#);
    }
}
