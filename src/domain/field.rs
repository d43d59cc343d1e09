// ==========================================
// 通用数据导入引擎 - 字段模式
// ==========================================
// 职责: 字段类型/必填声明 + 按声明顺序的模式容器
// 说明: 校验按声明顺序快速失败，因此顺序是契约的一部分
// ==========================================

use crate::domain::row::CellValue;
use crate::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};

/// 字段基础类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// 整数/数值：接受任何可解析为数字的值
    Int,
    /// 文本
    Text,
}

impl FieldType {
    /// 检查值对该类型是否合法
    pub fn is_valid(&self, value: &CellValue) -> bool {
        match self {
            FieldType::Int => value.is_numeric(),
            // 所有单元格值都有文本视图
            FieldType::Text => true,
        }
    }
}

/// 单个字段定义
///
/// `field_type` 为 None 表示配置缺陷（列定义未声明类型），
/// 会在 `FieldSchema::ensure_complete` 或校验时以致命错误暴露。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: Option<FieldType>,
    pub required: bool,
}

impl FieldDefinition {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: Some(FieldType::Text),
            required: false,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: Some(FieldType::Int),
            required: false,
        }
    }

    /// 无类型定义（用于复现配置缺陷场景）
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// 字段模式：按声明顺序排列的字段定义集合
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: Vec<FieldDefinition>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 确保每个字段都声明了类型；否则返回配置缺陷错误
    ///
    /// 在 RowImporter::init 阶段调用，保证配置缺陷在处理任何行之前暴露。
    pub fn ensure_complete(&self) -> ImportResult<()> {
        for def in &self.fields {
            if def.field_type.is_none() {
                return Err(ImportError::ColumnDefinition {
                    field: def.name.clone(),
                });
            }
        }
        Ok(())
    }
}
