// ==========================================
// 通用数据导入引擎 - 转换层
// ==========================================
// 职责: 行 → 行 的字段重映射（改名/回调/拼接）
// 红线: 纯函数，不访问数据源与导入器
// ==========================================

pub mod standard;

pub use standard::{
    Concatenate, StandardTransformer, TransformRule, TransformTarget, TransformedValue,
};

use crate::domain::options::ImportOptions;
use crate::domain::row::Row;
use crate::error::ImportResult;
use std::collections::HashMap;

// ==========================================
// RowTransformer Trait
// ==========================================
// 用途: 转换阶段主接口
// 实现者: StandardTransformer
pub trait RowTransformer {
    /// 按转换规则产出新行（不修改输入行）
    fn transform(&self, row: &Row, options: &ImportOptions) -> ImportResult<Row>;

    /// 转换规则表（源字段 → 规则列表）
    fn fields_transformers(&self) -> &HashMap<String, Vec<TransformRule>>;

    fn import_id(&self) -> i64;

    fn set_import_id(&mut self, import_id: i64);
}
