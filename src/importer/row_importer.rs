// ==========================================
// 通用数据导入引擎 - 行导入 Trait
// ==========================================
// 职责: 定义汇端接口（校验钩子 + 落库 + 模式开关）
// 说明: 共享状态放在 ImporterCore，实现者组合持有——
//       以显式组合取代历史上的抽象基类
// ==========================================

use crate::domain::field::FieldSchema;
use crate::domain::options::ImportOptions;
use crate::domain::row::{CellValue, Row};
use crate::error::{ImportError, ImportResult, ValidationKind};

/// 导入器工作模式
///
/// 仅允许在两次完整运行之间切换，绝不在运行中途切换。
/// 校验模式下处理器不会调用 import_row（试运行不写库）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Import,
    Validation,
}

/// 导入器共享状态
///
/// 模式、会话标识、默认值与源字段模式。实现者在构造时注入
/// 源模式（转换前校验所用），而不是反向引用数据源。
#[derive(Debug, Clone)]
pub struct ImporterCore {
    pub mode: ImportMode,
    pub import_id: i64,
    /// 行缺省时由落库阶段补齐的默认值
    pub default_values: Vec<(String, CellValue)>,
    /// 源字段模式（转换前）
    pub source_schema: FieldSchema,
}

impl ImporterCore {
    pub fn new(source_schema: FieldSchema) -> Self {
        Self {
            mode: ImportMode::Import,
            import_id: 0,
            default_values: Vec::new(),
            source_schema,
        }
    }

    pub fn default_value(&self, field: &str) -> Option<&CellValue> {
        self.default_values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn set_default_value(&mut self, field: impl Into<String>, value: CellValue) {
        let field = field.into();
        match self
            .default_values
            .iter_mut()
            .find(|(name, _)| *name == field)
        {
            Some((_, v)) => *v = value,
            None => self.default_values.push((field, value)),
        }
    }
}

/// 按字段模式校验一行
///
/// 按模式声明顺序快速失败（每次调用最多报告一个错误）：
/// 1. 字段未声明类型 → 配置缺陷（致命）
/// 2. 必填且缺失 → Required（Warning 级）
/// 3. 存在但类型不符 → WrongType（Warning 级）
/// 4. 缺失且非必填 → 跳过（本层不做默认值替换）
pub fn validate_row(row: &Row, schema: &FieldSchema, rowindex: usize) -> ImportResult<()> {
    for def in schema.fields() {
        let Some(field_type) = def.field_type else {
            return Err(ImportError::ColumnDefinition {
                field: def.name.clone(),
            });
        };
        match row.get(&def.name) {
            None => {
                if def.required {
                    return Err(ImportError::Validation {
                        kind: ValidationKind::Required,
                        row: rowindex,
                        field: def.name.clone(),
                    });
                }
            }
            Some(value) => {
                if !field_type.is_valid(value) {
                    return Err(ImportError::Validation {
                        kind: ValidationKind::WrongType,
                        row: rowindex,
                        field: def.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

// ==========================================
// RowImporter Trait
// ==========================================
// 用途: 汇端主接口
// 实现者: CourseDataImporter，以及测试用的内存导入器
pub trait RowImporter {
    fn core(&self) -> &ImporterCore;

    fn core_mut(&mut self) -> &mut ImporterCore;

    /// 目标字段模式（转换后校验所用；可为空表示无转换后校验）
    fn fields_definition(&self) -> &FieldSchema;

    /// 初始化导入器；错误对整次运行致命
    ///
    /// 默认实现确保两侧模式均完整声明了类型，
    /// 使配置缺陷在处理任何行之前暴露。
    fn init(&mut self, _options: &ImportOptions) -> ImportResult<()> {
        self.core().source_schema.ensure_complete()?;
        self.fields_definition().ensure_complete()
    }

    /// 转换前的原地清洗钩子（在任何校验之前运行）
    ///
    /// 可用于预清洗值，但校验不得依赖它。
    fn fix_before_transform(
        &self,
        _row: &mut Row,
        _rowindex: usize,
        _options: &ImportOptions,
    ) -> ImportResult<()> {
        Ok(())
    }

    /// 转换前校验（对照源字段模式）
    fn validate_before_transform(
        &self,
        row: &Row,
        rowindex: usize,
        _options: &ImportOptions,
    ) -> ImportResult<()> {
        validate_row(row, &self.core().source_schema, rowindex)
    }

    /// 转换后校验（对照目标字段模式）
    fn validate_after_transform(
        &self,
        row: &Row,
        rowindex: usize,
        _options: &ImportOptions,
    ) -> ImportResult<()> {
        validate_row(row, self.fields_definition(), rowindex)
    }

    /// 持久化一行；后端失败返回 Persistence 错误
    fn import_row(
        &mut self,
        row: &Row,
        rowindex: usize,
        options: &ImportOptions,
    ) -> ImportResult<()>;

    // ===== 模式开关（仅在完整运行之间切换）=====

    fn is_import_mode(&self) -> bool {
        self.core().mode == ImportMode::Import
    }

    fn set_import_mode(&mut self) {
        self.core_mut().mode = ImportMode::Import;
    }

    fn set_validation_mode(&mut self) {
        self.core_mut().mode = ImportMode::Validation;
    }

    // ===== 导入会话标识 =====

    fn import_id(&self) -> i64 {
        self.core().import_id
    }

    fn set_import_id(&mut self, import_id: i64) {
        self.core_mut().import_id = import_id;
    }

    /// 设置某字段的默认值
    fn set_default_value(&mut self, field: &str, value: CellValue) {
        self.core_mut().set_default_value(field, value);
    }
}
