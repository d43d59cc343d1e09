// ==========================================
// 通用数据导入引擎 - 标准转换器实现
// ==========================================
// 职责: 按规则表重映射字段；同目标多贡献时按 order 拼接
// 算法: 两阶段——先暂存 (目标, order, 值)，再按目标扁平化
// ==========================================

use crate::domain::options::ImportOptions;
use crate::domain::row::{CellValue, Row};
use crate::error::{ImportError, ImportResult};
use crate::transformer::RowTransformer;
use std::collections::HashMap;
use std::fmt;

/// 转换回调：`(值, 源字段名) → 新值`
///
/// 返回 Multiple 时配合列表型目标做一对一分发。
pub type TransformCallback = Box<dyn Fn(&CellValue, &str) -> TransformedValue + Send + Sync>;

/// 回调产出
#[derive(Debug, Clone, PartialEq)]
pub enum TransformedValue {
    Single(CellValue),
    Multiple(Vec<CellValue>),
}

/// 目标字段：单个或多个（一个源字段可扇出到多个目标字段）
#[derive(Debug, Clone, PartialEq)]
pub enum TransformTarget {
    One(String),
    Many(Vec<String>),
}

/// 拼接参数
#[derive(Debug, Clone, PartialEq)]
pub struct Concatenate {
    /// 拼接顺序（小者在前，默认 0）
    pub order: usize,
    /// 该贡献前置的分隔符；None 时用转换器默认分隔符
    pub separator: Option<String>,
}

/// 单条转换规则
pub struct TransformRule {
    pub to: TransformTarget,
    pub callback: Option<TransformCallback>,
    pub concatenate: Option<Concatenate>,
}

impl TransformRule {
    /// 改名到单个目标字段
    pub fn to_field(target: impl Into<String>) -> Self {
        Self {
            to: TransformTarget::One(target.into()),
            callback: None,
            concatenate: None,
        }
    }

    /// 扇出到多个目标字段
    pub fn to_fields(targets: Vec<&str>) -> Self {
        Self {
            to: TransformTarget::Many(targets.into_iter().map(String::from).collect()),
            callback: None,
            concatenate: None,
        }
    }

    pub fn with_callback(
        mut self,
        callback: impl Fn(&CellValue, &str) -> TransformedValue + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// 参与拼接，并指定顺序
    pub fn concatenated(mut self, order: usize) -> Self {
        self.concatenate = Some(Concatenate {
            order,
            separator: None,
        });
        self
    }

    /// 覆盖该贡献的拼接分隔符
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let order = self.concatenate.as_ref().map(|c| c.order).unwrap_or(0);
        self.concatenate = Some(Concatenate {
            order,
            separator: Some(separator.into()),
        });
        self
    }
}

impl fmt::Debug for TransformRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRule")
            .field("to", &self.to)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .field("concatenate", &self.concatenate)
            .finish()
    }
}

// 暂存的一份贡献
struct Staged {
    order: usize,
    separator: Option<String>,
    value: CellValue,
}

// ==========================================
// StandardTransformer - 标准转换器
// ==========================================
pub struct StandardTransformer {
    rules: HashMap<String, Vec<TransformRule>>,
    /// 默认拼接分隔符
    concat_separator: String,
    import_id: i64,
}

impl StandardTransformer {
    pub fn new(rules: HashMap<String, Vec<TransformRule>>) -> Self {
        Self {
            rules,
            concat_separator: " ".to_string(),
            import_id: 0,
        }
    }

    /// 无任何规则的转换器（所有字段原样通过）
    pub fn identity() -> Self {
        Self::new(HashMap::new())
    }

    pub fn with_concat_separator(mut self, separator: impl Into<String>) -> Self {
        self.concat_separator = separator.into();
        self
    }

    pub fn add_rule(&mut self, source_field: impl Into<String>, rule: TransformRule) {
        self.rules.entry(source_field.into()).or_default().push(rule);
    }

    fn stage(staged: &mut Vec<(String, Vec<Staged>)>, target: &str, contribution: Staged) {
        match staged.iter_mut().find(|(name, _)| name == target) {
            Some((_, list)) => list.push(contribution),
            None => staged.push((target.to_string(), vec![contribution])),
        }
    }
}

impl RowTransformer for StandardTransformer {
    /// 转换算法
    ///
    /// 1. 无规则的源字段按原名、order 0 原样暂存。
    /// 2. 有规则的源字段逐条规则求值（回调可选），按 (目标, order) 暂存。
    /// 3. 扁平化：同一目标字段多于一份贡献时按 order 稳定排序
    ///    （并列保持源字段出现顺序），跳过去空白后为空的贡献，
    ///    其余用各自分隔符连接；恰好一份贡献时原样通过。
    fn transform(&self, row: &Row, _options: &ImportOptions) -> ImportResult<Row> {
        let mut staged: Vec<(String, Vec<Staged>)> = Vec::new();

        for (field, value) in row.iter() {
            let Some(rules) = self.rules.get(field) else {
                Self::stage(
                    &mut staged,
                    field,
                    Staged {
                        order: 0,
                        separator: None,
                        value: value.clone(),
                    },
                );
                continue;
            };

            for rule in rules {
                let (order, separator) = match &rule.concatenate {
                    Some(c) => (c.order, c.separator.clone()),
                    None => (0, None),
                };
                let transformed = match &rule.callback {
                    Some(callback) => callback(value, field),
                    None => TransformedValue::Single(value.clone()),
                };

                match &rule.to {
                    TransformTarget::One(target) => match transformed {
                        TransformedValue::Single(v) => Self::stage(
                            &mut staged,
                            target,
                            Staged {
                                order,
                                separator: separator.clone(),
                                value: v,
                            },
                        ),
                        TransformedValue::Multiple(values) => {
                            for v in values {
                                Self::stage(
                                    &mut staged,
                                    target,
                                    Staged {
                                        order,
                                        separator: separator.clone(),
                                        value: v,
                                    },
                                );
                            }
                        }
                    },
                    TransformTarget::Many(targets) => match transformed {
                        TransformedValue::Single(v) => {
                            for target in targets {
                                Self::stage(
                                    &mut staged,
                                    target,
                                    Staged {
                                        order,
                                        separator: separator.clone(),
                                        value: v.clone(),
                                    },
                                );
                            }
                        }
                        TransformedValue::Multiple(values) => {
                            if values.len() != targets.len() {
                                return Err(ImportError::InternalError(format!(
                                    "转换回调返回 {} 个值，但目标字段有 {} 个 (字段 {})",
                                    values.len(),
                                    targets.len(),
                                    field
                                )));
                            }
                            for (target, v) in targets.iter().zip(values) {
                                Self::stage(
                                    &mut staged,
                                    target,
                                    Staged {
                                        order,
                                        separator: separator.clone(),
                                        value: v,
                                    },
                                );
                            }
                        }
                    },
                }
            }
        }

        // 扁平化
        let mut result = Row::new();
        for (target, mut contributions) in staged {
            if contributions.len() > 1 {
                // 稳定排序：order 并列时保持源字段出现顺序
                contributions.sort_by_key(|c| c.order);
                let mut joined = String::new();
                for contribution in &contributions {
                    let text = contribution.value.as_text();
                    if text.trim().is_empty() {
                        continue;
                    }
                    if !joined.is_empty() {
                        joined.push_str(
                            contribution
                                .separator
                                .as_deref()
                                .unwrap_or(&self.concat_separator),
                        );
                    }
                    joined.push_str(&text);
                }
                result.set(target, CellValue::Text(joined));
            } else if let Some(contribution) = contributions.into_iter().next() {
                // 单份贡献原样通过（不拼接、不去空白）
                result.set(target, contribution.value);
            }
        }
        Ok(result)
    }

    fn fields_transformers(&self) -> &HashMap<String, Vec<TransformRule>> {
        &self.rules
    }

    fn import_id(&self) -> i64 {
        self.import_id
    }

    fn set_import_id(&mut self, import_id: i64) {
        self.import_id = import_id;
    }
}
