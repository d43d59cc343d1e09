// ==========================================
// 通用数据导入引擎 - 错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::log::LogLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 行级校验失败的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationKind {
    /// 必填字段缺失
    Required,
    /// 字段值与声明类型不符
    WrongType,
}

impl ValidationKind {
    /// 对应的日志消息代码
    pub fn message_code(&self) -> &'static str {
        match self {
            ValidationKind::Required => "required",
            ValidationKind::WrongType => "wrongtype",
        }
    }
}

/// 导入管道错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源错误（初始化阶段，致命）=====
    #[error("无法打开 CSV 文件: {0}")]
    CannotOpenCsvFile(String),

    #[error("文件编码错误: {file}（期望 {expected}）")]
    WrongEncoding { file: String, expected: String },

    #[error("CSV 文件无列头: {0}")]
    NoColumnsDefined(String),

    #[error("缺少必需列: {0}")]
    ColumnMissing(String),

    #[error("CSV 解析失败: {0}")]
    CsvParse(String),

    // ===== 数据源错误（行级，可恢复）=====
    #[error("列数不匹配 (行 {row}): 期望 {expected}, 实际 {actual}")]
    WrongColumnNumber {
        row: usize,
        expected: usize,
        actual: usize,
    },

    // ===== 配置错误（程序缺陷，致命）=====
    #[error("字段定义缺少类型: {field}")]
    ColumnDefinition { field: String },

    // ===== 校验错误（行级，可恢复）=====
    #[error("字段校验失败 (行 {row}, 字段 {field}): {}", .kind.message_code())]
    Validation {
        kind: ValidationKind,
        row: usize,
        field: String,
    },

    // ===== 持久化错误（行级，可恢复）=====
    #[error("行导入失败 (行 {row}): {message}")]
    Persistence { row: usize, message: String },

    // ===== 数据库错误 =====
    #[error("数据库错误: {0}")]
    Database(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::CannotOpenCsvFile(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Database(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParse(err.to_string())
    }
}

impl ImportError {
    /// 写入日志的消息代码
    pub fn message_code(&self) -> &'static str {
        match self {
            ImportError::CannotOpenCsvFile(_) => "cannotopencsvfile",
            ImportError::WrongEncoding { .. } => "wrongencoding",
            ImportError::NoColumnsDefined(_) => "nocolumnsdefined",
            ImportError::ColumnMissing(_) => "columnmissing",
            ImportError::CsvParse(_) => "csvparseerror",
            ImportError::WrongColumnNumber { .. } => "wrongcolumnnumber",
            ImportError::ColumnDefinition { .. } => "importercolumndef",
            ImportError::Validation { kind, .. } => kind.message_code(),
            ImportError::Persistence { .. } => "rowimportfailed",
            ImportError::Database(_) => "databaseerror",
            ImportError::InternalError(_) => "internalerror",
            ImportError::Other(_) => "genericerror",
        }
    }

    /// 该错误对应的日志级别
    ///
    /// 校验失败记 Warning（诊断性，不使整体运行判为失败）；
    /// 其余错误记 Error。
    pub fn level(&self) -> LogLevel {
        match self {
            ImportError::Validation { .. } => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }

    /// 相关字段名（若有）
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ImportError::ColumnMissing(field) => Some(field),
            ImportError::ColumnDefinition { field } => Some(field),
            ImportError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// 错误自带的行号（若有）
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ImportError::WrongColumnNumber { row, .. } => Some(*row),
            ImportError::Validation { row, .. } => Some(*row),
            ImportError::Persistence { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
