// ==========================================
// 通用数据导入引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 行式数据导入管道（数据源 → 转换 → 校验 → 落库）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 错误类型
pub mod error;

// 数据源层 - 行式数据读取
pub mod source;

// 转换层 - 字段重映射
pub mod transformer;

// 导入层 - 校验与落库
pub mod importer;

// 导入日志 - 结构化诊断
pub mod logs;

// 数据仓储层 - 数据访问
pub mod repository;

// 后台任务层 - 延迟任务调度
pub mod task;

// 编排层 - 导入主流程
pub mod processor;

// 进度上报
pub mod progress;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 工具函数
pub mod utils;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::field::{FieldDefinition, FieldSchema, FieldType};
pub use domain::log::{ImportLogEntry, LogFilter, LogLevel};
pub use domain::options::ImportOptions;
pub use domain::row::{CellValue, Row};

// 错误类型
pub use error::{ImportError, ImportResult, ValidationKind};

// 管道契约
pub use importer::row_importer::{ImportMode, ImporterCore, RowImporter};
pub use source::RowSource;
pub use transformer::RowTransformer;

// 主要实现
pub use importer::course_importer::CourseDataImporter;
pub use logs::{BasicImportLogger, ImportLogger, LogContext, SqliteImportLogger};
pub use processor::Processor;
pub use progress::{ProgressBarUpdater, ProgressReporter, TextProgressTrace};
pub use source::csv_source::{CsvRowSource, CsvSourceOptions};
pub use transformer::standard::{
    Concatenate, StandardTransformer, TransformRule, TransformTarget, TransformedValue,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "通用数据导入引擎";

// 默认模块标识（写入导入日志的 module 字段）
pub const DEFAULT_MODULE: &str = "import_engine";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
