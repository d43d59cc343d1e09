// ==========================================
// 通用数据导入引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型（行/字段/日志/课程）
// 红线: 不含数据访问逻辑,不含管道逻辑
// ==========================================

pub mod course;
pub mod field;
pub mod log;
pub mod options;
pub mod row;

// 重导出核心类型
pub use course::Course;
pub use field::{FieldDefinition, FieldSchema, FieldType};
pub use log::{ImportLogEntry, LogFilter, LogLevel};
pub use options::ImportOptions;
pub use row::{CellValue, Row};
