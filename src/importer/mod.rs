// ==========================================
// 通用数据导入引擎 - 导入层
// ==========================================
// 职责: 行校验 + 落库（管道的汇端）
// 支持: 导入模式 / 校验（试运行）模式
// ==========================================

// 模块声明
pub mod course_importer;
pub mod row_importer;

// 重导出核心类型
pub use course_importer::CourseDataImporter;
pub use row_importer::{validate_row, ImportMode, ImporterCore, RowImporter};
