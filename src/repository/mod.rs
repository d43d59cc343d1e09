// ==========================================
// 通用数据导入引擎 - 数据仓储层
// ==========================================
// 职责: 定义数据访问接口与 rusqlite 实现
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

pub mod course_repo;

pub use course_repo::{CourseRepository, SqliteCourseRepository};
