// ==========================================
// 通用数据导入引擎 - 课程实体
// ==========================================
// 职责: 课程落库目标的主数据结构
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 课程主数据
///
/// `idnumber` 是导入时的业务主键：非空且已存在则更新，否则新建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// 数据库自增主键（未持久化时为 None）
    pub id: Option<i64>,
    pub fullname: String,
    pub shortname: String,
    pub idnumber: String,
    /// 课程格式（如 "topics"）
    pub format: String,
    pub newsitems: i64,
    pub numsections: i64,
    pub summary: String,
    pub summaryformat: i64,
    /// 所属分类
    pub category: i64,
    /// 开课日期（Unix 时间戳）
    pub startdate: i64,
    pub timecreated: DateTime<Utc>,
    pub timemodified: DateTime<Utc>,
}

impl Course {
    /// 由全名派生短名：去除空白与非字母数字字符后转大写
    pub fn derive_shortname(fullname: &str) -> String {
        fullname
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_uppercase()
    }
}
