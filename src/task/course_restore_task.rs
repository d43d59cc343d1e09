// ==========================================
// 通用数据导入引擎 - 课程模板克隆任务
// ==========================================
// 职责: 将模板课程内容复制到新建/更新的课程
// 说明: 克隆可能耗时，因此作为延迟任务在导入行之外执行
// ==========================================

use crate::error::ImportResult;
use crate::repository::CourseRepository;
use crate::task::DeferredTask;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 模板课程克隆任务
pub struct CourseRestoreTask {
    task_id: Uuid,
    repo: Arc<dyn CourseRepository>,
    template_course_id: i64,
    course_id: i64,
}

impl CourseRestoreTask {
    pub fn new(repo: Arc<dyn CourseRepository>, template_course_id: i64, course_id: i64) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            repo,
            template_course_id,
            course_id,
        }
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }
}

#[async_trait]
impl DeferredTask for CourseRestoreTask {
    fn name(&self) -> &str {
        "course_restore"
    }

    async fn execute(&self) -> ImportResult<()> {
        debug!(
            task_id = %self.task_id,
            template = self.template_course_id,
            course = self.course_id,
            "开始克隆模板课程"
        );
        self.repo
            .clone_course_content(self.template_course_id, self.course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::Course;
    use crate::repository::SqliteCourseRepository;
    use chrono::Utc;

    fn course(idnumber: &str, summary: &str) -> Course {
        Course {
            id: None,
            fullname: idnumber.to_string(),
            shortname: idnumber.to_string(),
            idnumber: idnumber.to_string(),
            format: "topics".to_string(),
            newsitems: 0,
            numsections: 5,
            summary: summary.to_string(),
            summaryformat: 1,
            category: 1,
            startdate: 0,
            timecreated: Utc::now(),
            timemodified: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_course_restore_task_clones_template() {
        let repo = Arc::new(SqliteCourseRepository::in_memory().unwrap());
        let template = repo.create_course(&course("TPL", "template content")).unwrap();
        let target = repo.create_course(&course("NEW", "")).unwrap();

        let task = CourseRestoreTask::new(
            Arc::clone(&repo) as Arc<dyn CourseRepository>,
            template.id.unwrap(),
            target.id.unwrap(),
        );
        task.execute().await.unwrap();

        let cloned = repo.find_by_idnumber("NEW").unwrap().unwrap();
        assert_eq!(cloned.summary, "template content");
    }
}
