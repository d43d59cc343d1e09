// ==========================================
// 通用数据导入引擎 - 后台任务层
// ==========================================
// 职责: 落库阶段派生的延迟任务（即发即忘）
// 说明: 任务结果对管道的整体运行结果不可见——这是刻意的边界
// ==========================================

// 模块声明
pub mod course_restore_task;

pub use course_restore_task::CourseRestoreTask;

use crate::error::ImportResult;
use async_trait::async_trait;
use tracing::{info, warn};

// ==========================================
// DeferredTask Trait
// ==========================================
// 用途: 延迟任务主接口
// 实现者: CourseRestoreTask
#[async_trait]
pub trait DeferredTask: Send + Sync {
    /// 任务名称（用于日志）
    fn name(&self) -> &str;

    /// 执行任务
    async fn execute(&self) -> ImportResult<()>;
}

// ==========================================
// TaskScheduler Trait
// ==========================================
// 用途: 任务入队接口；管道不等待任务完成
pub trait TaskScheduler: Send + Sync {
    fn queue(&self, task: Box<dyn DeferredTask>);
}

// ==========================================
// TokioTaskScheduler - 基于 tokio 的调度器
// ==========================================
pub struct TokioTaskScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioTaskScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// 使用当前运行时（须在 tokio 上下文内调用）
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskScheduler for TokioTaskScheduler {
    fn queue(&self, task: Box<dyn DeferredTask>) {
        self.handle.spawn(async move {
            info!(task = task.name(), "延迟任务开始执行");
            // 任务失败只记日志，不回传管道
            if let Err(e) = task.execute().await {
                warn!(task = task.name(), error = %e, "延迟任务执行失败");
            }
        });
    }
}
