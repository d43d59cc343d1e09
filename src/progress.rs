// ==========================================
// 通用数据导入引擎 - 进度上报
// ==========================================
// 职责: 尽力而为的进度回调；失败绝不影响管道结果
// 形态: 进度条式回调 + 行式文本输出，可接任意个或不接
// ==========================================

use std::io::Write;

// ==========================================
// ProgressReporter Trait
// ==========================================
pub trait ProgressReporter {
    /// 每处理一行后收到 (已处理行数, 总行数)
    fn update(&mut self, rows_processed: usize, total_rows: usize);
}

// ==========================================
// TextProgressTrace - 行式文本输出
// ==========================================
// 输出形如 "3/10" 的进度行；写入错误被吞掉
pub struct TextProgressTrace<W: Write> {
    out: W,
}

impl<W: Write> TextProgressTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressReporter for TextProgressTrace<W> {
    fn update(&mut self, rows_processed: usize, total_rows: usize) {
        let _ = writeln!(self.out, "{}/{}", rows_processed, total_rows);
    }
}

// ==========================================
// ProgressBarUpdater - 进度条式回调适配
// ==========================================
// 进度条 UI 本身不在本引擎范围内，这里只做回调转接
pub struct ProgressBarUpdater<F: FnMut(usize, usize)> {
    callback: F,
}

impl<F: FnMut(usize, usize)> ProgressBarUpdater<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(usize, usize)> ProgressReporter for ProgressBarUpdater<F> {
    fn update(&mut self, rows_processed: usize, total_rows: usize) {
        (self.callback)(rows_processed, total_rows);
    }
}
