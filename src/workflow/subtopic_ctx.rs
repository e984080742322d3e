//! 子主题处理上下文
//!
//! 封装"我正在处理第几个模块的第几个子主题"这一信息

use std::fmt::Display;

/// 子主题处理上下文
#[derive(Debug, Clone)]
pub struct SubtopicCtx {
    /// 所属模块标题（作为生成笔记的上下文）
    pub module_title: String,

    /// 模块序号（从1开始，仅用于日志显示）
    pub module_index: usize,

    /// 子主题在模块中的序号（从1开始）
    pub subtopic_index: usize,
}

impl SubtopicCtx {
    pub fn new(module_title: String, module_index: usize, subtopic_index: usize) -> Self {
        Self {
            module_title,
            module_index,
            subtopic_index,
        }
    }
}

impl Display for SubtopicCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[模块 {} 子主题 {}]",
            self.module_index, self.subtopic_index
        )
    }
}
