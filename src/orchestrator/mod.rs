//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整个生成过程的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 读取输入文本、写出课程 JSON
//! - 输出全局统计信息
//!
//! ### `course_pipeline` - 课程生成流水线
//! - 生成课程计划
//! - 按计划顺序逐个处理模块
//! - 组装最终课程
//!
//! ### `module_processor` - 单个模块处理器
//! - 并发处理一个模块的所有子主题（受任务池限制）
//! - 按计划顺序收集结果
//!
//! ## 层次关系
//!
//! ```text
//! app (读文本 / 写 JSON)
//!     ↓
//! course_pipeline (处理 Vec<PlanModule>)
//!     ↓
//! module_processor (处理 Vec<PlanSubtopic>)
//!     ↓
//! workflow::SubtopicFlow (处理单个子主题)
//!     ↓
//! services (能力层：plan / notes / quiz / retry / limiter)
//!     ↓
//! ModelGateway (远端模型)
//! ```

pub mod app;
pub mod course_pipeline;
pub mod module_processor;

// 重新导出主要类型
pub use app::App;
pub use course_pipeline::{CoursePipeline, CourseRun, RunStats};
pub use module_processor::{process_module, ModuleResult};
