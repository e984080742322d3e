//! # Course Generator
//!
//! 根据一段文本，调用大模型生成多周课程（模块 → 子主题 → markdown 笔记 → 测验题）
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 计划、课程、测验题等数据结构，结构化输出的 schema
//! - `RawText` - 截断后的输入文本
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次调用或单个子主题
//! - `ModelGateway` / `LlmService` - 模型调用能力（自由文本 / 结构化）
//! - `with_retry` - 重试能力
//! - `SubtopicPool` - 并发限制能力
//! - `PlanService` / `NotesService` / `QuizService` - 计划、笔记、测验生成能力
//! - `validate_course` - 输出校验能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个子主题"的完整处理流程
//! - `SubtopicCtx` - 上下文封装（模块序号 + 子主题序号）
//! - `SubtopicFlow` - 流程编排（笔记 → 测验，失败策略）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，读写文件
//! - `orchestrator/course_pipeline` - 计划 → 逐个模块 → 组装课程
//! - `orchestrator/module_processor` - 单个模块内子主题的并发处理
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, SubtopicFailurePolicy};
pub use error::{AppError, AppResult, LlmError, RetryExhausted, ValidationError};
pub use models::{Course, CourseResponse, Plan, RawText};
pub use orchestrator::{App, CoursePipeline, CourseRun, RunStats};
pub use services::{CompletionMode, CompletionRequest, LlmService, ModelGateway};
pub use workflow::{SubtopicCtx, SubtopicFlow, SubtopicOutcome};
