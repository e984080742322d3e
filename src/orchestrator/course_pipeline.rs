//! 课程生成流水线 - 编排层
//!
//! 计划 → 按顺序逐个处理模块 → 组装课程。
//!
//! 模块严格串行：第 k+1 个模块要等第 k 个模块的所有子主题结束后才开始。

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::course::{Course, Plan};
use crate::models::raw_text::RawText;
use crate::orchestrator::module_processor::process_module;
use crate::services::{ModelGateway, PlanService, RetryPolicy, SubtopicPool};
use crate::utils::logging::log_plan_ready;
use crate::workflow::SubtopicFlow;

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub modules: usize,
    pub subtopics: usize,
    pub quiz_questions: usize,
    pub degraded_subtopics: usize,
    pub elapsed: Duration,
}

/// 一次成功运行的结果
#[derive(Debug, Clone)]
pub struct CourseRun {
    pub plan: Plan,
    pub course: Course,
    pub stats: RunStats,
}

/// 课程生成流水线
///
/// 每个流水线持有自己的任务池，不与其他运行共享。
pub struct CoursePipeline {
    plan_service: PlanService,
    subtopic_flow: SubtopicFlow,
    pool: SubtopicPool,
}

impl CoursePipeline {
    pub fn new(gateway: Arc<dyn ModelGateway>, config: &Config) -> Self {
        let retry = RetryPolicy::new(config.max_retry_attempts, config.retry_delay());
        Self {
            plan_service: PlanService::new(gateway.clone(), retry, config.module_count),
            subtopic_flow: SubtopicFlow::new(gateway, config),
            pool: SubtopicPool::new(config.max_concurrent_subtopics),
        }
    }

    /// 从原始文本生成完整课程
    ///
    /// 任一阶段未恢复的失败都会终止整个运行，不返回部分课程。
    pub async fn generate(&self, text: &RawText) -> AppResult<CourseRun> {
        if text.is_blank() {
            return Err(AppError::InvalidInput("输入文本为空".to_string()));
        }

        let started = Instant::now();

        // ========== 阶段 1: 课程计划 ==========
        info!("🧭 正在生成课程计划（输入 {} 个字符）...", text.char_count());
        let plan = self.plan_service.generate(text).await?;
        log_plan_ready(&plan);

        // ========== 阶段 2: 逐个模块丰富子主题 ==========
        let total_modules = plan.modules.len();
        let mut modules = Vec::with_capacity(total_modules);
        let mut degraded_subtopics = 0;

        for (idx, module) in plan.modules.iter().enumerate() {
            let result = process_module(
                &self.subtopic_flow,
                &self.pool,
                module,
                idx + 1,
                total_modules,
            )
            .await?;

            degraded_subtopics += result.degraded;
            modules.push(result.module);
        }

        // ========== 阶段 3: 组装课程 ==========
        let course = Course { modules };
        let stats = RunStats {
            modules: course.modules.len(),
            subtopics: course.subtopic_count(),
            quiz_questions: course.quiz_question_count(),
            degraded_subtopics,
            elapsed: started.elapsed(),
        };

        info!("✓ 课程生成完成");
        Ok(CourseRun {
            plan,
            course,
            stats,
        })
    }
}
