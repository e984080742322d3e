//! 子主题处理流程 - 流程层
//!
//! 核心职责：定义"一个子主题"的完整丰富流程
//!
//! 流程顺序：
//! 1. 生成笔记（带重试）→ 节流等待
//! 2. 根据笔记生成测验（带重试）→ 节流等待
//!
//! 测验依赖笔记，两个阶段不能并行。

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{Config, SubtopicFailurePolicy};
use crate::error::{AppError, AppResult, LlmError, RetryExhausted};
use crate::models::course::{EnrichedSubtopic, PlanSubtopic};
use crate::services::{ModelGateway, NotesService, QuizService, RetryPolicy};
use crate::workflow::subtopic_ctx::SubtopicCtx;

/// 子主题处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubtopicOutcome {
    /// 笔记和测验都已生成
    Complete(EnrichedSubtopic),
    /// 某个阶段重试耗尽，按降级策略输出了空笔记或空测验
    Degraded(EnrichedSubtopic),
}

impl SubtopicOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SubtopicOutcome::Degraded(_))
    }

    pub fn into_subtopic(self) -> EnrichedSubtopic {
        match self {
            SubtopicOutcome::Complete(s) | SubtopicOutcome::Degraded(s) => s,
        }
    }
}

/// 子主题处理流程
///
/// - 编排笔记 → 测验两个阶段
/// - 决定阶段失败时是终止运行还是降级
/// - 不持有并发槽位，由编排层负责限流
pub struct SubtopicFlow {
    notes_service: NotesService,
    quiz_service: QuizService,
    pacing_delay: Duration,
    failure_policy: SubtopicFailurePolicy,
}

impl SubtopicFlow {
    /// 创建新的子主题处理流程
    pub fn new(gateway: Arc<dyn ModelGateway>, config: &Config) -> Self {
        let retry = RetryPolicy::new(config.max_retry_attempts, config.retry_delay());
        Self {
            notes_service: NotesService::new(gateway.clone(), retry),
            quiz_service: QuizService::new(gateway, retry),
            pacing_delay: config.pacing_delay(),
            failure_policy: config.subtopic_failure_policy,
        }
    }

    pub async fn run(
        &self,
        ctx: &SubtopicCtx,
        subtopic: &PlanSubtopic,
    ) -> AppResult<SubtopicOutcome> {
        let mut enriched = EnrichedSubtopic {
            title: subtopic.title.clone(),
            description: subtopic.description.clone(),
            detailed_notes_md: None,
            quiz_questions: Vec::new(),
        };

        // ========== 阶段 1: 笔记 ==========
        info!("{} 📝 正在生成笔记: \"{}\"", ctx, subtopic.title);

        let notes = self
            .notes_service
            .generate(&ctx.module_title, &subtopic.title, subtopic.description.as_deref())
            .await;
        self.pause().await;

        let notes = match notes {
            Ok(notes) => notes,
            Err(e) => {
                self.on_stage_exhausted(ctx, e)?;
                // 没有笔记就无法出题，测验直接留空
                return Ok(SubtopicOutcome::Degraded(enriched));
            }
        };

        // ========== 阶段 2: 测验 ==========
        info!("{} ❓ 正在生成测验: \"{}\"", ctx, subtopic.title);

        let quiz = self.quiz_service.generate(&subtopic.title, &notes).await;
        self.pause().await;
        enriched.detailed_notes_md = Some(notes);

        match quiz {
            Ok(questions) => {
                info!(
                    "{} ✓ 子主题完成，{} 道测验题",
                    ctx,
                    questions.len()
                );
                enriched.quiz_questions = questions;
                Ok(SubtopicOutcome::Complete(enriched))
            }
            Err(e) => {
                self.on_stage_exhausted(ctx, e)?;
                Ok(SubtopicOutcome::Degraded(enriched))
            }
        }
    }

    /// 阶段重试耗尽：按策略决定是否继续
    fn on_stage_exhausted(
        &self,
        ctx: &SubtopicCtx,
        err: RetryExhausted<LlmError>,
    ) -> Result<(), AppError> {
        match self.failure_policy {
            SubtopicFailurePolicy::FailRun => {
                error!("{} ❌ {}", ctx, err);
                Err(AppError::RetryExhausted(RetryExhausted {
                    stage: format!("{} {}", ctx, err.stage),
                    ..err
                }))
            }
            SubtopicFailurePolicy::Degrade => {
                warn!("{} ⚠️ {}，该子主题降级输出", ctx, err);
                Ok(())
            }
        }
    }

    /// 每个阶段结束后的节流等待
    async fn pause(&self) {
        if !self.pacing_delay.is_zero() {
            tokio::time::sleep(self.pacing_delay).await;
        }
    }
}
