//! 课程计划服务 - 业务能力层
//!
//! 只负责"根据原始文本生成模块 / 子主题骨架"能力，一次结构化调用，带重试。

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{LlmError, RetryExhausted};
use crate::models::course::Plan;
use crate::models::raw_text::RawText;
use crate::models::schema::{plan_schema, PLAN_MAX_SUBTOPICS, PLAN_MIN_SUBTOPICS};
use crate::services::model_gateway::{generate_structured, ModelGateway};
use crate::services::retry::{with_retry, RetryPolicy};

const PLAN_SYSTEM_MESSAGE: &str = "You are an expert course architect. \
    You only use topics that appear in the material you are given.";

/// 课程计划服务
pub struct PlanService {
    gateway: Arc<dyn ModelGateway>,
    retry: RetryPolicy,
    module_count: usize,
}

impl PlanService {
    pub fn new(gateway: Arc<dyn ModelGateway>, retry: RetryPolicy, module_count: usize) -> Self {
        Self {
            gateway,
            retry,
            module_count: module_count.max(1),
        }
    }

    /// 生成课程计划
    ///
    /// 全部尝试失败时返回 `RetryExhausted`，此时不存在部分计划。
    pub async fn generate(&self, text: &RawText) -> Result<Plan, RetryExhausted<LlmError>> {
        let prompt = build_plan_prompt(text, self.module_count);

        let plan: Plan = with_retry("课程计划", &self.retry, || {
            generate_structured(
                self.gateway.as_ref(),
                Some(PLAN_SYSTEM_MESSAGE),
                &prompt,
                plan_schema(self.module_count),
            )
        })
        .await?;

        self.check_shape(&plan);
        info!(
            "✓ 课程计划生成完成: {} 个模块，{} 个子主题",
            plan.modules.len(),
            plan.modules.iter().map(|m| m.subtopics.len()).sum::<usize>()
        );

        Ok(plan)
    }

    /// 数量不符合要求只记录警告，不拒绝计划
    fn check_shape(&self, plan: &Plan) {
        if plan.modules.len() != self.module_count {
            warn!(
                "⚠️ 请求 {} 个模块，模型返回 {} 个",
                self.module_count,
                plan.modules.len()
            );
        }
        for module in &plan.modules {
            let n = module.subtopics.len();
            if !(PLAN_MIN_SUBTOPICS..=PLAN_MAX_SUBTOPICS).contains(&n) {
                warn!(
                    "⚠️ 模块 '{}' 有 {} 个子主题（期望 {}-{}）",
                    module.module_title, n, PLAN_MIN_SUBTOPICS, PLAN_MAX_SUBTOPICS
                );
            }
        }
    }
}

fn build_plan_prompt(text: &RawText, module_count: usize) -> String {
    format!(
        r#"Given the following course material, create a {weeks}-week course plan.
For each week 1-{weeks}, include:
- module_title: the week's topic
- module_description: a brief summary
- week_number: the week index
- subtopics: {min} to {max} topics with titles and short descriptions
Derive every topic strictly from the material below. Write in the same language as the material.
Here is the material:
"""
{text}
""""#,
        weeks = module_count,
        min = PLAN_MIN_SUBTOPICS,
        max = PLAN_MAX_SUBTOPICS,
        text = text.as_str(),
    )
}
