//! 测验服务 - 业务能力层
//!
//! 只负责"根据笔记生成测验题"能力。题目只能来自笔记内容，因此必须在笔记之后执行。

use std::sync::Arc;

use crate::error::{LlmError, RetryExhausted};
use crate::models::course::QuizQuestion;
use crate::models::schema::{quiz_schema, QuizSet, QUIZ_MAX_QUESTIONS, QUIZ_MIN_QUESTIONS};
use crate::services::model_gateway::{generate_structured, ModelGateway};
use crate::services::retry::{with_retry, RetryPolicy};

const QUIZ_SYSTEM_MESSAGE: &str = "You write multiple choice quiz questions. \
    The answer field must repeat one of the options word for word.";

/// 测验服务
pub struct QuizService {
    gateway: Arc<dyn ModelGateway>,
    retry: RetryPolicy,
}

impl QuizService {
    pub fn new(gateway: Arc<dyn ModelGateway>, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }

    /// 生成测验题
    ///
    /// # 参数
    /// - `subtopic_title`: 子主题标题
    /// - `notes_md`: 笔记阶段生成的 markdown 笔记
    pub async fn generate(
        &self,
        subtopic_title: &str,
        notes_md: &str,
    ) -> Result<Vec<QuizQuestion>, RetryExhausted<LlmError>> {
        let prompt = build_quiz_prompt(subtopic_title, notes_md);
        let stage = format!("测验[{}]", subtopic_title);

        let quiz: QuizSet = with_retry(&stage, &self.retry, || {
            generate_structured(
                self.gateway.as_ref(),
                Some(QUIZ_SYSTEM_MESSAGE),
                &prompt,
                quiz_schema(),
            )
        })
        .await?;

        Ok(quiz.quiz_questions)
    }
}

fn build_quiz_prompt(subtopic_title: &str, notes_md: &str) -> String {
    format!(
        "Generate {}-{} multiple choice quiz questions for the subtopic \"{}\" based only on the following content:\n\"\"\"\n{}\n\"\"\"",
        QUIZ_MIN_QUESTIONS, QUIZ_MAX_QUESTIONS, subtopic_title, notes_md
    )
}
