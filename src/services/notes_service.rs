//! 笔记服务 - 业务能力层
//!
//! 只负责"为单个子主题生成 markdown 笔记"能力，不关心流程

use std::sync::Arc;

use crate::error::{LlmError, RetryExhausted};
use crate::services::model_gateway::{generate_text, ModelGateway};
use crate::services::retry::{with_retry, RetryPolicy};

const NOTES_SYSTEM_MESSAGE: &str =
    "You are an expert course content writer. Provide detailed markdown notes only.";

/// 笔记服务
pub struct NotesService {
    gateway: Arc<dyn ModelGateway>,
    retry: RetryPolicy,
}

impl NotesService {
    pub fn new(gateway: Arc<dyn ModelGateway>, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }

    /// 生成子主题的详细笔记
    ///
    /// # 参数
    /// - `module_title`: 所属模块标题（作为上下文）
    /// - `subtopic_title`: 子主题标题
    /// - `description`: 子主题简介（可选）
    ///
    /// # 返回
    /// 返回 markdown 格式的笔记
    pub async fn generate(
        &self,
        module_title: &str,
        subtopic_title: &str,
        description: Option<&str>,
    ) -> Result<String, RetryExhausted<LlmError>> {
        let prompt = build_notes_prompt(module_title, subtopic_title, description);
        let stage = format!("笔记[{}]", subtopic_title);

        with_retry(&stage, &self.retry, || {
            generate_text(self.gateway.as_ref(), Some(NOTES_SYSTEM_MESSAGE), &prompt)
        })
        .await
    }
}

fn build_notes_prompt(module_title: &str, subtopic_title: &str, description: Option<&str>) -> String {
    let mut prompt = format!(
        "Generate in-depth markdown notes for the subtopic \"{}\" under the module \"{}\".",
        subtopic_title, module_title
    );
    if let Some(desc) = description.filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!("\nSubtopic summary: {}", desc));
    }
    prompt.push_str("\nInclude explanations, examples, code snippets, or math as needed.");
    prompt
}
