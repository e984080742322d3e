//! 模型网关 - 业务能力层
//!
//! 对"调用一次文本生成模型"的抽象：自由文本 / 按 schema 约束的结构化输出。
//! 网关本身不重试，所有失败都以 `LlmError` 返回给调用方。

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::LlmError;
use crate::models::schema::{SchemaDescriptor, StructuredOutput};

/// 调用模式
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionMode {
    /// 自由文本
    Freeform,
    /// 按 schema 约束的结构化输出
    Structured(SchemaDescriptor),
}

/// 一次模型调用请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub mode: CompletionMode,
}

impl CompletionRequest {
    pub fn freeform(system: Option<&str>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.map(str::to_string),
            prompt: prompt.into(),
            mode: CompletionMode::Freeform,
        }
    }

    pub fn structured(
        system: Option<&str>,
        prompt: impl Into<String>,
        schema: SchemaDescriptor,
    ) -> Self {
        Self {
            system: system.map(str::to_string),
            prompt: prompt.into(),
            mode: CompletionMode::Structured(schema),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.mode, CompletionMode::Structured(_))
    }
}

/// 远端模型服务
///
/// 结构化模式下返回的是原始 JSON 文本，由 `generate_structured` 负责解析和校验。
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// 模型名称（用于日志）
    fn model_name(&self) -> &str;
}

/// 自由文本调用
pub async fn generate_text<G>(
    gateway: &G,
    system: Option<&str>,
    prompt: &str,
) -> Result<String, LlmError>
where
    G: ModelGateway + ?Sized,
{
    let request = CompletionRequest::freeform(system, prompt);
    let content = gateway.complete(&request).await?;

    if content.trim().is_empty() {
        return Err(LlmError::EmptyContent {
            model: gateway.model_name().to_string(),
        });
    }

    Ok(content)
}

/// 结构化调用：解析为 `T` 并执行语义校验
pub async fn generate_structured<T, G>(
    gateway: &G,
    system: Option<&str>,
    prompt: &str,
    schema: SchemaDescriptor,
) -> Result<T, LlmError>
where
    T: StructuredOutput,
    G: ModelGateway + ?Sized,
{
    let schema_name = schema.name.clone();
    let request = CompletionRequest::structured(system, prompt, schema);
    let content = gateway.complete(&request).await?;

    parse_structured(&schema_name, &content)
}

/// 把模型返回的 JSON 文本解析为 `T`
pub fn parse_structured<T: StructuredOutput>(schema_name: &str, content: &str) -> Result<T, LlmError> {
    let json = extract_json(content);
    if json.is_empty() {
        return Err(LlmError::schema_mismatch(schema_name, "返回内容为空"));
    }

    let value: T = serde_json::from_str(json)
        .map_err(|e| LlmError::schema_mismatch(schema_name, format!("JSON 解析失败: {}", e)))?;

    value
        .validate()
        .map_err(|reason| LlmError::schema_mismatch(schema_name, reason))?;

    debug!("结构化输出解析成功: {}", schema_name);
    Ok(value)
}

/// 去掉部分兼容服务会包裹在 JSON 外面的 markdown 代码块
fn extract_json(content: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n(.*?)\n?\s*```\s*$").ok()
    });

    match fence
        .as_ref()
        .and_then(|re| re.captures(content))
        .and_then(|c| c.get(1))
    {
        Some(inner) => inner.as_str().trim(),
        None => content.trim(),
    }
}
