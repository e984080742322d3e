//! LLM 服务 - 业务能力层
//!
//! `ModelGateway` 的默认实现，只负责"调用一次模型"，不关心流程，不重试。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//! - 结构化调用通过 `response_format = json_schema` 约束输出

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::services::model_gateway::{CompletionMode, CompletionRequest, ModelGateway};

/// LLM 服务
///
/// 职责：
/// - 把 `CompletionRequest` 转换为 chat completion 请求
/// - 为每次调用加上超时
/// - 把所有失败统一为 `LlmError`
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let mut openai_config = OpenAIConfig::new().with_api_base(&config.llm_api_base_url);
        // 未配置密钥时保留 async-openai 从 OPENAI_API_KEY 读取的默认值
        if let Some(api_key) = configured_api_key(config) {
            openai_config = openai_config.with_api_key(api_key);
        }

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: config.request_timeout(),
        }
    }

    /// 构建 chat completion 请求
    ///
    /// # 参数
    /// - `request`: 网关请求（系统消息、用户消息、调用模式）
    ///
    /// # 返回
    /// 返回可直接发送的请求体
    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = &request.system {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        if let CompletionMode::Structured(schema) = &request.mode {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    schema: Some(schema.schema.clone()),
                    strict: Some(true),
                },
            });
        }

        Ok(builder.build()?)
    }
}

/// 配置中非空的 API 密钥
fn configured_api_key(config: &Config) -> Option<&str> {
    let key = config.llm_api_key.trim();
    (!key.is_empty()).then_some(key)
}

#[async_trait]
impl ModelGateway for LlmService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!(
            "调用 LLM API，模型: {}，结构化: {}",
            self.model_name,
            request.is_structured()
        );
        debug!("用户消息长度: {} 字符", request.prompt.len());

        let chat_request = self.build_request(request)?;

        // 调用 API（带超时）
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时: {:?}", self.timeout);
                LlmError::Timeout {
                    model: self.model_name.clone(),
                    timeout: self.timeout,
                }
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                LlmError::api_failed(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
