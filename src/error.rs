//! 错误类型
//!
//! 错误分为三类：
//! - `LlmError`：单次模型调用失败（网络、非 2xx、超时、结构不匹配），由重试层在本地恢复
//! - `RetryExhausted`：某个阶段的所有尝试都失败，向上传播
//! - `ValidationError`：组装好的课程不符合输出结构，作为本次运行的终止错误

use std::time::Duration;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 单次 LLM 调用失败
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),

    /// 某个阶段重试耗尽
    #[error("{0}")]
    RetryExhausted(#[from] RetryExhausted<LlmError>),

    /// 课程结构校验失败
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),

    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 子主题任务池已关闭
    #[error("子主题任务池已关闭: {0}")]
    PoolClosed(#[from] tokio::sync::AcquireError),

    /// 输入内容不合法
    #[error("输入错误: {0}")]
    InvalidInput(String),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败（网络错误或非成功状态码）
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 构建请求失败
    #[error("构建LLM请求失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// 调用超时
    #[error("LLM调用超时 (模型: {model}, 超时: {timeout:?})")]
    Timeout { model: String, timeout: Duration },

    /// 结构化输出与 schema 不匹配
    #[error("LLM返回结构不符合 schema `{schema}`: {reason}")]
    SchemaMismatch { schema: String, reason: String },
}

/// 重试耗尽
///
/// 携带阶段名称、尝试次数以及最后一次失败的错误
#[derive(Debug, Error)]
#[error("阶段 `{stage}` 在 {attempts} 次尝试后仍然失败: {last_error}")]
pub struct RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    pub stage: String,
    pub attempts: u32,
    #[source]
    pub last_error: E,
}

/// 课程结构校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 课程没有任何模块
    #[error("课程没有任何模块")]
    EmptyCourse,

    /// 模块标题为空
    #[error("第 {module} 个模块标题为空")]
    BlankModuleTitle { module: usize },

    /// 子主题标题为空
    #[error("模块 {module} 的第 {subtopic} 个子主题标题为空")]
    BlankSubtopicTitle { module: usize, subtopic: usize },

    /// 测验题目不合法
    #[error("模块 {module} 子主题 {subtopic} 的第 {question} 道测验题不合法: {reason}")]
    InvalidQuizQuestion {
        module: usize,
        subtopic: usize,
        question: usize,
        reason: String,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl LlmError {
    /// 创建 LLM API 调用错误
    pub fn api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建 schema 不匹配错误
    pub fn schema_mismatch(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        LlmError::SchemaMismatch {
            schema: schema.into(),
            reason: reason.into(),
        }
    }
}

impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        LlmError::RequestBuildFailed {
            source: Box::new(err),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
