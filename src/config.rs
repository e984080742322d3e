use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 未设置 `COURSE_CONFIG` 时尝试读取的配置文件
const DEFAULT_CONFIG_FILE: &str = "course.toml";

/// 子主题阶段重试耗尽后的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtopicFailurePolicy {
    /// 任一子主题失败则整个运行失败
    #[default]
    FailRun,
    /// 只让该子主题降级：笔记为空 / 测验为空
    Degrade,
}

impl std::str::FromStr for SubtopicFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_run" | "fail" => Ok(Self::FailRun),
            "degrade" => Ok(Self::Degrade),
            other => Err(ConfigError::InvalidValue {
                field: "subtopic_failure_policy".to_string(),
                reason: format!("未知策略 '{}'，可选值: fail_run / degrade", other),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    /// 单次调用最大输出 token 数
    pub llm_max_tokens: u32,
    /// 单次调用超时（秒）
    pub request_timeout_secs: u64,
    // --- 生成流程配置 ---
    /// 每个阶段的最大尝试次数
    pub max_retry_attempts: u32,
    /// 两次尝试之间的等待时间（毫秒）
    pub retry_delay_ms: u64,
    /// 每个阶段完成后的节流等待（毫秒）
    pub pacing_delay_ms: u64,
    /// 同时处理的子主题数量
    pub max_concurrent_subtopics: usize,
    /// 课程计划的周数（模块数）
    pub module_count: usize,
    /// 输入文本最大字符数
    pub max_input_chars: usize,
    pub subtopic_failure_policy: SubtopicFailurePolicy,
    // --- 输入输出 ---
    pub input_file: String,
    pub output_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 4096,
            request_timeout_secs: 120,
            max_retry_attempts: 5,
            retry_delay_ms: 1000,
            pacing_delay_ms: 500,
            max_concurrent_subtopics: 3,
            module_count: 10,
            max_input_chars: 10_000,
            subtopic_failure_policy: SubtopicFailurePolicy::FailRun,
            input_file: "input.txt".to_string(),
            output_file: "course.json".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按 默认值 → TOML 文件 → 环境变量 的顺序加载配置
    ///
    /// 配置文件路径取自 `COURSE_CONFIG`，未设置时尝试当前目录下的 `course.toml`。
    /// 显式指定的文件不存在时报错；默认的 `course.toml` 不存在时跳过。
    pub fn load() -> Result<Self, ConfigError> {
        let base = match resolve_config_path(env_string("COURSE_CONFIG"))? {
            Some(path) => Self::from_toml_file(&path)?,
            None => Self::default(),
        };

        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 只使用环境变量覆盖默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidValue {
            field: "COURSE_CONFIG".to_string(),
            reason: format!("无法读取配置文件 {}: {}", path, e),
        })?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::FileParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.llm_max_tokens),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            max_retry_attempts: env_parse("MAX_RETRY_ATTEMPTS", "u32")?
                .unwrap_or(self.max_retry_attempts),
            retry_delay_ms: env_parse("RETRY_DELAY_MS", "u64")?.unwrap_or(self.retry_delay_ms),
            pacing_delay_ms: env_parse("PACING_DELAY_MS", "u64")?.unwrap_or(self.pacing_delay_ms),
            max_concurrent_subtopics: env_parse("MAX_CONCURRENT_SUBTOPICS", "usize")?
                .unwrap_or(self.max_concurrent_subtopics),
            module_count: env_parse("MODULE_COUNT", "usize")?.unwrap_or(self.module_count),
            max_input_chars: env_parse("MAX_INPUT_CHARS", "usize")?
                .unwrap_or(self.max_input_chars),
            subtopic_failure_policy: match env_string("SUBTOPIC_FAILURE_POLICY") {
                Some(v) => v.parse()?,
                None => self.subtopic_failure_policy,
            },
            input_file: env_string("INPUT_FILE").unwrap_or(self.input_file),
            output_file: env_string("OUTPUT_FILE").unwrap_or(self.output_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&str, bool, &str); 5] = [
            ("max_retry_attempts", self.max_retry_attempts >= 1, "至少为 1"),
            ("max_concurrent_subtopics", self.max_concurrent_subtopics >= 1, "至少为 1"),
            ("module_count", self.module_count >= 1, "至少为 1"),
            ("max_input_chars", self.max_input_chars >= 1, "至少为 1"),
            ("request_timeout_secs", self.request_timeout_secs >= 1, "至少为 1 秒"),
        ];

        for (field, ok, reason) in checks {
            if !ok {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        None => Ok(None),
    }
}

/// 确定要读取的配置文件
///
/// # 参数
/// - `explicit`: `COURSE_CONFIG` 的值
///
/// # 返回
/// 需要读取的路径；没有可用的配置文件时返回 `None`
fn resolve_config_path(explicit: Option<String>) -> Result<Option<String>, ConfigError> {
    match explicit {
        Some(path) if Path::new(&path).exists() => Ok(Some(path)),
        Some(path) => Err(ConfigError::InvalidValue {
            field: "COURSE_CONFIG".to_string(),
            reason: format!("配置文件不存在: {}", path),
        }),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Ok(Some(DEFAULT_CONFIG_FILE.to_string()))
        }
        None => Ok(None),
    }
}
