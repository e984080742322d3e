//! 集成测试共用的脚本化模型网关

#![allow(dead_code)]

use async_trait::async_trait;
use course_generator::services::{CompletionMode, CompletionRequest, ModelGateway};
use course_generator::{Config, LlmError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 按请求内容返回预设结果的网关
///
/// - 计划请求（schema `course_plan`）返回 `plan_json`
/// - 笔记请求（自由文本）返回以子主题标题开头的 markdown
/// - 测验请求（schema `subtopic_quiz`）返回 3 道题
///
/// 每次笔记/测验调用都会在 `events` 中记录开始和结束。
pub struct ScriptedGateway {
    plan_json: Option<String>,
    delays: HashMap<String, Duration>,
    failing_notes: HashSet<String>,
    failing_quiz: HashSet<String>,
    pub plan_calls: AtomicUsize,
    pub notes_calls: AtomicUsize,
    pub quiz_calls: AtomicUsize,
    pub events: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(plan_json: impl Into<String>) -> Self {
        Self {
            plan_json: Some(plan_json.into()),
            delays: HashMap::new(),
            failing_notes: HashSet::new(),
            failing_quiz: HashSet::new(),
            plan_calls: AtomicUsize::new(0),
            notes_calls: AtomicUsize::new(0),
            quiz_calls: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    /// 计划阶段每次都失败
    pub fn failing_plan() -> Self {
        Self {
            plan_json: None,
            ..Self::new("")
        }
    }

    /// 指定子主题的笔记调用耗时
    pub fn with_delay(mut self, subtopic: &str, delay: Duration) -> Self {
        self.delays.insert(subtopic.to_string(), delay);
        self
    }

    pub fn with_failing_notes(mut self, subtopic: &str) -> Self {
        self.failing_notes.insert(subtopic.to_string());
        self
    }

    pub fn with_failing_quiz(mut self, subtopic: &str) -> Self {
        self.failing_quiz.insert(subtopic.to_string());
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn failure(&self) -> LlmError {
        LlmError::EmptyContent {
            model: "scripted".to_string(),
        }
    }
}

/// 提示词中第一个引号内的内容即子主题标题
fn quoted_subtopic(prompt: &str) -> String {
    prompt.split('"').nth(1).unwrap_or_default().to_string()
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        match &request.mode {
            CompletionMode::Structured(schema) if schema.name == "course_plan" => {
                self.plan_calls.fetch_add(1, Ordering::SeqCst);
                self.plan_json.clone().ok_or_else(|| self.failure())
            }
            CompletionMode::Structured(_) => {
                self.quiz_calls.fetch_add(1, Ordering::SeqCst);
                let subtopic = quoted_subtopic(&request.prompt);
                self.record(format!("quiz:{}", subtopic));
                if self.failing_quiz.contains(&subtopic) {
                    return Err(self.failure());
                }
                Ok(quiz_json(&subtopic))
            }
            CompletionMode::Freeform => {
                self.notes_calls.fetch_add(1, Ordering::SeqCst);
                let subtopic = quoted_subtopic(&request.prompt);
                self.record(format!("start:{}", subtopic));
                if let Some(delay) = self.delays.get(&subtopic) {
                    tokio::time::sleep(*delay).await;
                }
                self.record(format!("end:{}", subtopic));
                if self.failing_notes.contains(&subtopic) {
                    return Err(self.failure());
                }
                Ok(format!("# {}\n\nWorked example for {}.", subtopic, subtopic))
            }
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn quiz_json(subtopic: &str) -> String {
    serde_json::json!({
        "quiz_questions": [
            {
                "question": format!("What is the core idea of {}?", subtopic),
                "options": ["Compare neighbours", "Divide and merge", "Partition by pivot"],
                "answer": "Divide and merge"
            },
            {
                "question": format!("Worst-case complexity of {}?", subtopic),
                "options": ["O(n)", "O(n log n)", "O(n^2)"],
                "answer": "O(n^2)"
            },
            {
                "question": format!("Is {} stable?", subtopic),
                "options": ["Yes", "No"],
                "answer": "Yes"
            }
        ]
    })
    .to_string()
}

/// 生成计划 JSON：每个模块给出标题和子主题列表
pub fn plan_json(modules: &[(&str, &[&str])]) -> String {
    let modules: Vec<_> = modules
        .iter()
        .enumerate()
        .map(|(idx, (title, subtopics))| {
            serde_json::json!({
                "module_title": title,
                "module_description": format!("Week {} overview", idx + 1),
                "week_number": idx + 1,
                "subtopics": subtopics
                    .iter()
                    .map(|s| serde_json::json!({ "title": s, "description": format!("About {}", s) }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::json!({ "modules": modules }).to_string()
}

/// 测试用配置：无节流，重试间隔很短
pub fn test_config() -> Config {
    Config {
        max_retry_attempts: 2,
        retry_delay_ms: 10,
        pacing_delay_ms: 0,
        max_concurrent_subtopics: 3,
        module_count: 2,
        ..Config::default()
    }
}
