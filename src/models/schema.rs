//! 结构化输出的 schema 描述
//!
//! 结构化调用 = 提示词 + `SchemaDescriptor`，返回值反序列化为实现了
//! `StructuredOutput` 的类型并经过 `validate` 校验。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::course::{Plan, QuizQuestion};

/// 每个子主题的测验题数量范围
pub const QUIZ_MIN_QUESTIONS: usize = 3;
pub const QUIZ_MAX_QUESTIONS: usize = 5;

/// 每个模块的子主题数量范围
pub const PLAN_MIN_SUBTOPICS: usize = 3;
pub const PLAN_MAX_SUBTOPICS: usize = 5;

/// 结构化调用的目标 schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    /// schema 名称（只能包含字母、数字、下划线和横线）
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema 文档
    pub schema: Value,
}

/// 可以作为结构化调用结果的类型
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    /// 反序列化之后的语义校验，失败时返回原因
    fn validate(&self) -> Result<(), String>;
}

/// 测验阶段的结构化结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSet {
    pub quiz_questions: Vec<QuizQuestion>,
}

impl StructuredOutput for Plan {
    fn validate(&self) -> Result<(), String> {
        if self.modules.is_empty() {
            return Err("modules 为空".to_string());
        }
        for (m_idx, module) in self.modules.iter().enumerate() {
            if module.module_title.trim().is_empty() {
                return Err(format!("第 {} 个模块的 module_title 为空", m_idx + 1));
            }
            if module.subtopics.is_empty() {
                return Err(format!("模块 '{}' 没有子主题", module.module_title));
            }
            if let Some(s_idx) = module.subtopics.iter().position(|s| s.title.trim().is_empty()) {
                return Err(format!(
                    "模块 '{}' 的第 {} 个子主题 title 为空",
                    module.module_title,
                    s_idx + 1
                ));
            }
        }
        Ok(())
    }
}

impl StructuredOutput for QuizSet {
    fn validate(&self) -> Result<(), String> {
        let count = self.quiz_questions.len();
        if !(QUIZ_MIN_QUESTIONS..=QUIZ_MAX_QUESTIONS).contains(&count) {
            return Err(format!(
                "quiz_questions 数量应为 {}-{}，实际 {}",
                QUIZ_MIN_QUESTIONS, QUIZ_MAX_QUESTIONS, count
            ));
        }
        for (idx, question) in self.quiz_questions.iter().enumerate() {
            question
                .check()
                .map_err(|reason| format!("第 {} 道题: {}", idx + 1, reason))?;
        }
        Ok(())
    }
}

/// 课程计划 schema
pub fn plan_schema(module_count: usize) -> SchemaDescriptor {
    let subtopic = json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": ["string", "null"] }
        },
        "required": ["title", "description"],
        "additionalProperties": false
    });

    let module = json!({
        "type": "object",
        "properties": {
            "module_title": { "type": "string", "description": "The week's topic" },
            "module_description": { "type": ["string", "null"], "description": "A brief summary" },
            "week_number": { "type": ["integer", "null"], "description": "The week index, starting at 1" },
            "subtopics": {
                "type": "array",
                "items": subtopic,
                "minItems": PLAN_MIN_SUBTOPICS,
                "maxItems": PLAN_MAX_SUBTOPICS
            }
        },
        "required": ["module_title", "module_description", "week_number", "subtopics"],
        "additionalProperties": false
    });

    SchemaDescriptor {
        name: "course_plan".to_string(),
        description: Some("A list of modules with subtopics".to_string()),
        schema: json!({
            "type": "object",
            "properties": {
                "modules": {
                    "type": "array",
                    "items": module,
                    "minItems": module_count,
                    "maxItems": module_count
                }
            },
            "required": ["modules"],
            "additionalProperties": false
        }),
    }
}

/// 测验 schema
pub fn quiz_schema() -> SchemaDescriptor {
    SchemaDescriptor {
        name: "subtopic_quiz".to_string(),
        description: Some("Multiple choice quiz questions for one subtopic".to_string()),
        schema: json!({
            "type": "object",
            "properties": {
                "quiz_questions": {
                    "type": "array",
                    "minItems": QUIZ_MIN_QUESTIONS,
                    "maxItems": QUIZ_MAX_QUESTIONS,
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": { "type": "string", "description": "A quiz question related to the subtopic" },
                            "options": {
                                "type": "array",
                                "items": { "type": "string" },
                                "minItems": 2,
                                "description": "Multiple choice options"
                            },
                            "answer": { "type": "string", "description": "The correct answer, copied verbatim from options" }
                        },
                        "required": ["question", "options", "answer"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["quiz_questions"],
            "additionalProperties": false
        }),
    }
}
