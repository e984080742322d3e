//! 课程数据结构
//!
//! 计划（Plan）在生成一次后只读；丰富后的子主题由所属模块持有，返回后不再修改。

use serde::{Deserialize, Serialize};

/// 课程计划：模块 / 子主题骨架
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub modules: Vec<PlanModule>,
}

/// 计划中的一个模块（一周）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanModule {
    pub module_title: String,
    #[serde(default)]
    pub module_description: Option<String>,
    #[serde(default)]
    pub week_number: Option<u32>,
    pub subtopics: Vec<PlanSubtopic>,
}

/// 计划中的一个子主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSubtopic {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// 测验题（单选）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    /// 检查题目结构：至少两个选项，答案必须原样出现在选项中
    pub fn check(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question 为空".to_string());
        }
        if self.options.len() < 2 {
            return Err(format!("options 至少需要 2 个，实际 {} 个", self.options.len()));
        }
        if !self.options.iter().any(|o| o == &self.answer) {
            return Err(format!("answer '{}' 不在 options 中", self.answer));
        }
        Ok(())
    }
}

/// 丰富后的子主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSubtopic {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detailed_notes_md: Option<String>,
    #[serde(default)]
    pub quiz_questions: Vec<QuizQuestion>,
}

/// 丰富后的模块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedModule {
    pub module_title: String,
    #[serde(default)]
    pub module_description: Option<String>,
    #[serde(default)]
    pub week_number: Option<u32>,
    pub subtopics: Vec<EnrichedSubtopic>,
}

impl EnrichedModule {
    /// 用计划模块的元信息和丰富后的子主题组装模块
    pub fn from_plan(module: &PlanModule, subtopics: Vec<EnrichedSubtopic>) -> Self {
        Self {
            module_title: module.module_title.clone(),
            module_description: module.module_description.clone(),
            week_number: module.week_number,
            subtopics,
        }
    }
}

/// 完整课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub modules: Vec<EnrichedModule>,
}

impl Course {
    pub fn subtopic_count(&self) -> usize {
        self.modules.iter().map(|m| m.subtopics.len()).sum()
    }

    pub fn quiz_question_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| m.subtopics.iter())
            .map(|s| s.quiz_questions.len())
            .sum()
    }
}

/// 最终输出：带课程信息外壳的课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseResponse {
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_description: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub total_estimated_duration_minutes: Option<u32>,
    pub course_duration_weeks: usize,
    pub modules: Vec<EnrichedModule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: "哪种排序是稳定的？".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_quiz_answer_must_be_an_option() {
        assert!(question(&["归并排序", "快速排序"], "归并排序").check().is_ok());

        let err = question(&["归并排序", "快速排序"], "A").check().unwrap_err();
        assert!(err.contains("不在 options 中"));
    }

    #[test]
    fn test_quiz_needs_two_options() {
        let err = question(&["归并排序"], "归并排序").check().unwrap_err();
        assert!(err.contains("至少需要 2 个"));
    }

    #[test]
    fn test_nullable_fields_accept_missing_and_null() {
        let json = r#"{
            "modules": [
                {
                    "module_title": "Sorting",
                    "module_description": null,
                    "subtopics": [
                        { "title": "Bubble sort" },
                        { "title": "Merge sort", "description": null, "detailed_notes_md": null }
                    ]
                }
            ]
        }"#;

        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.modules[0].week_number, None);
        assert_eq!(course.subtopic_count(), 2);
        assert_eq!(course.quiz_question_count(), 0);
    }
}
