//! 课程校验 - 业务能力层
//!
//! 只负责把组装好的 `Course` 校验并包装为最终输出，不做任何自动修正。

use crate::error::ValidationError;
use crate::models::course::{Course, CourseResponse};

/// 没有模块标题可用时的课程名
const DEFAULT_LESSON_TITLE: &str = "Course";

/// 校验课程结构并生成最终输出
///
/// 检查项：
/// - 至少一个模块
/// - 模块标题、子主题标题非空
/// - 每道测验题至少两个选项，答案原样出现在选项中
///
/// 降级输出（笔记为空、测验为空）是合法的。
pub fn validate_course(course: Course) -> Result<CourseResponse, ValidationError> {
    if course.modules.is_empty() {
        return Err(ValidationError::EmptyCourse);
    }

    for (m_idx, module) in course.modules.iter().enumerate() {
        let module_no = m_idx + 1;
        if module.module_title.trim().is_empty() {
            return Err(ValidationError::BlankModuleTitle { module: module_no });
        }

        for (s_idx, subtopic) in module.subtopics.iter().enumerate() {
            let subtopic_no = s_idx + 1;
            if subtopic.title.trim().is_empty() {
                return Err(ValidationError::BlankSubtopicTitle {
                    module: module_no,
                    subtopic: subtopic_no,
                });
            }

            for (q_idx, question) in subtopic.quiz_questions.iter().enumerate() {
                question
                    .check()
                    .map_err(|reason| ValidationError::InvalidQuizQuestion {
                        module: module_no,
                        subtopic: subtopic_no,
                        question: q_idx + 1,
                        reason,
                    })?;
            }
        }
    }

    let lesson_title = course
        .modules
        .first()
        .map(|m| m.module_title.clone())
        .unwrap_or_else(|| DEFAULT_LESSON_TITLE.to_string());

    Ok(CourseResponse {
        lesson_title,
        lesson_description: None,
        target_audience: None,
        total_estimated_duration_minutes: None,
        course_duration_weeks: course.modules.len(),
        modules: course.modules,
    })
}
