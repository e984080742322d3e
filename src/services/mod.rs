pub mod course_validator;
pub mod limiter;
pub mod llm_service;
pub mod model_gateway;
pub mod notes_service;
pub mod plan_service;
pub mod quiz_service;
pub mod retry;

pub use course_validator::validate_course;
pub use limiter::SubtopicPool;
pub use llm_service::LlmService;
pub use model_gateway::{
    generate_structured, generate_text, CompletionMode, CompletionRequest, ModelGateway,
};
pub use notes_service::NotesService;
pub use plan_service::PlanService;
pub use quiz_service::QuizService;
pub use retry::{with_retry, RetryPolicy, RetryState};
