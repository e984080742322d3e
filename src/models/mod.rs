pub mod course;
pub mod loaders;
pub mod raw_text;
pub mod schema;

pub use course::{
    Course, CourseResponse, EnrichedModule, EnrichedSubtopic, Plan, PlanModule, PlanSubtopic,
    QuizQuestion,
};
pub use loaders::load_text_file;
pub use raw_text::RawText;
pub use schema::{QuizSet, SchemaDescriptor, StructuredOutput};
