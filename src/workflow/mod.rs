pub mod subtopic_ctx;
pub mod subtopic_flow;

pub use subtopic_ctx::SubtopicCtx;
pub use subtopic_flow::{SubtopicFlow, SubtopicOutcome};
