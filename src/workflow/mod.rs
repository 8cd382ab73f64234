pub mod generation_ctx;
pub mod generation_flow;

pub use generation_ctx::GenerationCtx;
pub use generation_flow::{GenerationFlow, GenerationOutcome};
