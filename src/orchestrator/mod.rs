pub mod cli_mapper;
pub mod prompts;
pub mod rewriter;

pub use cli_mapper::{LlmArg, LlmProvider};
pub use rewriter::{CommandRewriter, Rewriter};
