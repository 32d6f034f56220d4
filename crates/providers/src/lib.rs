pub mod assistant;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod prompts;

pub use assistant::{Assistant, AssistantClient, Reply, ReplySource};
pub use error::{AssistantError, ErrorKind};
pub use fallback::{FallbackCategory, FallbackResponder};
