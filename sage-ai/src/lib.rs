//! sage-ai: LLM engines and reply generation for InboxSage
//!
//! # Modules
//!
//! - [`llm`]: provider-agnostic [`LlmEngine`](llm::LlmEngine) trait with
//!   OpenAI, Ollama and mock implementations
//! - [`reply`]: the reply generation service
//!
//! # Example
//!
//! ```no_run
//! use sage_ai::llm::OpenAiLlm;
//! use sage_ai::reply::{ReplyGenerator, ReplyRequest, Tone};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), sage_ai::reply::ReplyError> {
//! let llm = Arc::new(OpenAiLlm::new("sk-...".to_string(), "gpt-4o-mini".to_string()));
//! let generator = ReplyGenerator::new(llm);
//!
//! let reply = generator
//!     .generate(ReplyRequest::new("Can we reschedule?").with_tone(Tone::Friendly))
//!     .await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

pub mod llm;
pub mod reply;

pub use llm::{LlmEngine, LlmResponse};
pub use reply::{GeneratedReply, GenerationSettings, ReplyError, ReplyGenerator, ReplyRequest, Tone};
