//! Docent core: configuration, the retrieval-QA orchestrator, the service that owns the
//! corpus index, and the chat history shared by front ends.

pub mod attribution;
pub mod channel;
pub mod config;
pub mod error;
pub mod history;
pub mod qa;
pub mod service;
pub mod session;

pub use attribution::display_source;
pub use channel::{Channel, ChannelError, ChannelMessage};
pub use config::Config;
pub use error::{AskError, InitializationError};
pub use history::{ChatHistory, ChatTurn, Speaker};
pub use qa::{Answer, NO_CONTEXT_MARKER, QaSettings, RetrievalQa};
pub use service::{IndexStats, QuestionAnswerer, RagService, Readiness};
