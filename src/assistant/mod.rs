//! The assistant layer: intent dispatch, proactive insights, quick actions
//! and the chat session.
//!
//! Everything here is derived from the in-memory snapshot by deterministic
//! rules. There is no model inference and no tool-call protocol.

mod actions;
mod chat;
mod dispatcher;
mod insights;

pub use actions::*;
pub use chat::*;
pub use dispatcher::*;
pub use insights::*;
