//! Conversation memory
//!
//! [`ConversationState`] is the working memory handed to the model on every step.
//! It only grows; bounding what the model sees is done with
//! [`ConversationState::window`].

mod conversation;

pub use conversation::ConversationState;
