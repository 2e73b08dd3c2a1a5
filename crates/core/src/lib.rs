//! # Atlas Core
//!
//! Domain types, collaborator traits, and error definitions for the Atlas
//! chat bridge. Every external collaborator (completion API, messaging
//! transport, fact APIs) is a trait here; implementations live in their
//! respective crates so the routing core can be tested against stubs.

pub mod error;
pub mod message;
pub mod provider;
pub mod channel;
pub mod fact;

// Re-export key types at crate root for ergonomics
pub use error::{ChannelError, FactError, ProviderError};
pub use message::{ConversationId, Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use channel::{Channel, InboundMessage};
pub use fact::{Fact, FactSource};
