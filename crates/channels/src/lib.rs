//! Messaging transports for Atlas.
//!
//! Each channel owns a session with a messaging network and relays text
//! to/from the router. Channels are trait-based and platform-agnostic.
//!
//! Available channels:
//! - **CLI**: Interactive terminal chat (stdin/stdout)
//! - **Loopback**: In-process inject/outbox transport for embedding and tests
//!
//! The **Supervisor** keeps a channel session alive with bounded reconnects.

pub mod cli;
pub mod loopback;
pub mod supervisor;

pub use cli::CliChannel;
pub use loopback::LoopbackChannel;
pub use supervisor::{InboundHandler, ReconnectPolicy, Supervisor};
