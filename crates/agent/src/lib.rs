//! Message routing for Atlas.
//!
//! Every routable inbound message goes through the same steps:
//!
//! 1. **Log** it to the message log
//! 2. **Count** it in the activity tracker
//! 3. **Parse** it into a [`Command`]
//! 4. **Reply** with a fixed text, a fetched fact, a stats summary, or the
//!    output of the AI response pipeline
//! 5. **Send** the reply back over the same channel

pub mod command;
pub mod dispatcher;
pub mod message_log;
pub mod pipeline;
pub mod replies;
pub mod runner;

#[cfg(test)]
mod test_helpers;

pub use command::Command;
pub use dispatcher::Dispatcher;
pub use message_log::{Direction, MessageLog};
pub use pipeline::{CompletionSettings, ResponsePipeline, error_reply};
pub use runner::MessageRunner;
