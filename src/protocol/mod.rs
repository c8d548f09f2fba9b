//! Wire shapes on both sides of the relay.
//!
//! `device` is the simplified envelope spoken by the firmware; `spark` is the
//! chat-completions dialect of the Spark HTTP endpoint.

pub mod device;
pub mod spark;

pub use device::{InboundRequest, OutboundResponse};
pub use spark::{ChatMessage, UpstreamRequest};
