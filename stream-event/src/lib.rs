//! Graph mutation event protocol: type + payload + envelope.
//!
//! This crate defines the wire shape of one graph notification and envelope injection.
//! It does not depend on topicgraph; topicgraph maps its `GraphEvent` into
//! [`ProtocolEvent`] and renderers consume the JSON produced by [`to_json`].

pub mod envelope;
pub mod event;

pub use envelope::{to_json, Envelope, EnvelopeState};
pub use event::ProtocolEvent;
