//! Backend adapters
//!
//! Concrete [`BackendAdapter`](consensus_application::BackendAdapter)
//! implementations and the factory that builds a registry from configuration.
//! Each adapter hides its wire format completely; the orchestrator only ever
//! sees a [`RawReply`](consensus_domain::RawReply).

mod error;
mod factory;
mod fixture;
mod http;
mod wire;

pub use error::BackendError;
pub use factory::BackendFactory;
pub use fixture::FixtureBackendAdapter;
pub use http::HttpBackendAdapter;
pub use wire::{ANTHROPIC_VERSION, WireFormat};
