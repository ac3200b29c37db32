//! API module for kaiwa-core.
//!
//! Request building, SSE stream decoding, and completion dispatch,
//! decoupled from presentation concerns through the `ResponseSink`
//! trait.

pub mod request;
pub mod send;
pub mod sink;
pub mod stream;

pub use request::build_request_body;
pub use send::{send_blocking, send_streaming};
pub use sink::{CollectingSink, ResponseEvent, ResponseSink};
pub use stream::{SseDecoder, StreamEvent, Usage};
