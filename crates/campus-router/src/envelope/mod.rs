//! Request and response envelopes exchanged with the transport.
//!
//! The transport builds a [`Request`] per inbound message, attaches the
//! authenticated session, and expects exactly one [`Response`] back carrying
//! the same [`RequestId`]. The correlation id is the only thing a transport
//! multiplexing many in-flight requests over one connection can use to match
//! replies to callers.

mod request;
mod response;

pub use self::request::{Request, RequestId};
pub use self::response::{Response, Status};
