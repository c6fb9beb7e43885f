//! AWS X-Ray trace context: id generation and `X-Amzn-Trace-Id` propagation.
mod error;
pub mod header;
mod id_generator;
mod propagator;

pub use error::{ParseErrorReason, TraceHeaderParseError};
pub use header::XrayTraceId;
pub use id_generator::{Clock, SystemClock, XrayIdGenerator};
pub use propagator::XrayPropagator;
