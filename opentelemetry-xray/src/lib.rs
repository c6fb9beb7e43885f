//! This crate provides integration with the [AWS X-Ray] trace format.
//!
//! # Components
//!
//! ### AWS X-Ray Id Generator
//! [`XrayIdGenerator`] creates trace IDs whose first 4 bytes carry the current Unix time, as
//! X-Ray requires. Install it on the SDK tracer provider.
//!
//! ### AWS X-Ray Propagator
//! [`XrayPropagator`] propagates tracing information from upstream services to downstream
//! services through the `X-Amzn-Trace-Id` header.
//!
//! ### Log correlation
//! [`XrayLogMetadata`](logs::XrayLogMetadata) exposes the active trace and span ID in X-Ray
//! formatting, to be attached to log records.
//!
//! ### Quick start
//! ```no_run
//! use opentelemetry::{global, trace::{Tracer, TracerProvider as _}};
//! use opentelemetry_sdk::trace::SdkTracerProvider;
//! use opentelemetry_xray::{XrayIdGenerator, XrayPropagator};
//! use std::collections::HashMap;
//!
//! // Set the global propagator to X-Ray propagator
//! global::set_text_map_propagator(XrayPropagator::default());
//! let provider = SdkTracerProvider::builder()
//!     .with_id_generator(XrayIdGenerator::default())
//!     .build();
//! let tracer = provider.tracer("readme_example");
//!
//! let mut headers: HashMap<String, String> = HashMap::new();
//! tracer.in_span("doing_work", |cx| {
//!     global::get_text_map_propagator(|propagator| {
//!         // Set X-Ray tracing header in the outgoing request headers
//!         propagator.inject_context(&cx, &mut headers);
//!     })
//! });
//! println!("Headers: {headers:?}");
//! ```
//!
//! [AWS X-Ray]: https://docs.aws.amazon.com/xray/latest/devguide/aws-xray.html
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-rust/main/assets/logo.svg"
)]

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub mod logs;
#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub mod trace;

#[cfg(feature = "trace")]
pub use trace::{XrayIdGenerator, XrayPropagator};
