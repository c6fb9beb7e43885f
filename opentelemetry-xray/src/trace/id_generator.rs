//! X-Ray compatible id generation.
use opentelemetry::otel_warn;
use opentelemetry::trace::{SpanId, TraceId};
use opentelemetry_sdk::trace::IdGenerator;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time used to stamp new trace IDs.
///
/// Any `Fn() -> u32` closure is a `Clock`, which makes it easy to pin the
/// time in tests.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_unix_secs(&self) -> u32;
}

impl<F> Clock for F
where
    F: Fn() -> u32 + Send + Sync,
{
    fn now_unix_secs(&self) -> u32 {
        self()
    }
}

/// [`Clock`] reading the system wall clock.
///
/// Times before the epoch read as `0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    _private: (),
}

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or(0)
    }
}

/// Generates trace and span IDs in an [X-Ray compatible format][xray-trace-id].
///
/// The first 4 bytes of every trace ID hold the current Unix time in seconds
/// (big-endian), the remaining 12 bytes are random. Span IDs are fully
/// random.
///
/// The random number generator is kept behind a lock, so one generator can be
/// shared by every thread of a tracer provider. By default it is a [`StdRng`]
/// seeded from the operating system.
///
/// ## Example
///
/// ```
/// use opentelemetry_sdk::trace::SdkTracerProvider;
/// use opentelemetry_xray::trace::XrayIdGenerator;
///
/// let provider = SdkTracerProvider::builder()
///     .with_id_generator(XrayIdGenerator::default())
///     .build();
/// # drop(provider);
/// ```
///
/// [xray-trace-id]: https://docs.aws.amazon.com/xray/latest/devguide/xray-api-sendingdata.html#xray-api-traceids
pub struct XrayIdGenerator<R = StdRng> {
    rng: Mutex<R>,
    clock: Box<dyn Clock>,
}

impl XrayIdGenerator<StdRng> {
    /// Create a generator backed by an OS-seeded [`StdRng`] and the system clock.
    pub fn new() -> Self {
        XrayIdGenerator::from_rng(StdRng::from_os_rng())
    }
}

impl Default for XrayIdGenerator<StdRng> {
    fn default() -> Self {
        XrayIdGenerator::new()
    }
}

impl<R: RngCore + Send> XrayIdGenerator<R> {
    /// Create a generator drawing random bits from `rng`.
    pub fn from_rng(rng: R) -> Self {
        XrayIdGenerator {
            rng: Mutex::new(rng),
            clock: Box::new(SystemClock::default()),
        }
    }

    /// Use `clock` to read the timestamp of new trace IDs.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn rng(&self) -> MutexGuard<'_, R> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            otel_warn!(name: "XrayIdGenerator.RngLockPoisoned");
            poisoned.into_inner()
        })
    }
}

impl<R> fmt::Debug for XrayIdGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XrayIdGenerator").finish_non_exhaustive()
    }
}

impl<R: RngCore + Send> IdGenerator for XrayIdGenerator<R> {
    fn new_trace_id(&self) -> TraceId {
        let timestamp = self.clock.now_unix_secs();
        let (high, low) = {
            let mut rng = self.rng();
            (rng.next_u32(), rng.next_u64())
        };

        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..8].copy_from_slice(&high.to_be_bytes());
        bytes[8..].copy_from_slice(&low.to_be_bytes());
        TraceId::from_bytes(bytes)
    }

    fn new_span_id(&self) -> SpanId {
        SpanId::from_bytes(self.rng().next_u64().to_be_bytes())
    }
}
