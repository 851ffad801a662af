#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

//! Clock abstraction used by the dataway SDK.
//!
//! Everything that needs the current time asks a [`TimeProvider`] for it, so
//! tests can pin the clock with a [`MockProvider`].

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use std::time::Duration;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// `Mon, 02 Jan 2006 15:04:05 GMT`
const RFC1123_GMT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A UTC Timestamp returned by a [`TimeProvider`]
///
/// Purposefully does not provide [`std::convert::From`] implementations
/// as intended to be an opaque type returned by a `TimeProvider` - the construction methods
/// provided are intended for points, serialization and tests
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Time(DateTime<Utc>);

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Time {
    pub const MAX: Self = Self(DateTime::<Utc>::MAX_UTC);
    pub const MIN: Self = Self(DateTime::<Utc>::MIN_UTC);

    /// Makes a new `Time` from the number of non-leap nanoseconds
    /// since January 1, 1970 0:00:00 UTC (aka "UNIX timestamp").
    pub fn from_timestamp_nanos(nanos: i64) -> Self {
        Self(Utc.timestamp_nanos(nanos))
    }

    /// Makes a new `Time` from the number of non-leap seconds
    /// since January 1, 1970 0:00:00 UTC (aka "UNIX timestamp")
    /// and the number of nanoseconds since the last whole non-leap second.
    ///
    /// Returns None if out of range
    pub fn from_timestamp(secs: i64, nanos: u32) -> Option<Self> {
        Some(Self(Utc.timestamp_opt(secs, nanos).single()?))
    }

    /// Makes a new `Time` from the provided [`DateTime<Utc>`]
    pub fn from_date_time(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    /// Returns the number of non-leap-nanoseconds since January 1, 1970 UTC
    ///
    /// Instants that do not fit in an `i64` worth of nanoseconds (before
    /// 1677 or after 2262) wrap around rather than fail.
    pub fn timestamp_nanos(&self) -> i64 {
        self.0
            .timestamp()
            .wrapping_mul(NANOS_PER_SEC)
            .wrapping_add(i64::from(self.0.timestamp_subsec_nanos()))
    }

    /// Returns the number of seconds since January 1, 1970 UTC
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns an RFC 1123 date in the GMT zone such as `Tue, 14 Nov 2023 22:13:20 GMT`,
    /// the form used by the HTTP `Date` header.
    pub fn to_rfc1123(&self) -> String {
        self.0.format(RFC1123_GMT).to_string()
    }

    /// Returns an RFC 3339 and ISO 8601 date and time string such as `1996-12-19T16:39:57+00:00`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Adds given [`Duration`] to the current date and time.
    ///
    /// Returns `None` if it would result in overflow
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let duration = chrono::Duration::from_std(duration).ok()?;
        Some(Self(self.0.checked_add_signed(duration)?))
    }

    /// Returns `Time` as a [`DateTime<Utc>`]
    pub fn date_time(&self) -> DateTime<Utc> {
        self.0
    }
}

pub trait TimeProvider: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the current `Time`. No guarantees are made about monotonicity
    fn now(&self) -> Time;
}

/// A [`TimeProvider`] that uses [`Utc::now`] as a clock source
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider {}

impl SystemProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeProvider for SystemProvider {
    fn now(&self) -> Time {
        Time(Utc::now())
    }
}

/// A [`TimeProvider`] that returns a fixed `Time` that can be set by [`MockProvider::set`]
#[derive(Debug)]
pub struct MockProvider {
    now: RwLock<Time>,
}

impl MockProvider {
    pub fn new(start: Time) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, time: Time) {
        *self.now.write() = time
    }

    /// Advances the clock, saturating at [`Time::MAX`].
    pub fn inc(&self, duration: Duration) -> Time {
        let mut now = self.now.write();
        *now = now.checked_add(duration).unwrap_or(Time::MAX);
        *now
    }
}

impl TimeProvider for MockProvider {
    fn now(&self) -> Time {
        *self.now.read()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_system_provider() {
        let provider = SystemProvider::new();
        let a = provider.now();
        let b = provider.now();

        assert!(a <= b);
        assert!(a.timestamp() > 1_600_000_000);
    }

    #[test]
    fn test_mock_provider() {
        let provider = MockProvider::new(Time::from_timestamp_nanos(0));
        assert_eq!(provider.now().timestamp_nanos(), 0);
        assert_eq!(provider.now().timestamp_nanos(), 0);

        provider.set(Time::from_timestamp_nanos(12));
        assert_eq!(provider.now().timestamp_nanos(), 12);

        let t = provider.inc(Duration::from_nanos(30));
        assert_eq!(t.timestamp_nanos(), 42);
        assert_eq!(provider.now().timestamp_nanos(), 42);

        provider.set(Time::MAX);
        assert_eq!(provider.inc(Duration::from_secs(1)), Time::MAX);
    }

    #[test]
    fn test_timestamp_nanos() {
        for nanos in [0, 1, -1, 1_700_000_000_123_456_789, -3_659_396_346_346] {
            assert_eq!(Time::from_timestamp_nanos(nanos).timestamp_nanos(), nanos);
        }

        let time = Time::from_timestamp(1_700_000_000, 5).unwrap();
        assert_eq!(time.timestamp_nanos(), 1_700_000_000_000_000_005);
    }

    #[test]
    fn test_timestamp_nanos_wraps_out_of_range() {
        // one second past the last instant representable as i64 nanoseconds
        let secs = i64::MAX / NANOS_PER_SEC + 1;
        let time = Time::from_timestamp(secs, 0).unwrap();

        assert_eq!(time.timestamp_nanos(), secs.wrapping_mul(NANOS_PER_SEC));
        assert!(time.timestamp_nanos() < 0);
    }

    #[test]
    fn test_rfc1123() {
        assert_eq!(
            Time::from_timestamp_nanos(0).to_rfc1123(),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
        assert_eq!(
            Time::from_timestamp(86_400, 0).unwrap().to_rfc1123(),
            "Fri, 02 Jan 1970 00:00:00 GMT"
        );
        assert_eq!(
            Time::from_timestamp(1_700_000_000, 999_999_999)
                .unwrap()
                .to_rfc1123(),
            "Tue, 14 Nov 2023 22:13:20 GMT"
        );
    }

    #[test]
    fn test_date_time() {
        let date_time = Utc.timestamp_nanos(3_406_960_448_958_394_583);
        let time = Time::from_date_time(date_time);

        assert_eq!(time.date_time(), date_time);
        assert_eq!(time.timestamp(), date_time.timestamp());
        assert_eq!(time.to_rfc3339(), date_time.to_rfc3339());
        assert_eq!(
            Some(time),
            Time::from_timestamp(date_time.timestamp(), date_time.timestamp_subsec_nanos())
        );
    }

    #[test]
    fn test_overflow() {
        assert!(Time::MAX.checked_add(Duration::from_nanos(1)).is_none());
        assert!(Time::MIN.checked_add(Duration::from_nanos(1)).is_some());
        assert!(Time::from_timestamp(i64::MAX, 0).is_none());
    }
}
