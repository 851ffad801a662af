#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

//! Encoding of measurement points into the dataway line protocol.
//!
//! Each point becomes one newline-terminated record:
//!
//! ```text
//! name,tag1=v1,tag2=v2 field1=v1,field2=v2 timestamp_ns
//! ```
//!
//! Tags and fields are written in ascending key order, names, keys and
//! values have `,`, ` `, `"` and `=` escaped, and field values carry their
//! type in their rendering (see [`FieldValue`]).
//!
//! ```
//! use dataway_line_protocol::{Point, encode};
//! use dataway_time::Time;
//!
//! let point = Point::builder("m", Time::from_timestamp_nanos(1_000))
//!     .tag("h", "x")
//!     .field("v", 1_i64)
//!     .build();
//!
//! assert_eq!(encode([&point]), b"m,h=x v=1i 1000\n");
//! ```

mod escape;
mod field;
mod point;

pub use escape::{ESCAPES, escape};
pub use field::{FieldValue, format_field};
pub use point::{Point, PointBuilder};

use bytes::BufMut;
use std::io::Write;
use tracing::trace;

/// Encodes `points` into a buffer of line protocol records, in input order.
///
/// Accepts anything that yields `&Point` or `Option<&Point>`. `None` entries
/// and points without any field are skipped, so encoding never fails; an
/// input with nothing to encode produces an empty buffer.
pub fn encode<'a, I, P>(points: I) -> Vec<u8>
where
    I: IntoIterator<Item = P>,
    P: Into<Option<&'a Point>>,
{
    let mut writer = Vec::new().writer();

    for point in points {
        let point: Option<&Point> = point.into();
        let Some(point) = point else {
            trace!("skipping missing point");
            continue;
        };
        if point.fields.is_empty() {
            trace!(name = %point.name, "skipping point without fields");
            continue;
        }

        // BufMut's Write adapter is infallible.
        write!(&mut writer, "{}", point.line_protocol()).unwrap();
    }

    writer.into_inner()
}
