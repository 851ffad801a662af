use crate::{FieldValue, escape::escaped};
use dataway_time::Time;
use std::{collections::BTreeMap, fmt};

/// A single measurement to upload.
///
/// Tags and fields are kept in ordered maps, so keys are unique and a point
/// always encodes to the same bytes no matter what order they were added in.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub time: Time,
}

impl Point {
    /// Create a builder to incrementally construct a `Point`.
    pub fn builder(name: impl Into<String>, time: Time) -> PointBuilder {
        PointBuilder::new(name, time)
    }

    pub(crate) fn line_protocol(&self) -> LineProtocol<'_> {
        LineProtocol(self)
    }
}

/// Incrementally constructs a [`Point`].
///
/// Create this via [`Point::builder`].
#[derive(Debug)]
pub struct PointBuilder {
    point: Point,
}

impl PointBuilder {
    fn new(name: impl Into<String>, time: Time) -> Self {
        Self {
            point: Point {
                name: name.into(),
                tags: Default::default(),
                fields: Default::default(),
                time,
            },
        }
    }

    /// Sets a tag, replacing any existing tag of the same name.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.point.tags.insert(key.into(), value.into());
        self
    }

    /// Sets a field, replacing any existing field of the same name.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.point.fields.insert(key.into(), value.into());
        self
    }

    /// Constructs the point
    pub fn build(self) -> Point {
        self.point
    }
}

/// Renders one newline-terminated record.
///
/// The comma after the name is written even when the point has no tags.
pub(crate) struct LineProtocol<'a>(&'a Point);

impl fmt::Display for LineProtocol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self.0;
        write!(f, "{},", escaped(&point.name))?;

        for (i, (k, v)) in point.tags.iter().enumerate() {
            let d = if i == 0 { "" } else { "," };
            write!(f, "{d}{}={}", escaped(k), escaped(v))?;
        }

        for (i, (k, v)) in point.fields.iter().enumerate() {
            let d = if i == 0 { " " } else { "," };
            write!(f, "{d}{}={v}", escaped(k))?;
        }

        writeln!(f, " {}", point.time.timestamp_nanos())
    }
}
