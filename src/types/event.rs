//! Field-level events produced by the upstream bus decoder

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Timestamp in the trace domain, in seconds from the start of the capture.
///
/// Supplied by the upstream decoder and monotonic within one capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceTime(f64);

impl TraceTime {
    /// Start of the capture
    pub const ZERO: TraceTime = TraceTime(0.0);

    /// Create a timestamp from seconds since capture start
    pub fn from_secs(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Create a timestamp from milliseconds since capture start
    pub fn from_millis(millis: f64) -> Self {
        Self(millis / 1000.0)
    }

    /// Seconds since capture start
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Offset from capture start, clamped to zero for negative or non-finite values
    pub fn as_duration(self) -> Duration {
        Duration::try_from_secs_f64(self.0).unwrap_or(Duration::ZERO)
    }

    /// Time elapsed since `earlier`, zero if `earlier` is later than `self`
    pub fn saturating_since(self, earlier: TraceTime) -> Duration {
        Duration::try_from_secs_f64(self.0 - earlier.0).unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for TraceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.0)
    }
}

/// Kind of a field event without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Arbitration identifier field, starts a frame
    Identifier,
    /// One chunk of data bytes
    Data,
    /// CRC field
    Crc,
    /// ACK field, terminates a frame
    Ack,
    /// Any other field the decoder reports (SOF, control, EOF, errors, ...)
    Other,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Identifier => "identifier",
            FieldKind::Data => "data",
            FieldKind::Crc => "crc",
            FieldKind::Ack => "ack",
            FieldKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Decoded field together with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Frame identifier
    Identifier(u32),
    /// Raw data chunk, appended in arrival order
    Data(Vec<u8>),
    /// CRC value
    Crc(u32),
    /// Acknowledge slot
    Ack,
    /// Ignored by the assembler
    Other,
}

impl Field {
    /// Payload-free kind of this field
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Identifier(_) => FieldKind::Identifier,
            Field::Data(_) => FieldKind::Data,
            Field::Crc(_) => FieldKind::Crc,
            Field::Ack => FieldKind::Ack,
            Field::Other => FieldKind::Other,
        }
    }
}

/// One decoded unit from the upstream source
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEvent {
    /// Start of the field in trace time
    pub start_time: TraceTime,
    /// End of the field in trace time
    pub end_time: TraceTime,
    /// Field kind and payload
    pub field: Field,
}

impl FieldEvent {
    /// Create an event spanning `start_time..end_time`
    pub fn new(start_time: TraceTime, end_time: TraceTime, field: Field) -> Self {
        Self { start_time, end_time, field }
    }

    /// Identifier event
    pub fn identifier(id: u32, start_time: TraceTime, end_time: TraceTime) -> Self {
        Self::new(start_time, end_time, Field::Identifier(id))
    }

    /// Data event carrying one chunk of bytes
    pub fn data(bytes: impl Into<Vec<u8>>, start_time: TraceTime, end_time: TraceTime) -> Self {
        Self::new(start_time, end_time, Field::Data(bytes.into()))
    }

    /// CRC event
    pub fn crc(crc: u32, start_time: TraceTime, end_time: TraceTime) -> Self {
        Self::new(start_time, end_time, Field::Crc(crc))
    }

    /// ACK event
    pub fn ack(start_time: TraceTime, end_time: TraceTime) -> Self {
        Self::new(start_time, end_time, Field::Ack)
    }

    /// Event of a kind the assembler does not track
    pub fn other(start_time: TraceTime, end_time: TraceTime) -> Self {
        Self::new(start_time, end_time, Field::Other)
    }

    /// Kind of this event
    pub fn kind(&self) -> FieldKind {
        self.field.kind()
    }
}
