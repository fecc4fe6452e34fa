//! Assembled frame output

use serde::{Deserialize, Serialize};

use super::TraceTime;

/// Per-byte classification against the previously emitted data for an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteChange {
    /// Same value as the previous emission, or no usable history
    Unchanged,
    /// Different value at an index the previous emission also had
    Changed,
    /// Index beyond the end of the previous emission
    New,
}

impl ByteChange {
    /// Whether presentation sinks should highlight this byte
    pub fn is_highlighted(self) -> bool {
        !matches!(self, ByteChange::Unchanged)
    }
}

/// A complete frame that passed change filtering and rate limiting
///
/// This is the structured result of the pipeline. The highlighted terminal
/// line is derived from `canonical_string` and `byte_diff` by a sink and is
/// never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledFrame {
    /// Trace time of the identifier field
    pub start_time: TraceTime,

    /// Trace time at the end of the ACK field
    pub end_time: TraceTime,

    /// Frame identifier
    pub id: u32,

    /// Concatenated data bytes in arrival order
    pub data: Vec<u8>,

    /// CRC value, absent if no CRC field was seen
    pub crc: Option<u32>,

    /// Canonical rendering, e.g. `123#01.02.03`
    #[serde(rename = "datastring")]
    pub canonical_string: String,

    /// Classification of each byte in `data`
    pub byte_diff: Vec<ByteChange>,
}

impl AssembledFrame {
    /// Indices of bytes classified as changed or new
    pub fn highlighted_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.byte_diff
            .iter()
            .enumerate()
            .filter(|(_, change)| change.is_highlighted())
            .map(|(index, _)| index)
    }
}
