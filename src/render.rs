//! Canonical rendering and byte-level diff classification

use std::fmt::Write as _;

use crate::assembler::FrameCandidate;
use crate::config::EmptyHistory;
use crate::types::{AssembledFrame, ByteChange};

/// Render `id` and `data` as `ID#B0.B1...`
///
/// The identifier is uppercase hex padded to at least three digits, each data
/// byte is two uppercase hex digits, bytes are joined by `.`.
///
/// ```rust
/// use can_concat::render::canonical_string;
///
/// assert_eq!(canonical_string(0x123, &[0x01, 0x02, 0x03]), "123#01.02.03");
/// assert_eq!(canonical_string(5, &[0xAB]), "005#AB");
/// assert_eq!(canonical_string(0x7FF, &[]), "7FF#");
/// ```
pub fn canonical_string(id: u32, data: &[u8]) -> String {
    let mut out = String::with_capacity(4 + data.len() * 3);
    let _ = write!(out, "{:03X}#", id);
    for (index, byte) in data.iter().enumerate() {
        if index > 0 {
            out.push('.');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

/// Builds [`AssembledFrame`]s for candidates that passed both filters
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRenderer {
    empty_history: EmptyHistory,
}

impl FrameRenderer {
    /// Renderer with the given treatment of zero-length history
    pub fn new(empty_history: EmptyHistory) -> Self {
        Self { empty_history }
    }

    /// Classify each byte of `data` against `previous`
    pub fn classify(&self, previous: Option<&[u8]>, data: &[u8]) -> Vec<ByteChange> {
        let previous = match previous {
            None => return vec![ByteChange::Unchanged; data.len()],
            Some([]) if self.empty_history == EmptyHistory::Unclassified => {
                return vec![ByteChange::Unchanged; data.len()];
            }
            Some(previous) => previous,
        };

        data.iter()
            .enumerate()
            .map(|(index, byte)| match previous.get(index) {
                Some(old) if old != byte => ByteChange::Changed,
                Some(_) => ByteChange::Unchanged,
                None => ByteChange::New,
            })
            .collect()
    }

    /// Render a candidate into its final frame
    pub fn render(&self, candidate: FrameCandidate, previous: Option<&[u8]>) -> AssembledFrame {
        let byte_diff = self.classify(previous, &candidate.data);
        let canonical_string = canonical_string(candidate.id, &candidate.data);

        AssembledFrame {
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            id: candidate.id,
            data: candidate.data,
            crc: candidate.crc,
            canonical_string,
            byte_diff,
        }
    }
}
