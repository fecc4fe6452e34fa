//! YAML capture files of field events
//!
//! A capture is a list of records in the shape the upstream decoder reports
//! them:
//!
//! ```yaml
//! events:
//!   - { kind: identifier, start_time: 0.000, end_time: 0.00002, identifier: 291 }
//!   - { kind: data, start_time: 0.00002, end_time: 0.00004, data: [1] }
//!   - { kind: crc, start_time: 0.00004, end_time: 0.00006, crc: 4660 }
//!   - { kind: ack, start_time: 0.00006, end_time: 0.00008 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::types::{Field, FieldEvent, FieldKind, TraceTime};
use crate::{CaptureError, Result};

/// One field as stored in a capture file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Field kind
    pub kind: FieldKind,
    /// Start of the field, seconds
    pub start_time: TraceTime,
    /// End of the field, seconds
    pub end_time: TraceTime,
    /// Identifier value, required for `identifier` records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<u32>,
    /// Data bytes, required for `data` records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    /// CRC value, required for `crc` records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc: Option<u32>,
}

impl CaptureRecord {
    /// Convert into a field event, `index` is used for error reporting
    pub fn into_event(self, index: usize) -> Result<FieldEvent> {
        let field = match self.kind {
            FieldKind::Identifier => Field::Identifier(self.identifier.ok_or_else(|| {
                CaptureError::malformed_event(index, self.kind, "missing identifier value")
            })?),
            FieldKind::Data => Field::Data(self.data.ok_or_else(|| {
                CaptureError::malformed_event(index, self.kind, "missing data bytes")
            })?),
            FieldKind::Crc => Field::Crc(
                self.crc
                    .ok_or_else(|| CaptureError::malformed_event(index, self.kind, "missing crc value"))?,
            ),
            FieldKind::Ack => Field::Ack,
            FieldKind::Other => Field::Other,
        };

        Ok(FieldEvent::new(self.start_time, self.end_time, field))
    }
}

impl From<&FieldEvent> for CaptureRecord {
    fn from(event: &FieldEvent) -> Self {
        let mut record = CaptureRecord {
            kind: event.kind(),
            start_time: event.start_time,
            end_time: event.end_time,
            identifier: None,
            data: None,
            crc: None,
        };
        match &event.field {
            Field::Identifier(id) => record.identifier = Some(*id),
            Field::Data(bytes) => record.data = Some(bytes.clone()),
            Field::Crc(crc) => record.crc = Some(*crc),
            Field::Ack | Field::Other => {}
        }
        record
    }
}

/// A whole capture file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// Records in trace order
    pub events: Vec<CaptureRecord>,
}

impl Capture {
    /// Build a capture from decoded events
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a FieldEvent>) -> Self {
        Self { events: events.into_iter().map(CaptureRecord::from).collect() }
    }

    /// Parse capture YAML
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| CaptureError::Parse {
            context: "Capture deserialization".to_string(),
            details: e.to_string(),
        })
    }

    /// Read and parse a capture file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CaptureError::file_error(path.to_path_buf(), e))?;
        let capture = Self::parse(&yaml)?;
        debug!("Loaded {} records from {}", capture.events.len(), path.display());
        Ok(capture)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(CaptureError::from)
    }

    /// Convert every record, failing on the first malformed one
    pub fn into_events(self) -> Result<Vec<FieldEvent>> {
        self.events
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_event(index))
            .collect()
    }
}
