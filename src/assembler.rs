//! Frame assembly from field events
//!
//! The assembler is a two-state machine. An identifier field always starts a
//! fresh frame; data and CRC fields mutate it; the ACK field completes it.
//!
//! | State              | Identifier          | Data / Crc   | Ack                 | Other |
//! |--------------------|---------------------|--------------|---------------------|-------|
//! | AwaitingIdentifier | start, Collecting   | ignore       | ignore              | -     |
//! | Collecting         | abandon + restart   | accumulate   | complete, Awaiting  | -     |

use tracing::{debug, trace, warn};

use crate::types::{Field, FieldEvent, FieldKind, TraceTime};

/// Frame under construction
#[derive(Debug, Clone, PartialEq)]
struct InFlightFrame {
    id: u32,
    data: Vec<u8>,
    crc: Option<u32>,
    start_time: TraceTime,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    AwaitingIdentifier,
    Collecting(InFlightFrame),
}

/// Completed frame handed to the filtering stage
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCandidate {
    /// Frame identifier
    pub id: u32,
    /// Data bytes in arrival order
    pub data: Vec<u8>,
    /// CRC value if a CRC field arrived
    pub crc: Option<u32>,
    /// Start of the identifier field
    pub start_time: TraceTime,
    /// End of the ACK field
    pub end_time: TraceTime,
}

/// Outcome of feeding one event to the assembler
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Event carried nothing the assembler tracks
    Idle,
    /// Frame started or updated
    Accumulating,
    /// An identifier interrupted an unfinished frame, which was discarded
    Abandoned {
        /// Identifier of the discarded frame
        id: u32,
    },
    /// Data, CRC or ACK arrived with no frame in flight and was ignored
    OutOfOrder(FieldKind),
    /// ACK completed a frame
    Complete(FrameCandidate),
}

/// Accumulates one in-flight frame at a time
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    state: State,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an assembler waiting for its first identifier
    pub fn new() -> Self {
        Self { state: State::AwaitingIdentifier }
    }

    /// Whether a frame is currently being collected
    pub fn is_collecting(&self) -> bool {
        matches!(self.state, State::Collecting(_))
    }

    /// Identifier of the frame in flight
    pub fn current_id(&self) -> Option<u32> {
        match &self.state {
            State::Collecting(frame) => Some(frame.id),
            State::AwaitingIdentifier => None,
        }
    }

    /// Bytes collected so far for the frame in flight
    pub fn buffered_len(&self) -> usize {
        match &self.state {
            State::Collecting(frame) => frame.data.len(),
            State::AwaitingIdentifier => 0,
        }
    }

    /// Drop any frame in flight
    pub fn reset(&mut self) {
        self.state = State::AwaitingIdentifier;
    }

    /// Feed one field event
    pub fn push(&mut self, event: &FieldEvent) -> Step {
        match &event.field {
            Field::Identifier(id) => self.start(*id, event.start_time),
            Field::Other => Step::Idle,
            field => match &mut self.state {
                State::AwaitingIdentifier => {
                    warn!(
                        "Ignoring {} field at {} with no frame in flight",
                        event.kind(),
                        event.start_time
                    );
                    Step::OutOfOrder(event.kind())
                }
                State::Collecting(frame) => match field {
                    Field::Data(bytes) => {
                        frame.data.extend_from_slice(bytes);
                        Step::Accumulating
                    }
                    Field::Crc(crc) => {
                        frame.crc = Some(*crc);
                        Step::Accumulating
                    }
                    Field::Ack => self.complete(event.end_time),
                    Field::Identifier(_) | Field::Other => Step::Idle,
                },
            },
        }
    }

    fn start(&mut self, id: u32, start_time: TraceTime) -> Step {
        let fresh = InFlightFrame { id, data: Vec::new(), crc: None, start_time };
        trace!("Identifier {:03X} at {}", id, start_time);

        match std::mem::replace(&mut self.state, State::Collecting(fresh)) {
            State::Collecting(abandoned) => {
                debug!(
                    "Frame {:03X} abandoned with {} bytes, interrupted by {:03X}",
                    abandoned.id,
                    abandoned.data.len(),
                    id
                );
                Step::Abandoned { id: abandoned.id }
            }
            State::AwaitingIdentifier => Step::Accumulating,
        }
    }

    fn complete(&mut self, end_time: TraceTime) -> Step {
        match std::mem::replace(&mut self.state, State::AwaitingIdentifier) {
            State::Collecting(frame) => Step::Complete(FrameCandidate {
                id: frame.id,
                data: frame.data,
                crc: frame.crc,
                start_time: frame.start_time,
                end_time,
            }),
            State::AwaitingIdentifier => Step::Idle,
        }
    }
}
