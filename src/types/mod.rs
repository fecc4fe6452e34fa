//! Core types for frame reassembly.
//!
//! ## Architecture
//!
//! - [`FieldEvent`] is one field-level unit reported by the upstream decoder
//!   (identifier, data chunk, CRC, ACK or anything else)
//! - [`AssembledFrame`] is the structured result for a frame that survived
//!   change filtering and rate limiting
//! - [`ByteChange`] classifies each data byte against the previous emission
//! - [`Mode`] selects whether per-identifier rate limiting applies
//!
//! ## Usage Example
//!
//! ```rust
//! use can_concat::types::{Field, FieldEvent, FieldKind, TraceTime};
//!
//! let event = FieldEvent::identifier(0x123, TraceTime::from_secs(0.0), TraceTime::from_secs(0.001));
//! assert_eq!(event.kind(), FieldKind::Identifier);
//! assert_eq!(event.field, Field::Identifier(0x123));
//! ```

mod event;
mod frame;
mod mode;

pub use event::{Field, FieldEvent, FieldKind, TraceTime};
pub use frame::{AssembledFrame, ByteChange};
pub use mode::Mode;

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_field_kind_matches_payload(
            id in any::<u32>(),
            bytes in prop::collection::vec(any::<u8>(), 0..8),
            crc in any::<u32>(),
        ) {
            let t = TraceTime::ZERO;
            prop_assert_eq!(FieldEvent::identifier(id, t, t).field, Field::Identifier(id));
            prop_assert_eq!(FieldEvent::data(bytes.clone(), t, t).field, Field::Data(bytes));
            prop_assert_eq!(FieldEvent::crc(crc, t, t).field, Field::Crc(crc));
        }

        #[test]
        fn prop_trace_time_ordering_matches_seconds(a in 0.0f64..1.0e6, b in 0.0f64..1.0e6) {
            let (ta, tb) = (TraceTime::from_secs(a), TraceTime::from_secs(b));
            prop_assert_eq!(ta < tb, a < b);
            if a >= b {
                let elapsed = ta.saturating_since(tb).as_secs_f64();
                prop_assert!((elapsed - (a - b)).abs() < 2e-9, "{} vs {}", elapsed, a - b);
            } else {
                prop_assert_eq!(ta.saturating_since(tb), std::time::Duration::ZERO);
            }
        }
    }
}
