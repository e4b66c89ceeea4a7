//! Binary codec for TZDB rule blobs.
//!
//! A `tzdb.dat` file stores every zone's rules as an opaque blob. This crate
//! turns blobs into [`tzdb_types`] values and back, byte for byte.
//!
//! # Architecture
//!
//! - **Numeric codec** ([`numeric`]): offsets as one byte of quarter hours,
//!   instants as three bytes of quarter hours since 1825, each with an escape
//!   to the exact value
//! - **Record codec** ([`record`]): tag byte dispatch over rule sets,
//!   transitions and recurring rules
//! - **ByteReader**: bounds-checked big-endian cursor shared with the file
//!   loader

pub mod error;
pub mod numeric;
pub mod reader;
pub mod record;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use numeric::{read_epoch_second, read_offset, write_epoch_second, write_offset};
pub use reader::ByteReader;
pub use record::{
    decode_record, decode_rule_set, encode_record, encode_rule_set, Record, RecordKind,
};
pub use writer::write_utf;
