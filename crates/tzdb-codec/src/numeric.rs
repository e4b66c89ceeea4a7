//! Compact encodings for UTC offsets and epoch seconds.
//!
//! Both encodings favour values that are whole quarter hours and fall back
//! to an exact escaped form for everything else, so encoding never fails.

use bytes::BufMut;

use crate::error::CodecResult;
use crate::reader::ByteReader;

/// Seconds in a quarter hour, the unit of both compact encodings.
const QUARTER_HOUR: i64 = 900;

/// Escape byte announcing a raw 4-byte offset.
pub const OFFSET_ESCAPE: i8 = 127;

/// Largest compact offset, in quarter hours (+/-18 hours).
pub const OFFSET_COMPACT_LIMIT: i32 = 72;

/// Escape byte announcing a raw 8-byte epoch second.
pub const EPOCH_ESCAPE: u8 = 255;

/// First epoch second with a compact encoding (1825-01-01T00:00Z).
pub const EPOCH_COMPACT_MIN: i64 = -4_575_744_000;

/// First epoch second past the compact window (2300-01-01T00:00Z).
pub const EPOCH_COMPACT_END: i64 = 10_413_792_000;

/// Write an offset: one byte of quarter hours, or the escape and raw seconds.
pub fn write_offset(buf: &mut Vec<u8>, seconds: i32) {
    let quarters = seconds / 900;
    if seconds % 900 == 0 && (-OFFSET_COMPACT_LIMIT..=OFFSET_COMPACT_LIMIT).contains(&quarters) {
        buf.put_i8(quarters as i8);
    } else {
        buf.put_i8(OFFSET_ESCAPE);
        buf.put_i32(seconds);
    }
}

/// Read an offset written by [`write_offset`].
pub fn read_offset(r: &mut ByteReader<'_>) -> CodecResult<i32> {
    let byte = r.read_i8()?;
    if byte == OFFSET_ESCAPE {
        r.read_i32()
    } else {
        Ok(i32::from(byte) * 900)
    }
}

/// Write an epoch second: three bytes of quarter hours since 1825, or the
/// escape and the raw value.
pub fn write_epoch_second(buf: &mut Vec<u8>, epoch_second: i64) {
    if (EPOCH_COMPACT_MIN..EPOCH_COMPACT_END).contains(&epoch_second)
        && epoch_second % QUARTER_HOUR == 0
    {
        // Fits in 24 bits and never starts with the escape byte.
        let store = ((epoch_second - EPOCH_COMPACT_MIN) / QUARTER_HOUR) as u32;
        buf.put_uint(u64::from(store), 3);
    } else {
        buf.put_u8(EPOCH_ESCAPE);
        buf.put_i64(epoch_second);
    }
}

/// Read an epoch second written by [`write_epoch_second`].
pub fn read_epoch_second(r: &mut ByteReader<'_>) -> CodecResult<i64> {
    let hi = r.read_u8()?;
    if hi == EPOCH_ESCAPE {
        return r.read_i64();
    }
    let mid = r.read_u8()?;
    let lo = r.read_u8()?;
    let store = (i64::from(hi) << 16) | (i64::from(mid) << 8) | i64::from(lo);
    Ok(store * QUARTER_HOUR + EPOCH_COMPACT_MIN)
}
