use bytes::BufMut;

use crate::error::{CodecError, CodecResult};

/// Write a string prefixed by its unsigned 16-bit byte length.
pub fn write_utf(buf: &mut Vec<u8>, value: &str) -> CodecResult<()> {
    let len = u16::try_from(value.len()).map_err(|_| CodecError::InvalidLength {
        what: "string",
        length: value.len() as i64,
    })?;
    buf.put_u16(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}
