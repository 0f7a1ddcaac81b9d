use crate::error::{DecodeError, Result};
use crate::reader::Reader;
use crate::types::FormatTag;
use log::debug;
use std::io::BufRead;

/// Reads the leading signature and picks the decoding path.
///
/// An unknown signature is always fatal: nothing after it can be
/// interpreted without knowing the layout.
pub fn decode_header<R: BufRead>(reader: &mut Reader<R>) -> Result<FormatTag> {
    let tag = reader.read_tag()?;
    let format = FormatTag::from_tag(tag).ok_or(DecodeError::UnrecognizedSignature(tag))?;
    debug!("signature {tag}: {format:?}");
    Ok(format)
}
