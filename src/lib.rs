//! Decoder for Poseidon engine containers: `SP3X`/`SP3D` models and
//! `1WVR` worlds, plus an OBJ exporter for decoded models.

pub mod config;
pub mod error;
pub mod flags;
pub mod header;
pub mod model;
pub mod obj;
pub mod reader;
pub mod ser;
pub mod types;
pub mod world;

pub use config::DecodeOptions;
pub use error::{DecodeError, Result};
pub use model::{Model, ModelKind};
pub use types::FormatTag;
pub use world::World;

use log::debug;
use reader::Reader;
use std::io::BufRead;

/// A fully decoded container.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Model(Model),
    World(World),
}

impl Container {
    pub fn format(&self) -> FormatTag {
        match self {
            Self::Model(model) => model.kind().format(),
            Self::World(_) => FormatTag::World,
        }
    }
}

/// Decodes one container from `input`. Any failure discards everything
/// decoded so far.
pub fn decode<R: BufRead>(input: R, options: &DecodeOptions) -> Result<Container> {
    let mut reader = Reader::with_limit(input, options.max_elements);
    let format = header::decode_header(&mut reader)?;

    let container = match ModelKind::from_format(format) {
        Some(kind) => Container::Model(model::decode_model(&mut reader, kind, options)?),
        None => Container::World(world::decode_world(&mut reader)?),
    };

    if !reader.is_exhausted()? {
        debug!("ignoring trailing data after offset {:#x}", reader.offset());
    }
    Ok(container)
}

pub fn decode_bytes(data: &[u8], options: &DecodeOptions) -> Result<Container> {
    decode(data, options)
}
