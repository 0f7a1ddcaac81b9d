use encoding_rs::WINDOWS_1250;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

pub const SP3X_SIGNATURE: u32 = 0x5833_5053;
pub const SP3D_SIGNATURE: u32 = 0x4433_5053;
pub const SS3D_SIGNATURE: u32 = 0x4433_5353;
pub const WVR1_SIGNATURE: u32 = 0x5256_5731;

pub const MAJOR_VERSION: i32 = 0x1C;
pub const MINOR_VERSION: i32 = 0x99;

pub const GRID_SIZE: usize = 128;
pub const TEXTURE_NAME_COUNT: usize = 256;
pub const PLACED_OBJECT_COUNT: usize = 2233;
pub const FACE_SLOTS: usize = 4;

pub const END_OF_NETS: &[u8] = b"EndOfNets";

pub type Vec3 = [f32; 3];

/// A raw 4-byte signature as it appears in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(pub u32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_le_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic()) {
            let text: String = bytes.iter().map(|&b| b as char).collect();
            write!(f, "{:#010x} ({:?})", self.0, text)
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

/// Container layout selected by the leading signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// `SP3X`: versioned model with point and face flags.
    ModelVariantA,
    /// `SP3D`: position-only points, no face flags.
    ModelVariantB,
    /// `1WVR`: terrain grid with objects and nets.
    World,
}

impl FormatTag {
    pub fn from_tag(tag: Tag) -> Option<Self> {
        match tag.0 {
            SP3X_SIGNATURE => Some(Self::ModelVariantA),
            SP3D_SIGNATURE => Some(Self::ModelVariantB),
            WVR1_SIGNATURE => Some(Self::World),
            _ => None,
        }
    }

    pub fn signature(self) -> u32 {
        match self {
            Self::ModelVariantA => SP3X_SIGNATURE,
            Self::ModelVariantB => SP3D_SIGNATURE,
            Self::World => WVR1_SIGNATURE,
        }
    }
}

/// Fixed-width, NUL-padded name field.
///
/// The raw bytes are kept so the record re-encodes exactly, including
/// whatever garbage follows the terminator.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedString<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedString<N> {
    pub fn new(text: &str) -> Self {
        let mut bytes = [0u8; N];
        let len = text.len().min(N);
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self(bytes)
    }

    /// Bytes up to (not including) the first NUL.
    pub fn trimmed(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        &self.0[..end]
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        let (text, _) = WINDOWS_1250.decode_without_bom_handling(self.trimmed());
        text
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl<const N: usize> Serialize for FixedString<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}
