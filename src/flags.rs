use bitflags::bitflags;

bitflags! {
    /// Render flags shared by points and faces.
    pub struct FaceFlags: u32 {
        const DISABLE_SHADOW = 0x0000_0010;
        const LIGHTING_BOTH = 0x0000_0020;
        const LIGHTING_POSITION = 0x0000_0080;
        const ZBIAS_LOW = 0x0000_0100;
        const ZBIAS_MIDDLE = 0x0000_0200;
        const ZBIAS_HIGH = 0x0000_0300;
        const LIGHTING_REVERSED = 0x0010_0000;
        const LIGHTING_FLAT = 0x0020_0000;
        const DISABLE_TMERGING = 0x0100_0000;
        const USER_VALUE = 0xfe00_0000;
    }
}

const ZBIAS_MASK: u32 = 0x0000_0300;
const USER_VALUE_SHIFT: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZBias {
    None,
    Low,
    Middle,
    High,
}

impl FaceFlags {
    /// Bits without a name are dropped.
    pub fn from_raw(raw: i32) -> Self {
        Self::from_bits_truncate(raw as u32)
    }

    pub fn z_bias(self) -> ZBias {
        match self.bits() & ZBIAS_MASK {
            0x100 => ZBias::Low,
            0x200 => ZBias::Middle,
            0x300 => ZBias::High,
            _ => ZBias::None,
        }
    }

    /// User mark stored in the top seven bits (0..=127).
    pub fn user_value(self) -> u8 {
        (self.bits() >> USER_VALUE_SHIFT) as u8
    }
}
