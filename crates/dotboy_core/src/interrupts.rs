use bitflags::bitflags;

/// Interrupt flag register (IF).
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register (IE).
pub const IE_ADDR: u16 = 0xFFFF;

bitflags! {
    /// Interrupt request / enable bits as laid out in IF ($FF0F) and
    /// IE ($FFFF).
    ///
    /// Lower bit index means higher priority when several requests are
    /// pending at once.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl Interrupt {
    /// Highest-priority interrupt contained in `self`, if any.
    pub fn highest_priority(self) -> Option<Interrupt> {
        if self.is_empty() {
            return None;
        }
        Some(Interrupt::from_bits_truncate(1 << self.bits().trailing_zeros()))
    }

    /// Handler address jumped to when this interrupt is dispatched.
    ///
    /// Only meaningful for a single bit.
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }
}
