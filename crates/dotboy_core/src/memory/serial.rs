pub const SB_ADDR: u16 = 0xFF01;
pub const SC_ADDR: u16 = 0xFF02;

/// Serial port reduced to what test ROMs need.
///
/// Starting a transfer on SC (bit 7 set with the internal clock in bit 0)
/// appends the current SB value to `output` and clears the start bit
/// immediately; there is no link partner.
#[derive(Clone, Debug, Default)]
pub(crate) struct Serial {
    pub(crate) sb: u8,
    pub(crate) sc: u8,
    pub(crate) output: Vec<u8>,
}

impl Serial {
    pub(super) fn write_sb(&mut self, value: u8) {
        self.sb = value;
    }

    pub(super) fn write_sc(&mut self, value: u8) {
        self.sc = value;
        if (self.sc & 0x81) == 0x81 {
            self.output.push(self.sb);
            self.sc &= !0x80;
        }
    }

    pub(super) fn read_sc(&self) -> u8 {
        self.sc | 0x7E
    }
}
