//! Flat DMG address space used by the CPU core.
//!
//! A single 32 KiB ROM bank is mapped at 0x0000–0x7FFF and everything above
//! is plain RAM, except for the handful of device registers the CPU tests
//! rely on: serial, the timer block, IF and IE.

mod serial;

use thiserror::Error;

use crate::cpu::Bus;
use crate::interrupts::{IE_ADDR, IF_ADDR};
use crate::timer::Timer;

use serial::{Serial, SB_ADDR, SC_ADDR};

/// Size of the fixed ROM window.
pub const ROM_SIZE: usize = 0x8000;
const ADDRESS_SPACE: usize = 0x10000;

/// LCD Y coordinate register.
pub const LY_ADDR: u16 = 0xFF44;
/// Value reported by the LY stub: the first VBlank line.
const LY_STUB_VALUE: u8 = 0x90;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("ROM image is {len} bytes; at most 32768 bytes can be mapped")]
    RomTooLarge { len: usize },
}

pub struct Memory {
    rom: Vec<u8>,
    /// Backing store for 0x8000–0xFFFF. Indexed by the full address so the
    /// lower half is unused.
    ram: Vec<u8>,
    pub timer: Timer,
    serial: Serial,
    if_reg: u8,
    ie_reg: u8,
    /// When set, LY reads return a constant so traces line up with
    /// reference emulators that run the PPU.
    ly_stub: bool,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            rom: vec![0xFF; ROM_SIZE],
            ram: vec![0; ADDRESS_SPACE],
            timer: Timer::new(),
            serial: Serial::default(),
            if_reg: 0,
            ie_reg: 0,
            ly_stub: false,
        }
    }

    /// Map a ROM image at 0x0000. Images shorter than 32 KiB are padded with
    /// 0xFF.
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), MemoryError> {
        if data.len() > ROM_SIZE {
            return Err(MemoryError::RomTooLarge { len: data.len() });
        }
        self.rom.fill(0xFF);
        self.rom[..data.len()].copy_from_slice(data);
        log::info!("Loaded {} byte ROM image", data.len());
        Ok(())
    }

    /// Power-cycle everything except the ROM image: RAM, timer, serial and
    /// the interrupt registers return to their initial state.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.timer = Timer::new();
        self.serial = Serial::default();
        self.if_reg = 0;
        self.ie_reg = 0;
    }

    pub fn set_ly_stub(&mut self, enabled: bool) {
        self.ly_stub = enabled;
    }

    /// Bytes sent over the serial port since the last call.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.serial.output)
    }

    pub fn if_reg(&self) -> u8 {
        self.if_reg
    }

    pub fn ie_reg(&self) -> u8 {
        self.ie_reg
    }
}

impl Bus for Memory {
    fn read8(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.rom[addr as usize],
            SB_ADDR => self.serial.sb,
            SC_ADDR => self.serial.read_sc(),
            0xFF04..=0xFF07 => self.timer.read(addr),
            // Upper three bits are unused and read as 1.
            IF_ADDR => self.if_reg | 0xE0,
            LY_ADDR if self.ly_stub => LY_STUB_VALUE,
            IE_ADDR => self.ie_reg,
            _ => self.ram[addr as usize],
        }
    }

    fn write8(&mut self, addr: u16, value: u8) {
        match addr {
            // No MBC: CPU writes to ROM have no effect.
            0x0000..=0x7FFF => {}
            SB_ADDR => self.serial.write_sb(value),
            SC_ADDR => self.serial.write_sc(value),
            0xFF04..=0xFF07 => self.timer.write(addr, value),
            IF_ADDR => self.if_reg = value & 0x1F,
            IE_ADDR => self.ie_reg = value,
            _ => self.ram[addr as usize] = value,
        }
    }

    fn tick(&mut self, m_cycles: u32) {
        self.timer.tick(m_cycles, &mut self.if_reg);
    }
}

#[cfg(test)]
mod tests;
