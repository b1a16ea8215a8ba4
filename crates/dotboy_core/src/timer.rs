//! Timer / divider unit.
//!
//! Time advances via explicit calls to [`Timer::tick`], measured in machine
//! cycles and converted to clock cycles internally. DIV and TIMA each keep
//! an accumulator of clocks not yet turned into an increment, so the
//! remainder carries across steps of any size.

use bitflags::bitflags;

use crate::interrupts::Interrupt;
use crate::CLOCKS_PER_MCYCLE;

pub const DIV_ADDR: u16 = 0xFF04;
pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;

/// Clock cycles per DIV increment (16384 Hz).
const DIV_PERIOD: u32 = 256;

bitflags! {
    /// TAC ($FF07). Only the low three bits are backed by storage.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TimerControl: u8 {
        const CLOCK_SELECT = 0b011;
        const ENABLE = 0b100;
    }
}

impl TimerControl {
    /// Clock cycles per TIMA increment for the selected input clock.
    pub fn period(self) -> u32 {
        match (self & TimerControl::CLOCK_SELECT).bits() {
            0b00 => 1024,
            0b01 => 16,
            0b10 => 64,
            _ => 256,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Timer {
    /// DIV (FF04).
    pub div: u8,
    /// TIMA (FF05).
    pub tima: u8,
    /// TMA (FF06).
    pub tma: u8,
    /// TAC (FF07).
    pub tac: TimerControl,
    /// Clocks accumulated towards the next DIV increment.
    div_clocks: u32,
    /// Clocks accumulated towards the next TIMA increment.
    timer_clocks: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.tac.contains(TimerControl::ENABLE)
    }

    /// Advance the timer by `m_cycles` machine cycles.
    ///
    /// On TIMA overflow the counter is reloaded from TMA and the timer bit
    /// is set in `if_reg`.
    pub fn tick(&mut self, m_cycles: u32, if_reg: &mut u8) {
        let clocks = m_cycles * CLOCKS_PER_MCYCLE;

        self.div_clocks += clocks;
        while self.div_clocks >= DIV_PERIOD {
            self.div_clocks -= DIV_PERIOD;
            self.div = self.div.wrapping_add(1);
        }

        if !self.enabled() {
            return;
        }

        let period = self.tac.period();
        self.timer_clocks += clocks;
        while self.timer_clocks >= period {
            self.timer_clocks -= period;
            self.increment_tima(if_reg);
        }
    }

    fn increment_tima(&mut self, if_reg: &mut u8) {
        let (next, overflow) = self.tima.overflowing_add(1);
        if overflow {
            self.tima = self.tma;
            *if_reg |= Interrupt::TIMER.bits();
            log::trace!("TIMA overflow, reloaded 0x{:02X}", self.tma);
        } else {
            self.tima = next;
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            DIV_ADDR => self.div,
            TIMA_ADDR => self.tima,
            TMA_ADDR => self.tma,
            TAC_ADDR => self.tac.bits() | 0xF8,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            DIV_ADDR => {
                // Any write resets the divider.
                self.div = 0;
                self.div_clocks = 0;
            }
            TIMA_ADDR => self.tima = value,
            TMA_ADDR => self.tma = value,
            TAC_ADDR => {
                // A new input clock starts counting from zero.
                self.tac = TimerControl::from_bits_truncate(value);
                self.timer_clocks = 0;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_increments_every_64_machine_cycles() {
        let mut timer = Timer::new();
        let mut if_reg = 0;
        timer.tick(63, &mut if_reg);
        assert_eq!(timer.div, 0);
        timer.tick(1, &mut if_reg);
        assert_eq!(timer.div, 1);
        timer.tick(64 * 3, &mut if_reg);
        assert_eq!(timer.div, 4);
        assert_eq!(if_reg, 0);
    }

    #[test]
    fn div_write_resets_divider_and_accumulator() {
        let mut timer = Timer::new();
        let mut if_reg = 0;
        timer.tick(100, &mut if_reg);
        timer.write(DIV_ADDR, 0x5A);
        assert_eq!(timer.read(DIV_ADDR), 0);
        timer.tick(63, &mut if_reg);
        assert_eq!(timer.div, 0);
        timer.tick(1, &mut if_reg);
        assert_eq!(timer.div, 1);
    }

    #[test]
    fn tima_overflow_reloads_and_requests_interrupt() {
        let mut timer = Timer::new();
        let mut if_reg = 0;
        timer.tima = 0xFF;
        timer.tma = 0x42;
        timer.write(TAC_ADDR, 0b111);

        timer.tick(63, &mut if_reg);
        assert_eq!(timer.tima, 0xFF);
        assert_eq!(if_reg, 0);

        timer.tick(1, &mut if_reg);
        assert_eq!(timer.tima, 0x42);
        assert_eq!(if_reg & Interrupt::TIMER.bits(), Interrupt::TIMER.bits());
    }

    #[test]
    fn tima_frequencies_follow_clock_select() {
        for (select, m_cycles_per_inc) in [(0b00u8, 256u32), (0b01, 4), (0b10, 16), (0b11, 64)] {
            let mut timer = Timer::new();
            let mut if_reg = 0;
            timer.write(TAC_ADDR, 0b100 | select);
            timer.tick(m_cycles_per_inc * 3 - 1, &mut if_reg);
            assert_eq!(timer.tima, 2, "select {select:02b}");
            timer.tick(1, &mut if_reg);
            assert_eq!(timer.tima, 3, "select {select:02b}");
        }
    }

    #[test]
    fn disabled_timer_holds_tima() {
        let mut timer = Timer::new();
        let mut if_reg = 0;
        timer.write(TAC_ADDR, 0b001);
        timer.tick(1000, &mut if_reg);
        assert_eq!(timer.tima, 0);
        assert!(timer.div > 0);
    }

    #[test]
    fn long_step_produces_multiple_increments() {
        let mut timer = Timer::new();
        let mut if_reg = 0;
        timer.write(TAC_ADDR, 0b101);
        timer.tima = 0xFE;
        timer.tma = 0x10;
        // 16 clocks per increment: 24 machine cycles = 6 increments.
        timer.tick(24, &mut if_reg);
        assert_eq!(timer.tima, 0x14);
        assert_ne!(if_reg & Interrupt::TIMER.bits(), 0);
    }

    #[test]
    fn tac_write_discards_partial_period() {
        let mut timer = Timer::new();
        let mut if_reg = 0;
        timer.write(TAC_ADDR, 0b111);
        // 63 of 64 machine cycles towards the next increment.
        timer.tick(63, &mut if_reg);
        timer.write(TAC_ADDR, 0b110);
        timer.tick(15, &mut if_reg);
        assert_eq!(timer.tima, 0);
        timer.tick(1, &mut if_reg);
        assert_eq!(timer.tima, 1);

        // Disabling and re-enabling also starts over.
        timer.tick(15, &mut if_reg);
        timer.write(TAC_ADDR, 0b010);
        timer.write(TAC_ADDR, 0b110);
        timer.tick(15, &mut if_reg);
        assert_eq!(timer.tima, 1);
    }

    #[test]
    fn tac_reads_back_with_upper_bits_set() {
        let mut timer = Timer::new();
        timer.write(TAC_ADDR, 0xFD);
        assert_eq!(timer.read(TAC_ADDR), 0xFD);
        timer.write(TAC_ADDR, 0x00);
        assert_eq!(timer.read(TAC_ADDR), 0xF8);
    }
}
