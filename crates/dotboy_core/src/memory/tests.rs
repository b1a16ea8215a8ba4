use super::*;
use crate::interrupts::Interrupt;
use crate::timer::{TAC_ADDR, TIMA_ADDR, TMA_ADDR};

#[test]
fn rom_is_padded_and_write_protected() {
    let mut memory = Memory::new();
    memory.load_rom(&[0x11, 0x22, 0x33]).unwrap();
    assert_eq!(memory.read8(0x0000), 0x11);
    assert_eq!(memory.read8(0x0002), 0x33);
    assert_eq!(memory.read8(0x0003), 0xFF);
    assert_eq!(memory.read8(0x7FFF), 0xFF);

    memory.write8(0x0000, 0xAA);
    assert_eq!(memory.read8(0x0000), 0x11);
}

#[test]
fn oversized_rom_is_rejected() {
    let mut memory = Memory::new();
    let image = vec![0u8; ROM_SIZE + 1];
    assert_eq!(
        memory.load_rom(&image),
        Err(MemoryError::RomTooLarge { len: ROM_SIZE + 1 })
    );

    let exact = vec![0u8; ROM_SIZE];
    assert!(memory.load_rom(&exact).is_ok());
}

#[test]
fn ram_above_rom_is_writable() {
    let mut memory = Memory::new();
    for addr in [0x8000u16, 0xC000, 0xDFFF, 0xFF80, 0xFFFE] {
        memory.write8(addr, 0x5A);
        assert_eq!(memory.read8(addr), 0x5A, "addr 0x{addr:04X}");
    }
}

#[test]
fn interrupt_registers_mask_unused_bits() {
    let mut memory = Memory::new();
    memory.write8(IF_ADDR, 0xFF);
    assert_eq!(memory.if_reg(), 0x1F);
    assert_eq!(memory.read8(IF_ADDR), 0xFF);
    memory.write8(IF_ADDR, 0x00);
    assert_eq!(memory.read8(IF_ADDR), 0xE0);

    memory.write8(IE_ADDR, 0xFF);
    assert_eq!(memory.read8(IE_ADDR), 0xFF);
    assert_eq!(memory.ie_reg(), 0xFF);
}

#[test]
fn serial_transfer_captures_sb() {
    let mut memory = Memory::new();
    for &byte in b"ok" {
        memory.write8(SB_ADDR, byte);
        memory.write8(SC_ADDR, 0x81);
        assert_eq!(memory.read8(SC_ADDR) & 0x80, 0);
    }
    // External clock: nothing is sent.
    memory.write8(SB_ADDR, b'!');
    memory.write8(SC_ADDR, 0x80);

    assert_eq!(memory.take_serial_output(), b"ok".to_vec());
    assert!(memory.take_serial_output().is_empty());
}

#[test]
fn ly_stub_is_optional() {
    let mut memory = Memory::new();
    memory.write8(LY_ADDR, 0x12);
    assert_eq!(memory.read8(LY_ADDR), 0x12);
    memory.set_ly_stub(true);
    assert_eq!(memory.read8(LY_ADDR), 0x90);
}

#[test]
fn tick_drives_timer_into_if() {
    let mut memory = Memory::new();
    memory.write8(TIMA_ADDR, 0xFF);
    memory.write8(TMA_ADDR, 0x20);
    memory.write8(TAC_ADDR, 0b111);

    memory.tick(64);
    assert_eq!(memory.read8(TIMA_ADDR), 0x20);
    assert_eq!(memory.if_reg() & Interrupt::TIMER.bits(), Interrupt::TIMER.bits());
}

#[test]
fn reset_keeps_rom_and_clears_the_rest() {
    let mut memory = Memory::new();
    memory.load_rom(&[0x3E, 0x42]).unwrap();
    memory.set_ly_stub(true);
    memory.write8(0xC000, 0x99);
    memory.write8(IE_ADDR, 0x1F);
    memory.write8(IF_ADDR, 0x04);
    memory.write8(TAC_ADDR, 0b101);
    memory.write8(SB_ADDR, b'x');
    memory.write8(SC_ADDR, 0x81);

    memory.reset();

    assert_eq!(memory.read8(0x0000), 0x3E);
    assert_eq!(memory.read8(0x0001), 0x42);
    assert_eq!(memory.read8(0xC000), 0x00);
    assert_eq!(memory.ie_reg(), 0x00);
    assert_eq!(memory.if_reg(), 0x00);
    assert_eq!(memory.read8(TAC_ADDR), 0xF8);
    assert!(memory.take_serial_output().is_empty());
    assert_eq!(memory.read8(LY_ADDR), 0x90);
}
