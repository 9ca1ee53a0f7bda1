//! Black-box tests driving the machine through its public surface only:
//! hand-assembled programs loaded with `Vm::load` and run with `Vm::step`.

use okto8::{ROM_CAPACITY, Vm};

const NO_KEYS: [bool; 16] = [false; 16];

fn rom(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn run_program(words: &[u16], steps: usize) -> Vm {
    let mut vm = Vm::new();
    vm.load(&rom(words)).unwrap();
    for _ in 0..steps {
        vm.step(&NO_KEYS).unwrap();
    }
    vm
}

#[test]
fn load_then_add_doubles_modulo_256() {
    for nn in [0x00u8, 0x01, 0x7F, 0x80, 0xAB, 0xFF] {
        let word_load = 0x6300 | u16::from(nn);
        let word_add = 0x7300 | u16::from(nn);
        let vm = run_program(&[word_load, word_add], 2);
        assert_eq!(vm.registers()[0x3], nn.wrapping_mul(2), "nn = {nn:#04X}");
    }
}

#[test]
fn add_reg_sets_carry_flag() {
    // V0 = 0xFF; V1 = 0x01; V0 += V1
    let vm = run_program(&[0x60FF, 0x6101, 0x8014], 3);
    assert_eq!(vm.registers()[0x0], 0x00);
    assert_eq!(vm.registers()[0xF], 1);

    let vm = run_program(&[0x6001, 0x6101, 0x8014], 3);
    assert_eq!(vm.registers()[0x0], 0x02);
    assert_eq!(vm.registers()[0xF], 0);
}

#[test]
fn sub_reg_sets_no_borrow_flag() {
    // V0 = 0x05; V1 = 0x0A; V0 -= V1 (borrows)
    let vm = run_program(&[0x6005, 0x610A, 0x8015], 3);
    assert_eq!(vm.registers()[0x0], 0xFB);
    assert_eq!(vm.registers()[0xF], 0);

    let vm = run_program(&[0x600A, 0x6105, 0x8015], 3);
    assert_eq!(vm.registers()[0x0], 0x05);
    assert_eq!(vm.registers()[0xF], 1);
}

#[test]
fn reverse_sub_computes_vy_minus_vx() {
    // V0 = 0x03; V1 = 0x0A; V0 = V1 - V0
    let vm = run_program(&[0x6003, 0x610A, 0x8017], 3);
    assert_eq!(vm.registers()[0x0], 0x07);
    assert_eq!(vm.registers()[0xF], 1);

    let vm = run_program(&[0x600A, 0x6103, 0x8017], 3);
    assert_eq!(vm.registers()[0x0], 0xF9);
    assert_eq!(vm.registers()[0xF], 0);
}

#[test]
fn or_is_a_bitwise_or_and_leaves_vf_alone() {
    // VF = 0x07 beforehand to prove the OR group does not touch it
    let vm = run_program(&[0x6F07, 0x60F0, 0x610F, 0x8011], 4);
    assert_eq!(vm.registers()[0x0], 0xFF);
    assert_eq!(vm.registers()[0xF], 0x07);
}

#[test]
fn shifts_operate_on_vx_and_flag_the_shifted_out_bit() {
    // V2 = 0b1000_0101, SHR
    let vm = run_program(&[0x6285, 0x8236], 2);
    assert_eq!(vm.registers()[0x2], 0b0100_0010);
    assert_eq!(vm.registers()[0xF], 1);

    // V2 = 0b1000_0101, SHL
    let vm = run_program(&[0x6285, 0x823E], 2);
    assert_eq!(vm.registers()[0x2], 0b0000_1010);
    assert_eq!(vm.registers()[0xF], 1);

    // Flag comes from the pre-shift value even though the operand is even
    let vm = run_program(&[0x6202, 0x8236], 2);
    assert_eq!(vm.registers()[0x2], 1);
    assert_eq!(vm.registers()[0xF], 0);
}

#[test]
fn conditional_skips() {
    // V0 = 5; SE V0, 5 skips the jump back to 0x200
    let vm = run_program(&[0x6005, 0x3005, 0x1200, 0x6107], 3);
    assert_eq!(vm.registers()[0x1], 0x07);

    // SNE V0, 5 must not skip
    let vm = run_program(&[0x6005, 0x4005, 0x6107], 3);
    assert_eq!(vm.registers()[0x1], 0x07);
}

#[test]
fn bcd_writes_hundreds_tens_units() {
    // V4 = 157; I = 0x300; LD B, V4
    let vm = run_program(&[0x649D, 0xA300, 0xF433], 3);
    assert_eq!(vm.memory().read(0x300), 1);
    assert_eq!(vm.memory().read(0x301), 5);
    assert_eq!(vm.memory().read(0x302), 7);
}

#[test]
fn store_and_load_regs_leave_index_unchanged() {
    // V0..V2 = 1,2,3; I = 0x300; store V0-V2; clobber V1; reload
    let vm = run_program(
        &[0x6001, 0x6102, 0x6203, 0xA300, 0xF255, 0x61FF, 0xF265],
        7,
    );
    assert_eq!(vm.registers()[..3], [1, 2, 3]);
    assert_eq!(vm.index(), 0x300);
    assert_eq!(vm.memory().read(0x300), 1);
    assert_eq!(vm.memory().read(0x302), 3);
}

#[test]
fn add_index_wraps_at_twelve_bits() {
    // I = 0xFFF; V0 = 0x02; ADD I, V0
    let vm = run_program(&[0xAFFF, 0x6002, 0xF01E], 3);
    assert_eq!(vm.index(), 0x001);
}

#[test]
fn font_glyph_addresses_are_five_bytes_apart() {
    // V0 = 0xA; LD F, V0
    let vm = run_program(&[0x600A, 0xF029], 2);
    assert_eq!(vm.index(), 0xA * 5);
    // First row of the 'A' glyph
    assert_eq!(vm.memory().read(vm.index()), 0xF0);
}

#[test]
fn delay_timer_round_trips_through_fx07() {
    // V0 = 0x20; LD DT, V0; LD V5, DT
    let vm = run_program(&[0x6020, 0xF015, 0xF507], 3);
    assert_eq!(vm.registers()[0x5], 0x20);
    assert_eq!(vm.delay_timer(), 0x20);
}

#[test]
fn random_is_masked_by_nn() {
    // RND V0, 0x00 must always produce zero
    let vm = run_program(&[0xC000], 1);
    assert_eq!(vm.registers()[0x0], 0);

    // RND V0, 0x0F never sets the high nibble
    for _ in 0..20 {
        let vm = run_program(&[0xC00F], 1);
        assert_eq!(vm.registers()[0x0] & 0xF0, 0);
    }
}

#[test]
fn jump_with_offset_adds_v0() {
    // V0 = 0x04; JP V0, 0x300
    let mut vm = Vm::new();
    vm.load(&rom(&[0x6004, 0xB300])).unwrap();
    vm.step(&NO_KEYS).unwrap();
    vm.step(&NO_KEYS).unwrap();
    assert_eq!(vm.pc(), 0x304);
}

#[test]
fn sprite_draw_wraps_and_collides() {
    // VA = 60, VB = 0, I -> 0xFF row, draw twice
    let words = [0x6A3C, 0x6B00, 0xA20C, 0xDAB1, 0xDAB1, 0x120A, 0xFF00];
    let mut vm = Vm::new();
    vm.load(&rom(&words)).unwrap();

    for _ in 0..4 {
        vm.step(&NO_KEYS).unwrap();
    }

    // First draw: wraps across the right edge, no collision
    assert_eq!(vm.registers()[0xF], 0);
    let grid = vm.framebuffer().pixels();
    for x in [60, 61, 62, 63, 0, 1, 2, 3] {
        assert!(grid[0][x], "pixel {x} should be lit");
    }
    assert!(!grid[0][4]);
    assert!(!grid[1][0]);

    // Second identical draw erases every pixel and reports the collision
    vm.step(&NO_KEYS).unwrap();
    assert_eq!(vm.registers()[0xF], 1);
    assert!(vm.framebuffer().pixels()[0].iter().all(|&p| !p));
}

#[test]
fn call_and_return_restore_the_pc() {
    // 0x200: CALL 0x206; 0x202: LD V1, 0x42; 0x206: RET
    let words = [0x2206, 0x6142, 0x0000, 0x00EE];
    let mut vm = Vm::new();
    vm.load(&rom(&words)).unwrap();

    vm.step(&NO_KEYS).unwrap();
    assert_eq!(vm.pc(), 0x206);
    vm.step(&NO_KEYS).unwrap();
    assert_eq!(vm.pc(), 0x202);
    vm.step(&NO_KEYS).unwrap();
    assert_eq!(vm.registers()[0x1], 0x42);
}

#[test]
fn rom_size_boundary() {
    let mut vm = Vm::new();
    assert!(vm.load(&vec![0; ROM_CAPACITY]).is_ok());
    assert!(vm.load(&vec![0; ROM_CAPACITY + 1]).is_err());
    assert_eq!(ROM_CAPACITY, 0xE00);
}

#[test]
fn skip_if_not_pressed_skips_when_idle() {
    // V0 = 7; SKNP V0 skips the jump back; LD V1, 1
    let vm = run_program(&[0x6007, 0xE0A1, 0x1200, 0x6101], 3);
    assert_eq!(vm.registers()[0x1], 1);
}
