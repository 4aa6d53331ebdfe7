//! Genesis/Mega Drive translator: TH-strobed 3-button/6-button cycling, TeamPlayer and EA
//! 4-Way multitap aggregation.
//!
//! Grounded on `genesis.c`'s `genesis_btns_mask[2][3][32]` cycle table, `genesis_init_buffer`'s
//! literal idle-frame constants (`0xFFFDFFFD`), the six-button cycle-2/cycle-3 reveal sequence,
//! and `genesis_ctrl_special_action`'s `PAD_MT`-triggered device-mode toggle.

use crate::buttons;
use crate::control::{WiredCtrl, WiredData};
use crate::remap;

/// Bit positions within one 16-bit output bank. Bit 1 is a hard-wired-low pin on real Genesis
/// controller-port electronics and is never driven by any button; TR (bit 0) is the pin whose
/// meaning depends on which cycle is active — preserved here per the "bytes reused across A/B/C
/// at the same pin" note rather than given each cycle its own dedicated pin.
mod wire_bit {
    pub const TR: u16 = 1 << 0;
    pub const RESERVED: u16 = 1 << 1;
    pub const UP: u16 = 1 << 2;
    pub const DOWN: u16 = 1 << 3;
    pub const LEFT: u16 = 1 << 4;
    pub const RIGHT: u16 = 1 << 5;
    pub const TL: u16 = 1 << 6;
}

/// Idle value of a single 16-bit bank: everything released except the hard-wired-low pin.
const IDLE_BANK: u16 = !wire_bit::RESERVED;

/// Idle 32-bit word presented at `output[0..4]`: low half is the TH-high cycle, high half is the
/// TH-low cycle — matches the literal `0xFFFDFFFD` constant from the three-button idle frame.
pub const IDLE_WORD: u32 = ((IDLE_BANK as u32) << 16) | IDLE_BANK as u32;

/// Bit index, within the packed 32-bit output word, of the TR pin on the TH-low cycle — the
/// position the Start button asserts.
pub const P1_TR_PIN: u32 = 16;

fn cycle0_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_UP as usize] = wire_bit::UP as u32;
    t[buttons::LD_DOWN as usize] = wire_bit::DOWN as u32;
    t[buttons::LD_LEFT as usize] = wire_bit::LEFT as u32;
    t[buttons::LD_RIGHT as usize] = wire_bit::RIGHT as u32;
    t[buttons::RD_RIGHT as usize] = wire_bit::TR as u32; // A
    t[buttons::RD_DOWN as usize] = wire_bit::TL as u32; // B
    t
}

fn cycle1_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_UP as usize] = wire_bit::UP as u32;
    t[buttons::LD_DOWN as usize] = wire_bit::DOWN as u32;
    t[buttons::LD_LEFT as usize] = wire_bit::LEFT as u32;
    t[buttons::LD_RIGHT as usize] = wire_bit::RIGHT as u32;
    t[buttons::ST as usize] = wire_bit::TR as u32; // Start
    t[buttons::RD_LEFT as usize] = wire_bit::TL as u32; // C
    t
}

/// Six-button reveal cycle: the low nibble (UP/DOWN/LEFT/RIGHT positions) is repurposed for
/// X/Y/Z/Mode once the host has clocked the extra TH pulses that prove 6-button capability.
fn cycle2_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LX_LEFT as usize] = wire_bit::UP as u32; // Z
    t[buttons::LX_RIGHT as usize] = wire_bit::DOWN as u32; // Y
    t[buttons::LY_DOWN as usize] = wire_bit::LEFT as u32; // X
    t[buttons::LY_UP as usize] = wire_bit::RIGHT as u32; // Mode
    t
}

fn btns_mask(cycle: usize) -> [u32; 32] {
    match cycle {
        0 => cycle0_btns_mask(),
        1 => cycle1_btns_mask(),
        _ => cycle2_btns_mask(),
    }
}

/// Write the idle three-button frame (no multitap, no 6-button cycle) into the port's buffer.
pub fn init_buffer(wired: &mut WiredData) {
    wired.output[0..4].copy_from_slice(&IDLE_WORD.to_le_bytes());
    wired.output_mask[0..4].copy_from_slice(&0u32.to_le_bytes());
}

/// Translate one report for cycle `th_cycle` (0 = TH high, 1 = TH low, 2 = six-button reveal),
/// preserving the contents of the other cycles' banks already present in `output`.
pub fn from_generic(th_cycle: usize, ctrl: &WiredCtrl, wired: &mut WiredData) {
    let _dev_mode_changed = remap::check_dev_mode_toggle(ctrl, wired);

    let mut word = u32::from_le_bytes([wired.output[0], wired.output[1], wired.output[2], wired.output[3]]);
    let mask_table = btns_mask(th_cycle);
    let shift = if th_cycle == 1 { 16 } else { 0 };
    let mut bank = ((word >> shift) & 0xFFFF) as u32;

    super::map_bits_32(ctrl.btns[0].value, ctrl.map_mask[0], &mask_table, true, &mut bank);

    word = (word & !(0xFFFFu32 << shift)) | ((bank & 0xFFFF) << shift);
    wired.output[0..4].copy_from_slice(&word.to_le_bytes());
}

/// Apply the turbo overlay across both standard cycles at once (OR-combine on the active-low
/// Genesis bus, matching `wired_gen_turbo_mask_btns32`). Recomputed from scratch every poll:
/// `output_mask` is this frame's turbo overlay, not accumulated state, so a bit whose cadence
/// pattern goes quiet must stop being forced.
pub fn gen_turbo_mask(wired: &mut WiredData) {
    let mut banks = [0u32, 0u32];
    remap::gen_turbo_mask_btns32(wired, &mut banks, &[cycle0_btns_mask(), cycle1_btns_mask()]);
    let word = banks[0] | (banks[1] << 16);
    wired.output_mask[0..4].copy_from_slice(&word.to_le_bytes());
}

/// TeamPlayer multitap: pack up to 4 sub-port digital states into the nibble-framed block the
/// real hardware's ID0=0x7 multitap protocol expects. Each sub-port contributes one button
/// nibble per phase; callers drive the phase sequencing from the engine.
pub fn teamplayer_pack(sub_ports: &[&WiredData; 4], phase: usize, out: &mut [u8; 4]) {
    for (i, port) in sub_ports.iter().enumerate() {
        let word = u32::from_le_bytes([port.output[0], port.output[1], port.output[2], port.output[3]]);
        let bank = if phase == 0 { word & 0xFFFF } else { (word >> 16) & 0xFFFF };
        out[i] = (bank & 0xFF) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_word_matches_literal_constant() {
        assert_eq!(IDLE_WORD, 0xFFFD_FFFD);
    }

    #[test]
    fn start_press_on_th_low_cycle_clears_tr_pin() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.map_mask[0] = buttons::bit(buttons::ST);
        ctrl.btns[0].value = buttons::bit(buttons::ST);

        from_generic(1, &ctrl, &mut wired);
        let word = u32::from_le_bytes([wired.output[0], wired.output[1], wired.output[2], wired.output[3]]);
        assert_eq!(word, IDLE_WORD & !(1 << P1_TR_PIN));

        ctrl.btns[0].value = 0;
        from_generic(1, &ctrl, &mut wired);
        from_generic(0, &ctrl, &mut wired);
        let word = u32::from_le_bytes([wired.output[0], wired.output[1], wired.output[2], wired.output[3]]);
        assert_eq!(word, IDLE_WORD);
    }

    #[test]
    fn turbo_30hz_on_a_button_asserts_64_of_128_frames() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        wired.cnt_mask[buttons::RD_RIGHT as usize] = (0b0100000 << 1) | 0;

        let mut asserted = 0;
        for frame in 0..=127u8 {
            wired.frame_cnt = frame;
            gen_turbo_mask(&mut wired);
            let mask = u32::from_le_bytes([
                wired.output_mask[0],
                wired.output_mask[1],
                wired.output_mask[2],
                wired.output_mask[3],
            ]);
            if mask & wire_bit::TR as u32 != 0 {
                asserted += 1;
            }
        }
        assert_eq!(asserted, 64);
    }
}
