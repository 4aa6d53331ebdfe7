//! Dreamcast (Maple bus) translator: digital pad + analog stick/triggers, built on the same
//! active-low button word shape the Maple `GET_CONDITION` reply carries.
//!
//! Grounded on `dc.c`'s `dc_btns_mask[32]` table, `dc_axes_idx`/`dc_axes_meta` (left/right stick
//! centered at 0x80, triggers 0..255 unsigned), and `dc_init_buffer`'s per-axis neutral seeding.

use crate::buttons;
use crate::control::{CtrlMeta, WiredCtrl, WiredData};

use super::{map_bits_32, pack_axis_u8};

mod wire_bit {
    pub const LEFT: u32 = 1 << 8;
    pub const RIGHT: u32 = 1 << 9;
    pub const DOWN: u32 = 1 << 10;
    pub const UP: u32 = 1 << 11;
    pub const X: u32 = 1 << 16;
    pub const B: u32 = 1 << 17;
    pub const A: u32 = 1 << 18;
    pub const Y: u32 = 1 << 19;
    pub const START: u32 = 1 << 20;
    pub const D: u32 = 1 << 21;
    pub const Z: u32 = 1 << 25;
    pub const C: u32 = 1 << 29;
}

fn btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_LEFT as usize] = wire_bit::LEFT;
    t[buttons::LD_RIGHT as usize] = wire_bit::RIGHT;
    t[buttons::LD_DOWN as usize] = wire_bit::DOWN;
    t[buttons::LD_UP as usize] = wire_bit::UP;
    t[buttons::RD_LEFT as usize] = wire_bit::X;
    t[buttons::RD_RIGHT as usize] = wire_bit::B;
    t[buttons::RD_DOWN as usize] = wire_bit::A;
    t[buttons::RD_UP as usize] = wire_bit::Y;
    t[buttons::ST as usize] = wire_bit::START;
    t[buttons::SL as usize] = wire_bit::D;
    t[buttons::LM as usize] = wire_bit::Z;
    t[buttons::RM as usize] = wire_bit::C;
    t
}

/// Byte offsets of each normalized axis within the condition report: triggers occupy bytes 0/1,
/// sticks occupy bytes 4..8 (little-endian `sticks` field in the reference `dc_map`).
const AXES_IDX: [usize; 6] = [7, 6, 5, 4, 0, 1];

pub const AXES_META: [CtrlMeta; 6] = [
    CtrlMeta::symmetric(128),
    CtrlMeta::symmetric(128).with_polarity(true),
    CtrlMeta::symmetric(128),
    CtrlMeta::symmetric(128).with_polarity(true),
    CtrlMeta {
        size_min: 0,
        size_max: 255,
        neutral: 0,
        abs_max: 255,
        abs_min: 0,
        polarity: false,
    },
    CtrlMeta {
        size_min: 0,
        size_max: 255,
        neutral: 0,
        abs_max: 255,
        abs_min: 0,
        polarity: false,
    },
];

pub fn init_buffer(wired: &mut WiredData) {
    for (i, &idx) in AXES_IDX.iter().enumerate() {
        wired.output[idx] = AXES_META[i].neutral as u8;
    }
    wired.output[2] = 0xFF;
    wired.output[3] = 0xFF;
    wired.output_mask[0..8].copy_from_slice(&[0; 8]);
}

pub fn from_generic(ctrl: &WiredCtrl, wired: &mut WiredData) {
    let mut word = u16::from_le_bytes([wired.output[2], wired.output[3]]) as u32;
    map_bits_32(ctrl.btns[0].value, ctrl.map_mask[0], &btns_mask(), true, &mut word);
    let bytes = (word as u16).to_le_bytes();
    wired.output[2] = bytes[0];
    wired.output[3] = bytes[1];

    for (i, &idx) in AXES_IDX.iter().enumerate() {
        wired.output[idx] = pack_axis_u8(&AXES_META[i], ctrl.axes[i].value);
    }
}

/// Recomputed from scratch every poll: `output_mask` is this frame's turbo overlay, not
/// accumulated state, so a bit whose cadence pattern goes quiet must stop being forced.
pub fn gen_turbo_mask(wired: &mut WiredData) {
    let mut word: u16 = 0;
    crate::remap::gen_turbo_mask_btns16_neg(wired, &mut word, &btns_mask());
    let bytes = word.to_le_bytes();
    wired.output_mask[2] = bytes[0];
    wired.output_mask[3] = bytes[1];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_press_clears_bit_active_low() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.map_mask[0] = buttons::bit(buttons::RD_DOWN);
        ctrl.btns[0].value = buttons::bit(buttons::RD_DOWN);
        from_generic(&ctrl, &mut wired);
        let word = u16::from_le_bytes([wired.output[2], wired.output[3]]) as u32;
        assert_eq!(word & wire_bit::A, 0);
    }

    #[test]
    fn trigger_axis_idle_at_zero() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        assert_eq!(wired.output[AXES_IDX[4]], 0);
        assert_eq!(wired.output[AXES_IDX[5]], 0);
    }
}
