//! N64/GC translator: builds the button+axis word the engine's `0x01` command handler replies
//! with. The command state machine itself (identity, mempak read/write, rumble probe) lives in
//! [`crate::engines::n64`] — that part isn't translation, it's wire-protocol bookkeeping.

use crate::control::{CtrlMeta, WiredCtrl, WiredData};

use super::{map_bits_32, pack_axis_u8};
use crate::buttons;

/// N64 pad report bit positions (button word, low 16 bits of `output[0..4]`).
mod wire_bit {
    pub const A: u32 = 1 << 15;
    pub const B: u32 = 1 << 14;
    pub const Z: u32 = 1 << 13;
    pub const START: u32 = 1 << 12;
    pub const UP: u32 = 1 << 11;
    pub const DOWN: u32 = 1 << 10;
    pub const LEFT: u32 = 1 << 9;
    pub const RIGHT: u32 = 1 << 8;
    pub const L: u32 = 1 << 5;
    pub const R: u32 = 1 << 4;
    pub const CUP: u32 = 1 << 3;
    pub const CDOWN: u32 = 1 << 2;
    pub const CLEFT: u32 = 1 << 1;
    pub const CRIGHT: u32 = 1 << 0;
}

fn btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::RD_RIGHT as usize] = wire_bit::A;
    t[buttons::RD_DOWN as usize] = wire_bit::B;
    t[buttons::LM as usize] = wire_bit::Z;
    t[buttons::ST as usize] = wire_bit::START;
    t[buttons::LD_UP as usize] = wire_bit::UP;
    t[buttons::LD_DOWN as usize] = wire_bit::DOWN;
    t[buttons::LD_LEFT as usize] = wire_bit::LEFT;
    t[buttons::LD_RIGHT as usize] = wire_bit::RIGHT;
    t[buttons::RM as usize] = wire_bit::L;
    t[buttons::LX_LEFT as usize] = wire_bit::CLEFT;
    t[buttons::LX_RIGHT as usize] = wire_bit::CRIGHT;
    t[buttons::LY_DOWN as usize] = wire_bit::CDOWN;
    t[buttons::LY_UP as usize] = wire_bit::CUP;
    t
}

/// ±85 clamp on each stick axis, matching the hardware's physical travel limit.
pub const STICK_META: CtrlMeta = CtrlMeta::symmetric(85).with_polarity(false);

pub fn init_buffer(wired: &mut WiredData) {
    wired.output[0..4].copy_from_slice(&[0, 0, 0x80, 0x80]);
    wired.output_mask[0..4].copy_from_slice(&[0, 0, 0, 0]);
}

pub fn from_generic(ctrl: &WiredCtrl, wired: &mut WiredData) {
    let mut word = u16::from_be_bytes([wired.output[0], wired.output[1]]) as u32;
    map_bits_32(ctrl.btns[0].value, ctrl.map_mask[0], &btns_mask(), false, &mut word);
    let bytes = (word as u16).to_be_bytes();
    wired.output[0] = bytes[0];
    wired.output[1] = bytes[1];
    wired.output[2] = pack_axis_u8(&STICK_META, ctrl.axes[0].value);
    wired.output[3] = pack_axis_u8(&STICK_META, ctrl.axes[1].value);
}

/// Recomputed from scratch every poll: `output_mask` is this frame's turbo overlay, not
/// accumulated state, so a bit whose cadence pattern goes quiet must stop being forced.
pub fn gen_turbo_mask(wired: &mut WiredData) {
    let mut word: u16 = 0;
    crate::remap::gen_turbo_mask_btns16_neg(wired, &mut word, &btns_mask());
    let bytes = word.to_be_bytes();
    wired.output_mask[0] = bytes[0];
    wired.output_mask[1] = bytes[1];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_press_sets_bit() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.map_mask[0] = buttons::bit(buttons::RD_RIGHT);
        ctrl.btns[0].value = buttons::bit(buttons::RD_RIGHT);
        from_generic(&ctrl, &mut wired);
        let word = u16::from_be_bytes([wired.output[0], wired.output[1]]);
        assert_eq!(word as u32 & wire_bit::A, wire_bit::A);
    }
}
