//! Targets that only need the shared 32-bit-word mapping algorithm: SNES, NES, PCE, Jaguar,
//! 3DO, Wii Extension, PCFX, JVS, CD-i and the parallel-port pass-through adapters.
//!
//! Grounded on the NES/SNES `npiso_btns_mask`/`npiso_mask` tables (the only fully-read source for
//! this family within the retrieved pack); the other listed systems reuse the same algorithm with
//! their own [`Descriptor`], since none of them need multi-cycle banking or a bespoke handshake.

use crate::buttons;
use crate::control::{WiredCtrl, WiredData};

use super::{map_bits_32, pack_axis_u8, Descriptor};

const fn b(pos: u32) -> u32 {
    buttons::bit(pos)
}

/// NES/SNES button bit positions on the wire (shift-register order: A,B,Select,Start,Up,Down,
/// Left,Right, then X,Y,L,R for SNES).
mod wire_bits {
    pub const RIGHT: u32 = 0;
    pub const LEFT: u32 = 1;
    pub const DOWN: u32 = 2;
    pub const UP: u32 = 3;
    pub const START: u32 = 4;
    pub const SELECT: u32 = 5;
    pub const Y: u32 = 6;
    pub const B: u32 = 7;
    pub const X: u32 = 10;
    pub const A: u32 = 11;
    pub const R: u32 = 12;
    pub const L: u32 = 13;
}

fn snes_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_LEFT as usize] = 1 << wire_bits::LEFT;
    t[buttons::LD_RIGHT as usize] = 1 << wire_bits::RIGHT;
    t[buttons::LD_DOWN as usize] = 1 << wire_bits::DOWN;
    t[buttons::LD_UP as usize] = 1 << wire_bits::UP;
    t[buttons::RD_LEFT as usize] = 1 << wire_bits::Y;
    t[buttons::RD_RIGHT as usize] = 1 << wire_bits::A;
    t[buttons::RD_DOWN as usize] = 1 << wire_bits::B;
    t[buttons::RD_UP as usize] = 1 << wire_bits::X;
    t[buttons::ST as usize] = 1 << wire_bits::START;
    t[buttons::SL as usize] = 1 << wire_bits::SELECT;
    t[buttons::LM as usize] = 1 << wire_bits::L;
    t[buttons::RM as usize] = 1 << wire_bits::R;
    t
}

fn nes_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_LEFT as usize] = 1 << wire_bits::LEFT;
    t[buttons::LD_RIGHT as usize] = 1 << wire_bits::RIGHT;
    t[buttons::LD_DOWN as usize] = 1 << wire_bits::DOWN;
    t[buttons::LD_UP as usize] = 1 << wire_bits::UP;
    t[buttons::RD_RIGHT as usize] = 1 << wire_bits::A;
    t[buttons::RD_DOWN as usize] = 1 << wire_bits::B;
    t[buttons::ST as usize] = 1 << wire_bits::START;
    t[buttons::SL as usize] = 1 << wire_bits::SELECT;
    t
}

/// SNES descriptor: active-low shift register, face/shoulder/meta bits, no analog axes wired to
/// the digital report (mouse/trackball variants are out of scope for this descriptor).
pub fn snes_descriptor() -> Descriptor {
    Descriptor {
        mask: [0x003F_0FF0 | b(buttons::LM) as u32 | b(buttons::RM) as u32, 0, 0, 0],
        desc: [0, 0, 0, 0],
        btns_mask: snes_btns_mask(),
        axes_idx: &[],
        axes_meta: &[],
        active_low: true,
    }
}

pub fn nes_descriptor() -> Descriptor {
    Descriptor {
        mask: [0x0000_0FF0, 0, 0, 0],
        desc: [0, 0, 0, 0],
        btns_mask: nes_btns_mask(),
        axes_idx: &[],
        axes_meta: &[],
        active_low: true,
    }
}

/// Translate one report for any [`Descriptor`]-driven target: bit 0 of `output` carries the wire
/// word little-endian.
pub fn from_generic(desc: &Descriptor, ctrl: &WiredCtrl, wired: &mut WiredData) {
    let mut word = u32::from_le_bytes([wired.output[0], wired.output[1], wired.output[2], wired.output[3]]);
    map_bits_32(ctrl.btns[0].value, ctrl.map_mask[0] & desc.mask[0], &desc.btns_mask, desc.active_low, &mut word);
    wired.output[0..4].copy_from_slice(&word.to_le_bytes());

    for i in 0..desc.axes_idx.len() {
        if ctrl.desc[0] & desc.desc[0] != 0 {
            wired.output[desc.axes_idx[i]] = pack_axis_u8(&desc.axes_meta[i], ctrl.axes[i].value);
        }
    }
}

/// Turbo overlay for a [`Descriptor`]-driven target, dispatched by polarity since the shared
/// table only stores the mask, not the wire's active level. Recomputed from scratch every poll:
/// `output_mask` is this frame's overlay, not accumulated state.
pub fn gen_turbo_mask(desc: &Descriptor, wired: &mut WiredData) {
    let mut word: u16 = 0;
    if desc.active_low {
        crate::remap::gen_turbo_mask_btns16_neg(wired, &mut word, &desc.btns_mask);
    } else {
        crate::remap::gen_turbo_mask_btns16_pos(wired, &mut word, &desc.btns_mask);
    }
    let bytes = word.to_le_bytes();
    wired.output_mask[0] = bytes[0];
    wired.output_mask[1] = bytes[1];
}

pub fn init_buffer(desc: &Descriptor, wired: &mut WiredData) {
    let idle = if desc.active_low { 0xFFu8 } else { 0x00 };
    for b in wired.output[0..4].iter_mut() {
        *b = idle;
    }
    for b in wired.output_mask[0..4].iter_mut() {
        *b = 0x00;
    }
    for &idx in desc.axes_idx.iter() {
        wired.output[idx] = 0x80;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons;

    #[test]
    fn snes_start_press_clears_start_bit_active_low() {
        let desc = snes_descriptor();
        let mut wired = WiredData::new();
        init_buffer(&desc, &mut wired);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.map_mask[0] = desc.mask[0];
        ctrl.btns[0].value = buttons::bit(buttons::ST);

        from_generic(&desc, &ctrl, &mut wired);
        let word = u32::from_le_bytes([wired.output[0], wired.output[1], wired.output[2], wired.output[3]]);
        assert_eq!(word & (1 << wire_bits::START), 0);

        ctrl.btns[0].value = 0;
        from_generic(&desc, &ctrl, &mut wired);
        let word = u32::from_le_bytes([wired.output[0], wired.output[1], wired.output[2], wired.output[3]]);
        assert_ne!(word & (1 << wire_bits::START), 0);
    }
}
