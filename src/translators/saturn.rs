//! Sega Saturn translator: digital pad, analog ("PAD_ALT", analog triggers reported as a
//! digital L/R threshold), 3D/mission-stick axes, mouse and keyboard device modes.
//!
//! Grounded on `saturn.c`'s `saturn_btns_mask`/`saturn_axes_idx`/`saturn_axes_meta` tables, the
//! active-low bit layout (`saturn_mask`/`saturn_desc`), `saturn_ctrl_from_generic`'s PAD_ALT
//! analog-trigger-to-digital conversion at raw thresholds `0x56`/`0x8D`, and
//! `saturn_kb_from_generic`'s lazy kbmon init gated by `flags::KBMON_INIT`.

use crate::buttons;
use crate::control::{flags, CtrlMeta, WiredCtrl, WiredData};
use crate::kbmon::{KbMonitor, KeyEvent};

use super::{map_bits_32, pack_axis_u8};

/// Saturn digital pad bit positions (active-low, matches the `enum` in the reference source:
/// B/C/A/START in the low nibble group, LD_UP/DOWN/LEFT/RIGHT next, L/Z/Y/X/R in the high group).
mod wire_bit {
    pub const START: u16 = 1 << 3;
    pub const A: u16 = 1 << 2;
    pub const C: u16 = 1 << 1;
    pub const B: u16 = 1 << 0;
    pub const UP: u16 = 1 << 12;
    pub const DOWN: u16 = 1 << 13;
    pub const LEFT: u16 = 1 << 14;
    pub const RIGHT: u16 = 1 << 15;
    pub const L: u16 = 1 << 9;
    pub const Z: u16 = 1 << 8;
    pub const Y: u16 = 1 << 11;
    pub const X: u16 = 1 << 10;
    pub const R: u16 = 1 << 4;
}

fn saturn_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_UP as usize] = wire_bit::UP as u32;
    t[buttons::LD_DOWN as usize] = wire_bit::DOWN as u32;
    t[buttons::LD_LEFT as usize] = wire_bit::LEFT as u32;
    t[buttons::LD_RIGHT as usize] = wire_bit::RIGHT as u32;
    t[buttons::RD_RIGHT as usize] = wire_bit::A as u32;
    t[buttons::RD_DOWN as usize] = wire_bit::B as u32;
    t[buttons::RD_LEFT as usize] = wire_bit::C as u32;
    t[buttons::RD_UP as usize] = wire_bit::X as u32;
    t[buttons::ST as usize] = wire_bit::START as u32;
    t[buttons::LM as usize] = wire_bit::L as u32;
    t[buttons::RM as usize] = wire_bit::R as u32;
    t[buttons::LT as usize] = wire_bit::Z as u32;
    t[buttons::RT as usize] = wire_bit::Y as u32;
    t
}

/// Stick/trigger axis slots, indexed into `output` byte-wise: left-stick X/Y share indices 0/1,
/// the "3D"/mission-stick variant additionally reports raw L/R trigger bytes at 2/3.
pub const SATURN_AXES_IDX: [usize; 6] = [0, 1, 0, 0, 3, 2];

pub const SATURN_AXES_META: [CtrlMeta; 6] = [
    CtrlMeta::symmetric(128),
    CtrlMeta::symmetric(128).with_polarity(true),
    CtrlMeta::symmetric(128),
    CtrlMeta::symmetric(128),
    CtrlMeta::symmetric(128),
    CtrlMeta::symmetric(128),
];

/// Raw trigger thresholds the PAD_ALT digital conversion compares against (`saturn.c`'s
/// `ps_analog_to_digital`-style threshold pair: below 0x56 -> released, above 0x8D -> pressed,
/// the gap between them is the dead zone).
const TRIGGER_LOW: i32 = 0x56;
const TRIGGER_HIGH: i32 = 0x8D;

pub fn init_buffer(wired: &mut WiredData) {
    wired.output[0..2].copy_from_slice(&0xFFFFu16.to_le_bytes());
    wired.output[2] = 0x80;
    wired.output[3] = 0x80;
    wired.output_mask[0..4].copy_from_slice(&[0, 0, 0, 0]);
}

/// Digital pad translation, also handling the PAD_ALT (3D pad) analog-trigger threshold
/// conversion into the L/Z and R/Y digital bits when `dev_mode` selects that variant.
pub fn from_generic(ctrl: &WiredCtrl, wired: &mut WiredData) {
    let mut word = u16::from_le_bytes([wired.output[0], wired.output[1]]) as u32;
    let table = saturn_btns_mask();
    map_bits_32(ctrl.btns[0].value, ctrl.map_mask[0], &table, true, &mut word);

    if wired.dev_mode & 1 != 0 {
        // PAD_ALT: left/right trigger axes additionally drive L/Z and R/Y as digital bits,
        // using hysteresis so a trigger resting in the dead zone never chatters.
        apply_trigger_digital(ctrl.axes[4].value, wire_bit::L as u32 | wire_bit::Z as u32, &mut word);
        apply_trigger_digital(ctrl.axes[5].value, wire_bit::R as u32 | wire_bit::Y as u32, &mut word);
    }

    let bytes = (word as u16).to_le_bytes();
    wired.output[0] = bytes[0];
    wired.output[1] = bytes[1];
    wired.output[2] = pack_axis_u8(&SATURN_AXES_META[0], ctrl.axes[0].value);
    wired.output[3] = pack_axis_u8(&SATURN_AXES_META[1], ctrl.axes[1].value);
}

fn apply_trigger_digital(raw: i32, bits: u32, word: &mut u32) {
    if raw >= TRIGGER_HIGH {
        *word &= !bits;
    } else if raw < TRIGGER_LOW {
        *word |= bits;
    }
    // within the dead zone: leave the current latched state untouched.
}

/// Recomputed from scratch every poll: `output_mask` is this frame's turbo overlay, not
/// accumulated state, so a bit whose cadence pattern goes quiet must stop being forced.
pub fn gen_turbo_mask(wired: &mut WiredData) {
    let mut word: u16 = 0;
    crate::remap::gen_turbo_mask_btns16_neg(wired, &mut word, &saturn_btns_mask());
    let bytes = word.to_le_bytes();
    wired.output_mask[0] = bytes[0];
    wired.output_mask[1] = bytes[1];
}

/// Keyboard-mode translation: lazily initializes the port's keyboard monitor, diffs the
/// normalized key bitmap and pushes MAKE (`0x08` prefix) / BREAK (`0x01` prefix) scancode
/// messages for the engine to drain.
pub fn kb_from_generic(ctrl: &WiredCtrl, wired: &WiredData, kbmon: &mut KbMonitor, scancode_of: impl Fn(usize, u32) -> u8) {
    if !wired.flag_test(flags::KBMON_INIT) {
        wired.flag_set(flags::KBMON_INIT);
    }
    // `update`'s callback cannot itself call back into `kbmon` (it is already borrowed for the
    // duration of the call), so the MAKE/BREAK events are collected first and the scancodes are
    // queued once the diff pass has returned. Order is preserved: `update` already guarantees
    // bit `i` fires before bit `i+1`. `frame_cnt` stands in for the typematic clock here (no
    // microsecond timer is threaded into the translator layer); it is monotonic at poll
    // granularity, which is all the delay/rate arming needs.
    let now_ticks = wired.frame_cnt as u32;
    let mut events: heapless::Vec<(u8, u8), 32> = heapless::Vec::new();
    kbmon.update(&[ctrl.btns[0].value, ctrl.btns[1].value, ctrl.btns[2].value, ctrl.btns[3].value], now_ticks, |w, bit, event| {
        let code = scancode_of(w, bit);
        let prefix = match event {
            KeyEvent::Make => 0x08,
            KeyEvent::Break => 0x01,
        };
        let _ = events.push((prefix, code));
    });
    // Driven from the same call so a held key keeps repeating on frames with no new edges; this
    // is the only place `kb_from_generic` runs, once per poll, regardless of whether `update`
    // above found a change.
    kbmon.poll_typematic(now_ticks, |w, bit, event| {
        let code = scancode_of(w, bit);
        let prefix = match event {
            KeyEvent::Make => 0x08,
            KeyEvent::Break => 0x01,
        };
        let _ = events.push((prefix, code));
    });
    for (prefix, code) in events {
        kbmon.set_code_prefixed(prefix, code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_press_clears_bit_active_low() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.map_mask[0] = buttons::bit(buttons::RD_RIGHT);
        ctrl.btns[0].value = buttons::bit(buttons::RD_RIGHT);
        from_generic(&ctrl, &mut wired);
        let word = u16::from_le_bytes([wired.output[0], wired.output[1]]) as u32;
        assert_eq!(word & wire_bit::A as u32, 0);
    }

    #[test]
    fn pad_alt_trigger_above_high_threshold_sets_digital_bit_low() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        wired.dev_mode = 1;
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.axes[4].value = 0xA0;
        from_generic(&ctrl, &mut wired);
        let word = u16::from_le_bytes([wired.output[0], wired.output[1]]) as u32;
        assert_eq!(word & (wire_bit::L as u32 | wire_bit::Z as u32), 0);
    }

    #[test]
    fn pad_alt_trigger_below_low_threshold_releases_digital_bit() {
        let mut wired = WiredData::new();
        init_buffer(&mut wired);
        wired.dev_mode = 1;
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.axes[4].value = 0xA0;
        from_generic(&ctrl, &mut wired);
        ctrl.axes[4].value = 0x10;
        from_generic(&ctrl, &mut wired);
        let word = u16::from_le_bytes([wired.output[0], wired.output[1]]) as u32;
        assert_ne!(word & (wire_bit::L as u32 | wire_bit::Z as u32), 0);
    }
}
