//! PlayStation / PS2 translator: digital, analog and analog-with-pressure device-id variants,
//! plus the config-mode command sequence that swaps between them.
//!
//! Grounded on `ps.c`'s `ps_btns_mask`/`ps_axes_idx`/`ps_axes_meta` tables and `ps_spi.c`'s
//! `ps_analog_btn_hdlr` (PAD_MT press/release toggles digital↔analog, gated on the device
//! currently being one of those two modes) and the `0x43`/`0x44`/`0x4F` config-mode command
//! handlers that stage a pending device id applied on config-mode exit.

use crate::buttons;
use crate::control::{flags, CtrlMeta, WiredCtrl, WiredData};

use super::map_bits_32;

pub const DEV_ID_DIGITAL: u8 = 0x41;
pub const DEV_ID_ANALOG: u8 = 0x73;
pub const DEV_ID_ANALOG_PRESSURE: u8 = 0x79;
pub const DEV_ID_CONFIG: u8 = 0xF3;

/// Digital button bit positions (active-low 16-bit word), matching the `PS_*` enum.
mod wire_bit {
    pub const SELECT: u16 = 1 << 0;
    pub const L3: u16 = 1 << 1;
    pub const R3: u16 = 1 << 2;
    pub const START: u16 = 1 << 3;
    pub const UP: u16 = 1 << 4;
    pub const RIGHT: u16 = 1 << 5;
    pub const DOWN: u16 = 1 << 6;
    pub const LEFT: u16 = 1 << 7;
    pub const L2: u16 = 1 << 8;
    pub const R2: u16 = 1 << 9;
    pub const L1: u16 = 1 << 10;
    pub const R1: u16 = 1 << 11;
    pub const TRIANGLE: u16 = 1 << 12;
    pub const CIRCLE: u16 = 1 << 13;
    pub const CROSS: u16 = 1 << 14;
    pub const SQUARE: u16 = 1 << 15;
}

fn ps_btns_mask() -> [u32; 32] {
    let mut t = [0u32; 32];
    t[buttons::LD_UP as usize] = wire_bit::UP as u32;
    t[buttons::LD_DOWN as usize] = wire_bit::DOWN as u32;
    t[buttons::LD_LEFT as usize] = wire_bit::LEFT as u32;
    t[buttons::LD_RIGHT as usize] = wire_bit::RIGHT as u32;
    t[buttons::RD_UP as usize] = wire_bit::TRIANGLE as u32;
    t[buttons::RD_RIGHT as usize] = wire_bit::CIRCLE as u32;
    t[buttons::RD_DOWN as usize] = wire_bit::CROSS as u32;
    t[buttons::RD_LEFT as usize] = wire_bit::SQUARE as u32;
    t[buttons::ST as usize] = wire_bit::START as u32;
    t[buttons::SL as usize] = wire_bit::SELECT as u32;
    t[buttons::LM as usize] = wire_bit::L1 as u32;
    t[buttons::RM as usize] = wire_bit::R1 as u32;
    t[buttons::LT as usize] = wire_bit::L2 as u32;
    t[buttons::RT as usize] = wire_bit::R2 as u32;
    t
}

pub const STICK_META: CtrlMeta = CtrlMeta::symmetric(128);

/// Per-port device-id state machine. Lives alongside [`WiredData`] (one per logical port) since
/// it tracks more state than the generic `dev_mode` byte can hold.
#[derive(Debug, Clone, Copy)]
pub struct PsxPort {
    pub dev_id: u8,
    pend_dev_id: u8,
    pub config_mode: bool,
}

impl PsxPort {
    pub const fn new() -> Self {
        Self {
            dev_id: DEV_ID_DIGITAL,
            pend_dev_id: DEV_ID_DIGITAL,
            config_mode: false,
        }
    }

    /// `0x43`: enter (param != 0) or exit (param == 0) config mode. Entering stashes the current
    /// id so a later config command can stage a replacement; exiting commits `pend_dev_id`.
    pub fn cmd_config_mode(&mut self, enter: bool) {
        if enter {
            self.pend_dev_id = self.dev_id;
            self.config_mode = true;
            self.dev_id = DEV_ID_CONFIG;
        } else {
            self.config_mode = false;
            self.dev_id = self.pend_dev_id;
        }
    }

    /// `0x44`: while in config mode, stage digital (`analog == false`), plain-analog, or
    /// analog-with-pressure (`analog && with_pressure`) as the id to commit on config-mode exit.
    pub fn cmd_analog_select(&mut self, analog: bool, with_pressure: bool) {
        if !self.config_mode {
            return;
        }
        self.pend_dev_id = match (analog, with_pressure) {
            (true, true) => DEV_ID_ANALOG_PRESSURE,
            (true, false) => DEV_ID_ANALOG,
            (false, _) => DEV_ID_DIGITAL,
        };
    }

    /// `0x4F`: motor/rumble configuration also selects analog-with-pressure reporting.
    pub fn cmd_motor_config(&mut self, with_pressure: bool) {
        if self.config_mode {
            self.pend_dev_id = if with_pressure { DEV_ID_ANALOG_PRESSURE } else { DEV_ID_ANALOG };
        }
    }
}

impl Default for PsxPort {
    fn default() -> Self {
        Self::new()
    }
}

/// PAD_MT press-and-release toggles digital↔analog, but only while currently in one of those
/// two modes (config mode and analog-with-pressure are left alone, matching
/// `ps_analog_btn_hdlr`'s mode guard).
pub fn check_analog_toggle(ctrl: &WiredCtrl, wired: &WiredData, port: &mut PsxPort) {
    let pressed = ctrl.btns[0].value & buttons::bit(buttons::MT) != 0;
    let latched = wired.flag_test(flags::WAITING_FOR_RELEASE2);
    if pressed && !latched {
        wired.flag_set(flags::WAITING_FOR_RELEASE2);
        return;
    }
    if !pressed && latched {
        wired.flag_clear(flags::WAITING_FOR_RELEASE2);
        match port.dev_id {
            DEV_ID_DIGITAL => port.dev_id = DEV_ID_ANALOG,
            DEV_ID_ANALOG => port.dev_id = DEV_ID_DIGITAL,
            _ => {}
        }
    }
}

pub fn init_buffer(wired: &mut WiredData) {
    wired.output[0..2].copy_from_slice(&0xFFFFu16.to_le_bytes());
    wired.output[2..6].copy_from_slice(&[0x80, 0x80, 0x80, 0x80]);
    wired.output_mask[0..6].copy_from_slice(&[0, 0, 0, 0, 0, 0]);
}

/// Translate buttons and, when `port.dev_id` is an analog variant, the two sticks. Pressure
/// bytes for `DEV_ID_ANALOG_PRESSURE` reuse the button-held state directly (0xFF held / 0x00
/// released) rather than true pressure sensing, since normalized input has no pressure axis.
pub fn from_generic(ctrl: &WiredCtrl, wired: &mut WiredData, port: &PsxPort) {
    let mut word = u16::from_le_bytes([wired.output[0], wired.output[1]]) as u32;
    map_bits_32(ctrl.btns[0].value, ctrl.map_mask[0], &ps_btns_mask(), true, &mut word);
    let bytes = (word as u16).to_le_bytes();
    wired.output[0] = bytes[0];
    wired.output[1] = bytes[1];

    if port.dev_id == DEV_ID_ANALOG || port.dev_id == DEV_ID_ANALOG_PRESSURE {
        wired.output[2] = super::pack_axis_u8(&STICK_META, ctrl.axes[2].value);
        wired.output[3] = super::pack_axis_u8(&STICK_META, ctrl.axes[3].value);
        wired.output[4] = super::pack_axis_u8(&STICK_META, ctrl.axes[0].value);
        wired.output[5] = super::pack_axis_u8(&STICK_META, ctrl.axes[1].value);
    }

    if port.dev_id == DEV_ID_ANALOG_PRESSURE {
        let held = word;
        for (slot, out_idx) in [
            (wire_bit::RIGHT as u32, 6),
            (wire_bit::LEFT as u32, 7),
            (wire_bit::UP as u32, 8),
            (wire_bit::DOWN as u32, 9),
            (wire_bit::TRIANGLE as u32, 10),
            (wire_bit::CIRCLE as u32, 11),
            (wire_bit::CROSS as u32, 12),
            (wire_bit::SQUARE as u32, 13),
            (wire_bit::L1 as u32, 14),
            (wire_bit::R1 as u32, 15),
            (wire_bit::L2 as u32, 16),
            (wire_bit::R2 as u32, 17),
        ] {
            wired.output[out_idx] = if held & slot == 0 { 0xFF } else { 0x00 };
        }
    }
}

/// Recomputed from scratch every poll: `output_mask` is this frame's turbo overlay, not
/// accumulated state, so a bit whose cadence pattern goes quiet must stop being forced.
pub fn gen_turbo_mask(wired: &mut WiredData) {
    let mut word: u16 = 0;
    crate::remap::gen_turbo_mask_btns16_neg(wired, &mut word, &ps_btns_mask());
    let bytes = word.to_le_bytes();
    wired.output_mask[0] = bytes[0];
    wired.output_mask[1] = bytes[1];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt_toggle_flips_digital_and_analog_on_release() {
        let mut wired = WiredData::new();
        let mut port = PsxPort::new();
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.btns[0].value = buttons::bit(buttons::MT);

        check_analog_toggle(&ctrl, &wired, &mut port);
        assert_eq!(port.dev_id, DEV_ID_DIGITAL, "no change until release");

        ctrl.btns[0].value = 0;
        check_analog_toggle(&ctrl, &wired, &mut port);
        assert_eq!(port.dev_id, DEV_ID_ANALOG);
    }

    #[test]
    fn config_sequence_selects_analog_with_pressure() {
        let mut port = PsxPort::new();
        port.dev_id = DEV_ID_ANALOG;

        port.cmd_config_mode(true);
        assert_eq!(port.dev_id, DEV_ID_CONFIG);

        port.cmd_motor_config(true);
        port.cmd_config_mode(false);
        assert_eq!(port.dev_id, DEV_ID_ANALOG_PRESSURE);
    }

    #[test]
    fn config_mode_does_not_stage_outside_config() {
        let mut port = PsxPort::new();
        port.cmd_analog_select(true, false);
        assert_eq!(port.dev_id, DEV_ID_DIGITAL, "staging ignored outside config mode");
    }

    #[test]
    fn config_sequence_selects_pressure_via_analog_select_lock_byte() {
        let mut port = PsxPort::new();
        port.cmd_config_mode(true);
        port.cmd_analog_select(true, true);
        port.cmd_config_mode(false);
        assert_eq!(port.dev_id, DEV_ID_ANALOG_PRESSURE);
    }
}
