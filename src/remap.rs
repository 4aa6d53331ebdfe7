//! Remap & turbo engine (C2): turbo/autofire mask generation and combo/macro detection.
//!
//! Grounded on `wired_gen_turbo_mask_btns16_pos/_neg/_btns32/_axes8` and `macro.c`'s six-entry
//! combo table from the reference firmware this core is patterned after.

use crate::buttons;
use crate::control::{flags, CtrlMeta, WiredCtrl, WiredData};

/// Decompose a turbo descriptor byte into (cadence pattern, polarity).
///
/// Bit 0 selects polarity (press-phase vs release-phase asserts the mask); bits 1..7 are the
/// 7-bit cadence pattern tested against the frame counter.
#[inline]
fn split_cnt_mask(cnt_mask: u8) -> (u8, bool) {
    (cnt_mask >> 1, cnt_mask & 1 != 0)
}

/// True if turbo mask bit `b` should be asserted this frame for cadence `cnt_mask` at
/// `frame_cnt`. Identity (`false`) whenever the cadence pattern is zero.
#[inline]
pub fn turbo_active(cnt_mask: u8, frame_cnt: u8) -> bool {
    let (m, polarity) = split_cnt_mask(cnt_mask);
    if m == 0 {
        return false;
    }
    if polarity {
        (m & frame_cnt) == 0
    } else {
        (m & frame_cnt) != m
    }
}

/// Generate the OR-combine turbo mask for an active-low 16-bit wire word (teacher's
/// `_btns16_neg`: asserting the mask bit forces the button bit low i.e. held).
pub fn gen_turbo_mask_btns16_neg(wired: &WiredData, buttons: &mut u16, btns_mask: &[u32; 32]) {
    for i in 0..32 {
        let mask_bit = btns_mask[i];
        if mask_bit == 0 {
            continue;
        }
        if turbo_active(wired.cnt_mask[i], wired.frame_cnt) {
            *buttons |= mask_bit as u16;
        }
    }
}

/// Generate the AND-combine turbo mask for an active-high wire word (teacher's `_btns16_pos`:
/// asserting the mask bit forces the button bit off during the off-phase).
pub fn gen_turbo_mask_btns16_pos(wired: &WiredData, buttons: &mut u16, btns_mask: &[u32; 32]) {
    for i in 0..32 {
        let mask_bit = btns_mask[i];
        if mask_bit == 0 {
            continue;
        }
        if turbo_active(wired.cnt_mask[i], wired.frame_cnt) {
            *buttons &= !(mask_bit as u16);
        }
    }
}

/// Multi-bank variant (Genesis 3/6-button cycling, PCE six-button): applies the turbo mask to
/// `bank_cnt` parallel output words at once, OR-combine semantics.
pub fn gen_turbo_mask_btns32(wired: &WiredData, buttons: &mut [u32], btns_mask: &[[u32; 32]]) {
    for i in 0..32 {
        if !turbo_active(wired.cnt_mask[i], wired.frame_cnt) {
            continue;
        }
        for (bank, out) in btns_mask.iter().zip(buttons.iter_mut()) {
            *out |= bank[i];
        }
    }
}

/// Axes whose direction-bit carries a turbo counter revert to neutral on the on-phase.
pub fn gen_turbo_mask_axes(
    wired: &WiredData,
    axes: &mut [u8],
    axes_idx: &[usize],
    axes_meta: &[CtrlMeta],
) {
    for (i, &idx) in axes_idx.iter().enumerate() {
        let btn_id = 32 + i; // axis turbo descriptors live past the 32 button slots conceptually
        let cnt_mask = wired.cnt_mask[btn_id % 32];
        if turbo_active(cnt_mask, wired.frame_cnt) {
            axes[idx] = axes_meta[i].neutral as u8;
        }
    }
}

/// System-manager command raised when a macro's release-latch fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysMgrCmd {
    SoftReset,
    BtInquiryToggle,
    PowerOff,
    FactoryReset,
    DeepSleep,
    DevModeToggle,
}

/// One combo/macro entry: `combo_mask` names the required bits within `btns[3].value`;
/// `flag_mask` is the per-port latch bit used to detect release-after-match.
pub struct Macro {
    pub combo_mask: u32,
    pub cmd: SysMgrCmd,
    pub flag_mask: u32,
}

/// Three base combo bits (home + select + start) shared by every macro, plus one distinguishing
/// bit per macro — mirrors `MACRO_BASE`/per-macro additional bit in the reference firmware.
const MACRO_BASE: u32 = buttons::bit(buttons::HM) | buttons::bit(buttons::SL) | buttons::bit(buttons::ST);

pub static MACROS: [Macro; 6] = [
    Macro {
        combo_mask: MACRO_BASE | buttons::bit(buttons::LD_UP),
        cmd: SysMgrCmd::SoftReset,
        flag_mask: 1 << 4,
    },
    Macro {
        combo_mask: MACRO_BASE | buttons::bit(buttons::LD_DOWN),
        cmd: SysMgrCmd::BtInquiryToggle,
        flag_mask: 1 << 5,
    },
    Macro {
        combo_mask: MACRO_BASE | buttons::bit(buttons::LD_LEFT),
        cmd: SysMgrCmd::PowerOff,
        flag_mask: 1 << 6,
    },
    Macro {
        combo_mask: MACRO_BASE | buttons::bit(buttons::LD_RIGHT),
        cmd: SysMgrCmd::FactoryReset,
        flag_mask: 1 << 7,
    },
    Macro {
        combo_mask: MACRO_BASE | buttons::bit(buttons::CPT),
        cmd: SysMgrCmd::DeepSleep,
        flag_mask: 1 << 8,
    },
    Macro {
        combo_mask: MACRO_BASE | buttons::bit(buttons::MT),
        cmd: SysMgrCmd::DevModeToggle,
        flag_mask: 1 << 9,
    },
];

/// Evaluate every macro against `ctrl.btns[3].value`, firing on release-after-match.
///
/// Must be called on every remap pass, before translator dispatch, so a macro never reaches a
/// translator as ordinary input.
pub fn check_macros(ctrl: &WiredCtrl, wired: &WiredData) -> heapless::Vec<SysMgrCmd, 6> {
    let mut fired = heapless::Vec::new();
    let word = ctrl.btns[3].value;
    for m in MACROS.iter() {
        let matched = word & m.combo_mask == m.combo_mask;
        let latched = wired.flag_test(m.flag_mask);
        if matched && !latched {
            wired.flag_set(m.flag_mask);
        } else if !matched && latched {
            wired.flag_clear(m.flag_mask);
            let _ = fired.push(m.cmd);
        }
    }
    fired
}

/// Device-mode toggle special input (`PAD_MT`): press-and-release XORs bit 0 of `dev_mode`,
/// latched so holding the button does not re-trigger. Several translators (DC, Genesis, Saturn,
/// PCE, 3DO) call this inline rather than relying solely on the macro table.
pub fn check_dev_mode_toggle(ctrl: &WiredCtrl, wired: &mut WiredData) -> bool {
    let pressed = ctrl.btns[0].value & buttons::bit(buttons::MT) != 0;
    let latched = wired.flag_test(flags::WAITING_FOR_RELEASE);
    if pressed && !latched {
        wired.flag_set(flags::WAITING_FOR_RELEASE);
        false
    } else if !pressed && latched {
        wired.flag_clear(flags::WAITING_FOR_RELEASE);
        wired.dev_mode ^= 1;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::WiredData;

    #[test]
    fn turbo_identity_when_cnt_mask_zero() {
        for frame in 0..255u8 {
            assert!(!turbo_active(0, frame));
        }
    }

    #[test]
    fn turbo_30hz_duty_cycle_over_128_frames() {
        // cnt_mask = (0b0100000 << 1) | 0 -> m = 0b0100000 = 0x20, polarity = 0 (neg: asserted
        // while NOT all masked bits set).
        let cnt_mask = (0b0100000u8 << 1) | 0;
        let mut asserted = 0;
        for frame in 0..=127u8 {
            if turbo_active(cnt_mask, frame) {
                asserted += 1;
            }
        }
        assert_eq!(asserted, 64);
    }

    #[test]
    fn macro_fires_on_release_not_on_hold() {
        let wired = WiredData::new();
        let mut ctrl = WiredCtrl::idle(0);
        let combo = MACROS[0].combo_mask;

        ctrl.btns[3].value = combo;
        let fired = check_macros(&ctrl, &wired);
        assert!(fired.is_empty(), "must not fire while held");

        ctrl.btns[3].value = combo; // still held, second poll
        let fired = check_macros(&ctrl, &wired);
        assert!(fired.is_empty(), "must not repeat while held");

        ctrl.btns[3].value = 0; // released
        let fired = check_macros(&ctrl, &wired);
        assert_eq!(fired.as_slice(), &[SysMgrCmd::SoftReset]);
    }

    #[test]
    fn dev_mode_toggle_latches_until_release() {
        let mut wired = WiredData::new();
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.btns[0].value = buttons::bit(buttons::MT);

        assert!(!check_dev_mode_toggle(&ctrl, &mut wired));
        assert!(!check_dev_mode_toggle(&ctrl, &mut wired), "no re-trigger while held");

        ctrl.btns[0].value = 0;
        assert!(check_dev_mode_toggle(&ctrl, &mut wired));
        assert_eq!(wired.dev_mode & 1, 1);
    }
}
