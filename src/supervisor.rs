//! Adapter supervisor (C8): the single owner of the per-port slot table, system selection, and
//! the lifecycle actions (`reset`, `port_cfg` re-application) that only make sense with a view
//! across every port at once.
//!
//! Grounded on the reference firmware's `wired.c`, whose `from_generic_func`/`fb_to_generic_func`/
//! `meta_init_func`/`buffer_init_func` arrays of function pointers, indexed by `system_id`, are
//! expressed here as ordinary `match` arms per Design Notes §9's explicit instruction ("per-target
//! dispatch tables of function pointers should become enum-keyed match arms").

use heapless::Vec;

use crate::control::{SystemId, WiredCtrl, WiredData, MAX_PORTS};
use crate::feedback::{FeedbackQueue, GenericFeedback, RawFeedback};
use crate::kbmon::KbMonitor;
use crate::memory_card::MemoryCard;
use crate::remap::{self, SysMgrCmd};
use crate::translators;

#[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
use crate::translators::psx::PsxPort;

#[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
use crate::engines::n64::N64Port;

/// Multitap/aggregation layout in effect for the selected system. Determines which logical port
/// indices are allocated ("live") beyond port 0, per §4.8's fixed per-system slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultitapMode {
    None,
    PsxSlot1,
    PsxSlot2,
    PsxDual,
    GenesisTeamPlayer,
    SaturnSlot1Tap,
    SaturnSlot2Tap,
    SaturnDualTap,
    SnesSlot2Tap,
}

/// The fixed sub-slot range a [`MultitapMode`] allocates, per §4.8's literal table.
pub fn allocated_slots(mode: MultitapMode) -> &'static [usize] {
    match mode {
        MultitapMode::None => &[0],
        MultitapMode::PsxSlot1 => &[0, 1, 2, 3],
        MultitapMode::PsxSlot2 => &[4, 5, 6, 7],
        MultitapMode::PsxDual => &[0, 1, 2, 3, 4, 5, 6, 7],
        MultitapMode::GenesisTeamPlayer => &[0, 1, 2, 3],
        MultitapMode::SaturnSlot1Tap => &[0, 1, 2, 3, 4, 5],
        MultitapMode::SaturnSlot2Tap => &[1, 2, 3, 4, 5, 6],
        MultitapMode::SaturnDualTap => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        MultitapMode::SnesSlot2Tap => &[1, 2, 3, 4],
    }
}

/// Top-level adapter object: one per device. Replaces the reference firmware's single global
/// `wired_adapter` with an owned struct that handlers take by reference, per Design Notes §9
/// ("pass references into handlers rather than letting handlers reach for globals").
pub struct Supervisor {
    pub system_id: SystemId,
    pub multitap: MultitapMode,
    pub data: [WiredData; MAX_PORTS],
    pub card: MemoryCard,
    pub kbmon: [KbMonitor; MAX_PORTS],
    pub fb_queue: FeedbackQueue,
    #[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
    pub psx_ports: [PsxPort; MAX_PORTS],
    #[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
    pub n64_ports: [N64Port; MAX_PORTS],
}

impl Supervisor {
    pub fn new(system_id: SystemId) -> Self {
        let mut s = Self {
            system_id,
            multitap: MultitapMode::None,
            data: core::array::from_fn(|_| WiredData::new()),
            card: MemoryCard::new(),
            kbmon: core::array::from_fn(|_| KbMonitor::new()),
            fb_queue: FeedbackQueue::new(),
            #[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
            psx_ports: [PsxPort::new(); MAX_PORTS],
            #[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
            n64_ports: core::array::from_fn(|_| N64Port::new()),
        };
        s.reset();
        s
    }

    /// `meta_init` (C1): reset per-port capability metadata for the currently selected system.
    /// The per-target `mask`/`desc`/axis-meta tables themselves are compiled-in constants owned
    /// by each translator module; this call's only runtime effect is clearing any stale port
    /// state left over from a previous system selection, since swapping `system_id` always
    /// precedes a full [`Supervisor::reset`].
    pub fn meta_init(&mut self) {
        for port in self.data.iter_mut() {
            port.flags.store(0, core::sync::atomic::Ordering::Relaxed);
        }
    }

    /// `init_buffer` (C1): write the idle frame for every currently allocated slot, dispatched
    /// by `system_id`. Absent dispatch entries (a system with no translator in this build) are a
    /// deliberate no-op per the C1 contract.
    pub fn init_buffer(&mut self, index: usize) {
        let Some(port) = self.data.get_mut(index) else { return };
        match self.system_id {
            #[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
            SystemId::N64 | SystemId::Gc => translators::n64::init_buffer(port),
            #[cfg(feature = "sys-genesis")]
            SystemId::Genesis => translators::genesis::init_buffer(port),
            #[cfg(feature = "sys-saturn")]
            SystemId::Saturn => translators::saturn::init_buffer(port),
            #[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
            SystemId::Psx | SystemId::Ps2 => translators::psx::init_buffer(port),
            #[cfg(feature = "sys-dreamcast")]
            SystemId::Dreamcast => translators::dreamcast::init_buffer(port),
            SystemId::Snes => translators::generic::init_buffer(&translators::generic::snes_descriptor(), port),
            SystemId::Nes => translators::generic::init_buffer(&translators::generic::nes_descriptor(), port),
            _ => {}
        }
    }

    /// `from_generic` (C1 → C2 → C3): evaluate macros and the device-mode toggle, then dispatch
    /// to the active system's translator. Macros are evaluated unconditionally, before translator
    /// dispatch, per §4.2 ("Macros are evaluated on every remap call, before translator
    /// dispatch").
    pub fn from_generic(&mut self, ctrl: &WiredCtrl) -> Vec<SysMgrCmd, 6> {
        let index = ctrl.index;
        let Some(port) = self.data.get_mut(index) else { return Vec::new() };
        let fired = remap::check_macros(ctrl, port);
        let dev_mode_changed = fired.iter().any(|c| *c == SysMgrCmd::DevModeToggle);

        match self.system_id {
            #[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
            SystemId::N64 | SystemId::Gc => translators::n64::from_generic(ctrl, port),
            #[cfg(feature = "sys-genesis")]
            SystemId::Genesis => {
                translators::genesis::from_generic(0, ctrl, port);
                translators::genesis::from_generic(1, ctrl, port);
            }
            #[cfg(feature = "sys-saturn")]
            SystemId::Saturn => {
                if port.dev_mode & 0b10 != 0 {
                    let kbmon = &mut self.kbmon[index];
                    translators::saturn::kb_from_generic(ctrl, port, kbmon, |_word, bit| bit as u8);
                } else {
                    translators::saturn::from_generic(ctrl, port);
                }
            }
            #[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
            SystemId::Psx | SystemId::Ps2 => {
                let psx_port = &mut self.psx_ports[index];
                translators::psx::check_analog_toggle(ctrl, port, psx_port);
                translators::psx::from_generic(ctrl, port, psx_port);
            }
            #[cfg(feature = "sys-dreamcast")]
            SystemId::Dreamcast => translators::dreamcast::from_generic(ctrl, port),
            SystemId::Snes => translators::generic::from_generic(&translators::generic::snes_descriptor(), ctrl, port),
            SystemId::Nes => translators::generic::from_generic(&translators::generic::nes_descriptor(), ctrl, port),
            _ => {}
        }

        if dev_mode_changed {
            self.reset_port(index);
        }

        fired
    }

    /// `gen_turbo_mask`, invoked by the wire engine immediately before transmitting a frame.
    pub fn gen_turbo_mask(&mut self, index: usize) {
        let Some(port) = self.data.get_mut(index) else { return };
        match self.system_id {
            #[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
            SystemId::N64 | SystemId::Gc => translators::n64::gen_turbo_mask(port),
            #[cfg(feature = "sys-genesis")]
            SystemId::Genesis => translators::genesis::gen_turbo_mask(port),
            #[cfg(feature = "sys-saturn")]
            SystemId::Saturn => translators::saturn::gen_turbo_mask(port),
            #[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
            SystemId::Psx | SystemId::Ps2 => translators::psx::gen_turbo_mask(port),
            #[cfg(feature = "sys-dreamcast")]
            SystemId::Dreamcast => translators::dreamcast::gen_turbo_mask(port),
            SystemId::Snes => translators::generic::gen_turbo_mask(&translators::generic::snes_descriptor(), port),
            SystemId::Nes => translators::generic::gen_turbo_mask(&translators::generic::nes_descriptor(), port),
            _ => {}
        }
    }

    /// `fb_to_generic`: normalize one captured engine feedback event for the Bluetooth side.
    /// Kind-specific interpretation lives in [`crate::feedback::to_generic`]; nothing here
    /// varies by `system_id` today (every target's rumble/game-id/mem-write shape funnels
    /// through the same normalized fields), so this is a thin pass-through kept as its own
    /// method to match the external dispatch surface named in §4.8/§6.
    pub fn fb_to_generic(&self, raw: &RawFeedback) -> GenericFeedback {
        crate::feedback::to_generic(raw)
    }

    /// `SYS_MGR_CMD_WIRED_RST`: reinitialize every allocated slot's buffer and clear lifecycle
    /// flags. Config changes to a port's `dev_mode` require this because buffer layouts differ
    /// per device mode (§4.8).
    pub fn reset(&mut self) {
        self.meta_init();
        for &slot in allocated_slots(self.multitap) {
            self.init_buffer(slot);
        }
    }

    /// Reinitialize a single port (used after a dev-mode toggle fires mid-session, rather than a
    /// full system reset).
    pub fn reset_port(&mut self, index: usize) {
        if let Some(port) = self.data.get_mut(index) {
            port.flags.store(0, core::sync::atomic::Ordering::Relaxed);
        }
        self.init_buffer(index);
    }

    /// Select a new target system, reinitializing every allocated slot for it.
    pub fn select_system(&mut self, system_id: SystemId, multitap: MultitapMode) {
        self.system_id = system_id;
        self.multitap = multitap;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons;

    #[cfg(feature = "sys-genesis")]
    #[test]
    fn genesis_select_then_reset_yields_idle_frame() {
        let mut sup = Supervisor::new(SystemId::Genesis);
        assert_eq!(
            u32::from_le_bytes([sup.data[0].output[0], sup.data[0].output[1], sup.data[0].output[2], sup.data[0].output[3]]),
            translators::genesis::IDLE_WORD
        );
    }

    #[cfg(feature = "sys-genesis")]
    #[test]
    fn macro_fires_through_supervisor_dispatch() {
        let mut sup = Supervisor::new(SystemId::Genesis);
        let mut ctrl = WiredCtrl::idle(0);
        let combo = remap::MACROS[0].combo_mask;
        ctrl.btns[3].value = combo;
        let fired = sup.from_generic(&ctrl);
        assert!(fired.is_empty());
        ctrl.btns[3].value = 0;
        let fired = sup.from_generic(&ctrl);
        assert_eq!(fired.as_slice(), &[SysMgrCmd::SoftReset]);
    }

    #[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
    #[test]
    fn psx_mt_toggle_through_supervisor_switches_to_analog() {
        let mut sup = Supervisor::new(SystemId::Psx);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.btns[0].value = buttons::bit(buttons::MT);
        sup.from_generic(&ctrl);
        ctrl.btns[0].value = 0;
        sup.from_generic(&ctrl);
        assert_eq!(sup.psx_ports[0].dev_id, translators::psx::DEV_ID_ANALOG);
    }

    #[test]
    fn allocated_slots_match_spec_table() {
        assert_eq!(allocated_slots(MultitapMode::PsxSlot1), &[0, 1, 2, 3]);
        assert_eq!(allocated_slots(MultitapMode::PsxSlot2), &[4, 5, 6, 7]);
        assert_eq!(allocated_slots(MultitapMode::SaturnSlot2Tap), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(allocated_slots(MultitapMode::SnesSlot2Tap), &[1, 2, 3, 4]);
    }
}
