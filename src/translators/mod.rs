//! Per-system translators (C3): normalized state → wire-format buffer + turbo mask buffer.
//!
//! Every translator implements the same four free functions (`init_buffer`, `meta_init`,
//! `from_generic`, `gen_turbo_mask`) rather than a `dyn Trait` — the system set is closed and
//! known at compile time, and [`crate::supervisor`] dispatches on [`crate::control::SystemId`]
//! with an ordinary `match`, which is also what lets per-system Cargo features drop unused
//! translators from the link.

use crate::control::CtrlMeta;

#[cfg(any(feature = "sys-n64", feature = "sys-gc"))]
pub mod n64;
#[cfg(feature = "sys-genesis")]
pub mod genesis;
#[cfg(feature = "sys-saturn")]
pub mod saturn;
#[cfg(any(feature = "sys-psx", feature = "sys-ps2"))]
pub mod psx;
#[cfg(feature = "sys-dreamcast")]
pub mod dreamcast;
pub mod generic;

/// A parameterized descriptor for the handful of targets that only need the shared 32-bit-word
/// mapping algorithm (SNES, NES, PCE, Jaguar, 3DO, Wii, PCFX, JVS, CD-i, Parallel), consolidating
/// the copy-pasted per-port tables the reference firmware carries for each into one struct per
/// target (Design Notes: "Consolidate into a single parameterized descriptor per target").
pub struct Descriptor {
    pub mask: [u32; 4],
    pub desc: [u32; 4],
    pub btns_mask: [u32; 32],
    pub axes_idx: &'static [usize],
    pub axes_meta: &'static [CtrlMeta],
    /// True when asserting a target bit means driving the wire low (active-low buses like
    /// Genesis/SNES/NES controller ports); false for active-high buses.
    pub active_low: bool,
}

/// Apply the generic 32-bit-or-less wire-word mapping algorithm (spec step list in §4.3) to a
/// single output word.
///
/// `ctrl_value` is the live normalized button word; `map_mask` restricts which normalized bits
/// are honored. Releasing a source bit only de-asserts the target bit if no other live, mapped
/// source bit aliases the same target bit (the "collision mask" rule) — this is recomputed from
/// the live word each call rather than carried as separate state, since the full set of
/// currently-held bits is always available to the translator.
pub fn map_bits_32(ctrl_value: u32, map_mask: u32, btns_mask: &[u32; 32], active_low: bool, output: &mut u32) {
    let mut temp = *output;
    for i in 0..32usize {
        let bit = 1u32 << i;
        if map_mask & bit == 0 {
            continue;
        }
        let target = btns_mask[i];
        if target == 0 {
            continue;
        }
        let held = ctrl_value & bit != 0;
        if held {
            if active_low {
                temp &= !target;
            } else {
                temp |= target;
            }
            continue;
        }
        let aliased_held = (0..32usize).any(|j| {
            j != i
                && map_mask & (1u32 << j) != 0
                && btns_mask[j] == target
                && ctrl_value & (1u32 << j) != 0
        });
        if !aliased_held {
            if active_low {
                temp |= target;
            } else {
                temp &= !target;
            }
        }
    }
    *output = temp;
}

/// Clamp + bias an axis value per its [`CtrlMeta`] and truncate into an 8-bit wire field, the
/// common case for the targets implemented here (N64/GC/Genesis/Saturn/PSX digital sticks all use
/// byte-wide axes; wider/narrower packing is handled inline by the translator that needs it).
pub fn pack_axis_u8(meta: &CtrlMeta, value: i32) -> u8 {
    meta.apply(value) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> [u32; 32] {
        let mut t = [0u32; 32];
        t[0] = 0x01;
        t[1] = 0x02;
        t[2] = 0x02; // aliases bit 1's target, simulating two sources tied to one pin
        t
    }

    #[test]
    fn map_bits_sets_and_clears_active_low() {
        let mask = table();
        let mut out = 0xFFu32;
        map_bits_32(1 << 0, 0xFFFF_FFFF, &mask, true, &mut out);
        assert_eq!(out & 0x01, 0);
        map_bits_32(0, 0xFFFF_FFFF, &mask, true, &mut out);
        assert_eq!(out & 0x01, 0x01);
    }

    #[test]
    fn map_bits_respects_collisions() {
        let mask = table();
        let mut out = 0xFFu32;
        // both bit 1 and bit 2 alias target 0x02; hold both, release one, target must stay held.
        map_bits_32((1 << 1) | (1 << 2), 0xFFFF_FFFF, &mask, true, &mut out);
        assert_eq!(out & 0x02, 0);
        map_bits_32(1 << 2, 0xFFFF_FFFF, &mask, true, &mut out);
        assert_eq!(out & 0x02, 0, "other aliasing source still held");
        map_bits_32(0, 0xFFFF_FFFF, &mask, true, &mut out);
        assert_eq!(out & 0x02, 0x02);
    }

    #[test]
    fn map_bits_ignores_unmapped_bits() {
        let mask = table();
        let mut out = 0xFFu32;
        map_bits_32(1 << 5, 0x01, &mask, true, &mut out);
        assert_eq!(out, 0xFF, "bit 5 is outside map_mask and has no table entry honored");
    }
}
