//! Sega Saturn wire protocol engine: TH-clocked 3-button/6-button frames, plus the three-wire
//! handshake (TWH) variable-length packet used by analog pads, the mission stick and multitap.
//!
//! Grounded on `sega_io.c`'s `ID2_SATURN_PAD`/`ID2_SATURN_MULTITAP` ids and the
//! `P1_SAT_TWH_ID0_LO_HI` framing constants, and the literal end-to-end scenario in the
//! specification this core implements (`ID0_TWH = (ID2_SATURN_PAD << 4) | 2`).

use heapless::Vec;

use crate::control::WiredData;

pub const ID2_SATURN_PAD: u8 = 0x6;
pub const ID2_SATURN_MULTITAP: u8 = 0x4;
/// `(ID2_SATURN_PAD << 4) | nibble_count(2)`: the TWH header byte a single analog/mission pad
/// announces, and the trailer nibble (`ID0_TWH >> 4`) that terminates every TWH packet.
pub const ID0_TWH: u8 = (ID2_SATURN_PAD << 4) | 2;

/// OR a pad's active-low button bytes with its turbo overlay: an asserted mask bit pulses the
/// pin released for that frame regardless of the held state underneath.
fn turbo_bytes(wired: &WiredData) -> (u8, u8) {
    (wired.output[0] | wired.output_mask[0], wired.output[1] | wired.output_mask[1])
}

/// Build the three-wire-handshake packet for a single pad: `[ID0_TWH, b0, b1, ID0_TWH >> 4]`
/// where `b0`/`b1` are the active-low button bytes the translator already packed into
/// `wired.output[0..2]`.
pub fn build_twh_frame(wired: &WiredData) -> Vec<u8, 4> {
    let (b0, b1) = turbo_bytes(wired);
    let mut v = Vec::new();
    let _ = v.push(ID0_TWH);
    let _ = v.push(b0);
    let _ = v.push(b1);
    let _ = v.push(ID0_TWH >> 4);
    v
}

/// Build the multitap TWH stream: `[0x41, 0x60]` header (multitap id + 6-port count nibble),
/// one 3-byte `[0x62, b0, b1]` sub-frame per connected pad, then the shared trailer nibble.
pub fn build_multitap_frame(sub_ports: &[&WiredData]) -> Vec<u8, 24> {
    let mut v: Vec<u8, 24> = Vec::new();
    let _ = v.push((ID2_SATURN_MULTITAP << 4) | 1);
    let _ = v.push(0x60);
    for port in sub_ports.iter() {
        let (b0, b1) = turbo_bytes(port);
        let _ = v.push(ID0_TWH);
        let _ = v.push(b0);
        let _ = v.push(b1);
    }
    let _ = v.push(ID0_TWH >> 4);
    v
}

/// Simple (non-TWH) 3-button digital frame: two TH cycles, ID0 nibble + 4-bit direction matrix
/// on the first, face buttons on the second. Used for the plain digital pad, which never enters
/// the handshake sequence.
pub fn build_digital_frame(wired: &WiredData) -> [u8; 2] {
    let (b0, b1) = turbo_bytes(wired);
    [b0, b1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons;
    use crate::control::WiredCtrl;
    use crate::translators::saturn as tr;

    #[test]
    fn twh_frame_matches_literal_scenario_shape() {
        let mut wired = WiredData::new();
        tr::init_buffer(&mut wired);
        let mut ctrl = WiredCtrl::idle(0);
        ctrl.map_mask[0] = buttons::bit(buttons::LD_UP) | buttons::bit(buttons::RD_RIGHT);
        ctrl.btns[0].value = buttons::bit(buttons::LD_UP) | buttons::bit(buttons::RD_RIGHT);
        tr::from_generic(&ctrl, &mut wired);

        let frame = build_twh_frame(&wired);
        assert_eq!(frame[0], ID0_TWH);
        assert_eq!(frame[3], ID0_TWH >> 4);
        assert_eq!(frame[3], 0x06);
    }

    #[test]
    fn multitap_frame_has_one_subframe_per_port() {
        let mut ports = [WiredData::new(), WiredData::new(), WiredData::new(), WiredData::new(), WiredData::new(), WiredData::new()];
        for p in ports.iter_mut() {
            tr::init_buffer(p);
        }
        let refs: Vec<&WiredData, 24> = ports.iter().collect::<heapless::Vec<_, 24>>();
        let frame = build_multitap_frame(&refs);
        assert_eq!(frame[0], (ID2_SATURN_MULTITAP << 4) | 1);
        assert_eq!(frame[1], 0x60);
        assert_eq!(*frame.last().unwrap(), ID0_TWH >> 4);
        assert_eq!(frame.len(), 2 + 6 * 3 + 1);
    }
}
