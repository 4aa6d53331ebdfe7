//! PlayStation/PS2 SPI wire protocol engine: poll and configuration-mode command dispatch.
//!
//! Grounded on `ps_spi.c`'s `ps_cmd_rsp_hdlr`/`ps_cmd_const_rsp_hdlr` switch (`0x42` poll,
//! `0x43` config-mode enter/exit, `0x44` analog/digital select, `0x4F` motor config) and the
//! `0x5A` status byte every non-digital reply header carries.

use heapless::Vec;

use crate::control::WiredData;
use crate::translators::psx::{PsxPort, DEV_ID_ANALOG, DEV_ID_ANALOG_PRESSURE, DEV_ID_DIGITAL};

const STATUS: u8 = 0x5A;

/// Build the poll (`0x42`) reply: `[dev_id, 0x5A, <data>]` where `<data>` is the button word plus
/// (for analog variants) stick and, for analog-with-pressure, per-button pressure bytes. Length
/// follows the real protocol's `(dev_id & 0xF) * 2` convention.
///
/// The button bytes are OR'd with their turbo overlay: active-low bus, so an asserted mask bit
/// pulses the pin released for that frame.
fn poll_reply(wired: &WiredData, port: &PsxPort) -> Vec<u8, 24> {
    let mut v: Vec<u8, 24> = Vec::new();
    let _ = v.push(port.dev_id);
    let _ = v.push(STATUS);
    let _ = v.push(wired.output[0] | wired.output_mask[0]);
    let _ = v.push(wired.output[1] | wired.output_mask[1]);
    if port.dev_id == DEV_ID_ANALOG || port.dev_id == DEV_ID_ANALOG_PRESSURE {
        let _ = v.extend_from_slice(&wired.output[2..6]);
    }
    if port.dev_id == DEV_ID_ANALOG_PRESSURE {
        let _ = v.extend_from_slice(&wired.output[6..18]);
    }
    v
}

/// Dispatch one host command frame (`cmd[0] == 0x01`, `cmd[1]` the sub-command) to the port's
/// dev-id state machine, returning the reply bytes.
pub fn handle_command(cmd: &[u8], wired: &mut WiredData, port: &mut PsxPort) -> Vec<u8, 24> {
    match cmd.get(1).copied() {
        Some(0x42) => poll_reply(wired, port),
        Some(0x43) => {
            let enter = cmd.get(3).copied().unwrap_or(0) != 0;
            port.cmd_config_mode(enter);
            let mut v = Vec::new();
            let _ = v.push(port.dev_id);
            let _ = v.push(STATUS);
            v
        }
        Some(0x44) => {
            let analog = cmd.get(3).copied().unwrap_or(0) != 0;
            let with_pressure = cmd.get(4).copied().unwrap_or(0) == 0x03;
            port.cmd_analog_select(analog, with_pressure);
            let mut v = Vec::new();
            let _ = v.push(DEV_ID_DIGITAL);
            let _ = v.push(STATUS);
            v
        }
        Some(0x4F) => {
            let with_pressure = cmd.get(5).copied().unwrap_or(0) == 0x03;
            port.cmd_motor_config(with_pressure);
            let mut v = Vec::new();
            let _ = v.push(DEV_ID_DIGITAL);
            let _ = v.push(STATUS);
            v
        }
        _ => {
            // unknown/unsupported sub-command: most benign "no data" response (spec §7).
            let mut v = Vec::new();
            let _ = v.push(0xFF);
            v
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons;
    use crate::control::WiredCtrl;
    use crate::translators::psx as tr;

    #[test]
    fn analog_mode_toggle_then_config_sequence_matches_literal_scenario() {
        let mut wired = WiredData::new();
        tr::init_buffer(&mut wired);
        let mut port = PsxPort::new();

        let reply = handle_command(&[0x01, 0x42], &mut wired, &mut port);
        assert_eq!(reply[0], DEV_ID_DIGITAL);
        assert_eq!(reply.len(), 4);

        let mut ctrl = WiredCtrl::idle(0);
        ctrl.btns[0].value = buttons::bit(buttons::MT);
        tr::check_analog_toggle(&ctrl, &wired, &mut port);
        ctrl.btns[0].value = 0;
        tr::check_analog_toggle(&ctrl, &wired, &mut port);

        let reply = handle_command(&[0x01, 0x42], &mut wired, &mut port);
        assert_eq!(reply[0], DEV_ID_ANALOG);
        assert_eq!(reply.len(), 8);

        handle_command(&[0x01, 0x43, 0x00, 0x01, 0x00], &mut wired, &mut port);
        handle_command(&[0x01, 0x44, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00], &mut wired, &mut port);
        handle_command(&[0x01, 0x43, 0x00, 0x00, 0x00], &mut wired, &mut port);

        let reply = handle_command(&[0x01, 0x42], &mut wired, &mut port);
        assert_eq!(reply[0], DEV_ID_ANALOG_PRESSURE);
        assert_eq!(reply.len(), 20);
    }
}
