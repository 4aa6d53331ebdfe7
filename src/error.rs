//! Error kinds for the wired adapter core.
//!
//! Mirrors the recovery classes the core actually implements: everything here is either
//! recovered locally by the caller (the common case) or surfaced once to the supervisor /
//! Bluetooth side. Nothing in this crate unwinds across a task boundary.

use core::fmt;

/// Failure kinds produced by the wired-core boundary operations.
///
/// Per-frame hot-path operations (translation, turbo mask generation, engine polling) do not
/// return this type — they recover locally and log, since by the time a frame-level error would
/// propagate the next poll has already superseded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    /// Wire CRC mismatch, bit count not a multiple of 8, or a short packet.
    BadFrame,
    /// An expected edge or ring item did not arrive within the poll timeout.
    Timeout,
    /// A bounded ring (keyboard scancodes, feedback) was full; newest item dropped.
    Overflow,
    /// Command byte not recognized for the current device mode.
    UnknownCommand,
    /// Requested device mode is not implementable on this system/port.
    ConfigMismatch,
    /// Peripheral allocation failed at boot; bring-up cannot continue.
    Fatal,
}

impl AdapterError {
    /// Short machine name, stable across releases, suitable for log correlation.
    pub const fn name(self) -> &'static str {
        match self {
            AdapterError::BadFrame => "bad_frame",
            AdapterError::Timeout => "timeout",
            AdapterError::Overflow => "overflow",
            AdapterError::UnknownCommand => "unknown_command",
            AdapterError::ConfigMismatch => "config_mismatch",
            AdapterError::Fatal => "fatal",
        }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::BadFrame => write!(f, "bad frame: CRC mismatch or short packet"),
            AdapterError::Timeout => write!(f, "timed out waiting for an edge or ring item"),
            AdapterError::Overflow => write!(f, "ring buffer full, dropped newest item"),
            AdapterError::UnknownCommand => write!(f, "unrecognized command for this device mode"),
            AdapterError::ConfigMismatch => write!(f, "requested device mode unsupported on this port"),
            AdapterError::Fatal => write!(f, "unrecoverable peripheral failure"),
        }
    }
}

pub type Result<T> = core::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct() {
        let all = [
            AdapterError::BadFrame,
            AdapterError::Timeout,
            AdapterError::Overflow,
            AdapterError::UnknownCommand,
            AdapterError::ConfigMismatch,
            AdapterError::Fatal,
        ];
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert_ne!(a.name(), b.name());
                }
            }
        }
    }
}
