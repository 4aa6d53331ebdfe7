//! Keyboard monitor (C5): per-port scancode edge detection feeding the console-side keyboard
//! emulation translators (Saturn KB, PSX KB, N64 KB).
//!
//! Grounded on `kb_monitor.c`'s `kbmon_update` (XOR-diff against last state, in-order per-bit
//! MAKE/BREAK dispatch) and `kbmon_set_code`/`kbmon_get_code` (message-granularity ring, logs and
//! drops on overflow rather than blocking).

use heapless::spsc::Queue;

pub const RING_DEPTH: usize = 64;
pub const MAX_CODE_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Make,
    Break,
}

/// One encoded scancode message, queued whole so a multi-byte code is never split across two
/// ring reads.
#[derive(Debug, Clone, Copy)]
pub struct Message {
    pub bytes: [u8; MAX_CODE_LEN],
    pub len: u8,
}

impl Message {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

/// Typematic repeat configuration for one port. Absent upstream; synthesized to match the
/// prose contract (delay once, then steady repeat until break).
#[derive(Debug, Clone, Copy, Default)]
pub struct Typematic {
    pub enabled: bool,
    pub delay_us: u32,
    pub rate_us: u32,
}

/// Per-port keyboard scan state: last-seen key bitmap (up to 128 keys across 4 normalized
/// words), the MAKE/BREAK ring, and typematic bookkeeping.
pub struct KbMonitor {
    keys_state: [u32; 4],
    // heapless SPSC queues hold only `N - 1` elements, so the backing array is sized one past
    // `RING_DEPTH` to give `RING_DEPTH` usable slots.
    ring: Queue<Message, { RING_DEPTH + 1 }>,
    dropped: u32,
    typematic: Typematic,
    /// Last-key-wins typematic timer: `(bit, deadline_ticks)` for the most recently pressed word-0
    /// key, or `None` if no repeat is armed. Matches standard keyboard behavior where only the
    /// newest held key repeats.
    repeat_due: Option<(u32, u32)>,
}

impl KbMonitor {
    pub const fn new() -> Self {
        Self {
            keys_state: [0; 4],
            ring: Queue::new(),
            dropped: 0,
            typematic: Typematic {
                enabled: false,
                delay_us: 0,
                rate_us: 0,
            },
            repeat_due: None,
        }
    }

    pub fn set_typematic(&mut self, enable: bool, delay_us: u32, rate_us: u32) {
        self.typematic = Typematic {
            enabled: enable,
            delay_us,
            rate_us,
        };
        if !enable {
            self.repeat_due = None;
        }
    }

    /// Diff `ctrl_data` against the last-seen state, calling `callback(word, bit, event)` for
    /// every changed bit in ascending order (bit 0 of word 0 first, ..., bit 31 of word 3 last).
    ///
    /// `now_ticks` is the current monotonic microsecond clock, used to arm/disarm the typematic
    /// repeat timer for word 0 (the only word keyboards key their make/break events on here).
    pub fn update(&mut self, ctrl_data: &[u32; 4], now_ticks: u32, mut callback: impl FnMut(usize, u32, KeyEvent)) {
        for word in 0..4 {
            let changed = ctrl_data[word] ^ self.keys_state[word];
            if changed == 0 {
                continue;
            }
            for bit in 0..32u32 {
                let mask = 1u32 << bit;
                if changed & mask == 0 {
                    continue;
                }
                let now_down = ctrl_data[word] & mask != 0;
                let event = if now_down { KeyEvent::Make } else { KeyEvent::Break };
                callback(word, bit, event);
                if word == 0 {
                    if now_down && self.typematic.enabled {
                        self.repeat_due = Some((bit, now_ticks.wrapping_add(self.typematic.delay_us)));
                    } else if !now_down && self.repeat_due.is_some_and(|(b, _)| b == bit) {
                        self.repeat_due = None;
                    }
                }
            }
            self.keys_state[word] = ctrl_data[word];
        }
    }

    /// Fire a typematic repeat if its deadline has passed at `now_ticks`, synthesizing a MAKE
    /// callback and re-arming at `rate_us`. Called every poll regardless of whether `update` ran,
    /// so a held key keeps repeating with no further input changes.
    pub fn poll_typematic(&mut self, now_ticks: u32, mut callback: impl FnMut(usize, u32, KeyEvent)) {
        let Some((bit, deadline)) = self.repeat_due else { return };
        if !self.typematic.enabled {
            self.repeat_due = None;
            return;
        }
        if now_ticks.wrapping_sub(deadline) as i32 >= 0 {
            if self.keys_state[0] & (1 << bit) != 0 {
                callback(0, bit, KeyEvent::Make);
                self.repeat_due = Some((bit, now_ticks.wrapping_add(self.typematic.rate_us)));
            } else {
                self.repeat_due = None;
            }
        }
    }

    pub fn set_code(&mut self, bytes: &[u8]) {
        let mut msg = Message {
            bytes: [0; MAX_CODE_LEN],
            len: bytes.len().min(MAX_CODE_LEN) as u8,
        };
        msg.bytes[..msg.len as usize].copy_from_slice(&bytes[..msg.len as usize]);
        if self.ring.enqueue(msg).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    pub fn get_code(&mut self) -> Option<Message> {
        self.ring.dequeue()
    }

    /// Convenience for the Saturn/PSX/N64 keyboard translators: push a 2-byte
    /// `{prefix, scancode}` message (`0x08`=MAKE, `0x01`=BREAK upstream).
    pub fn set_code_prefixed(&mut self, prefix: u8, scancode: u8) {
        self.set_code(&[prefix, scancode]);
    }

    pub fn dropped_count(&self) -> u32 {
        self.dropped
    }
}

impl Default for KbMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_fires_make_then_break_in_order() {
        let mut kb = KbMonitor::new();
        let mut events: heapless::Vec<(usize, u32, KeyEvent), 8> = heapless::Vec::new();

        kb.update(&[0b101, 0, 0, 0], 0, |w, b, e| {
            let _ = events.push((w, b, e));
        });
        assert_eq!(events.as_slice(), &[(0, 0, KeyEvent::Make), (0, 2, KeyEvent::Make)]);

        events.clear();
        kb.update(&[0b001, 0, 0, 0], 1000, |w, b, e| {
            let _ = events.push((w, b, e));
        });
        assert_eq!(events.as_slice(), &[(0, 2, KeyEvent::Break)]);
    }

    #[test]
    fn no_spurious_events_on_unchanged_state() {
        let mut kb = KbMonitor::new();
        let mut count = 0;
        kb.update(&[0xFF, 0, 0, 0], 0, |_, _, _| count += 1);
        let fired_first = count;
        kb.update(&[0xFF, 0, 0, 0], 1000, |_, _, _| count += 1);
        assert_eq!(count, fired_first);
    }

    #[test]
    fn typematic_repeats_after_delay_then_at_rate_until_break() {
        let mut kb = KbMonitor::new();
        kb.set_typematic(true, 500, 100);

        kb.update(&[1, 0, 0, 0], 0, |_, _, _| {});

        let mut makes = 0;
        kb.poll_typematic(499, |_, _, _| makes += 1);
        assert_eq!(makes, 0, "not due yet");

        kb.poll_typematic(500, |_, b, e| {
            assert_eq!(b, 0);
            assert_eq!(e, KeyEvent::Make);
            makes += 1;
        });
        assert_eq!(makes, 1);

        kb.poll_typematic(599, |_, _, _| makes += 1);
        assert_eq!(makes, 1, "next repeat not due until rate_us later");

        kb.poll_typematic(600, |_, _, _| makes += 1);
        assert_eq!(makes, 2);

        kb.update(&[0, 0, 0, 0], 600, |_, _, _| {});
        kb.poll_typematic(700, |_, _, _| makes += 1);
        assert_eq!(makes, 2, "break cancels the repeat");
    }

    #[test]
    fn set_code_round_trips_through_ring() {
        let mut kb = KbMonitor::new();
        kb.set_code(&[0x08, 0x1C]);
        let msg = kb.get_code().unwrap();
        assert_eq!(msg.as_slice(), &[0x08, 0x1C]);
        assert!(kb.get_code().is_none());
    }

    #[test]
    fn ring_overflow_drops_and_counts() {
        let mut kb = KbMonitor::new();
        for i in 0..(RING_DEPTH as u8 + 5) {
            kb.set_code(&[i]);
        }
        assert_eq!(kb.dropped_count(), 5);
    }
}
