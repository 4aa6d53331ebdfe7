//! Feedback router (C4): console → controller events (rumble, LEDs, memory-pak writes, game-ID
//! sniffing) normalized and queued for the Bluetooth side.

use heapless::Vec;

pub const MAX_RAW_LEN: usize = 36;
pub const FEEDBACK_QUEUE_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Rumble,
    GameId,
    MemWrite,
    Led,
}

/// What a protocol engine actually observed on the wire, before normalization.
#[derive(Debug, Clone)]
pub struct RawFeedback {
    pub wired_id: u8,
    pub kind: FeedbackKind,
    pub data: Vec<u8, MAX_RAW_LEN>,
}

/// Normalized event forwarded to the Bluetooth side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericFeedback {
    pub wired_id: u8,
    pub kind: FeedbackKind,
    /// 1 = start/refresh the stop-timer, 0 = cancel it (rumble); otherwise kind-specific.
    pub state: u8,
    pub cycles: u8,
    pub start: u32,
}

/// Rumble duration formula (spec §4.4): `byte4 * max(mag0, mag1) / freq` microseconds when the
/// high bits of byte6 are set or byte7's LSB is clear; otherwise a flat `1_000_000 / freq`.
pub fn rumble_duration_us(byte4: u8, mag0: u8, mag1: u8, freq: u8, byte6: u8, byte7: u8) -> u32 {
    let freq = freq.max(1) as u32;
    if byte6 & 0x88 != 0 || byte7 & 1 == 0 {
        1_000_000u32
            .saturating_mul(byte4 as u32)
            .saturating_mul(mag0.max(mag1) as u32)
            / freq
    } else {
        1_000_000u32 / freq
    }
}

/// Bounded SPSC feedback queue: engine pushes, router pops. The newest item is dropped on
/// overflow (acceptable per the ordering guarantees — a stale rumble/LED event is superseded by
/// the next poll anyway).
pub struct FeedbackQueue {
    // heapless SPSC queues hold only `N - 1` elements, so the backing array is sized one past
    // the documented depth to give `FEEDBACK_QUEUE_DEPTH` usable slots.
    queue: heapless::spsc::Queue<RawFeedback, { FEEDBACK_QUEUE_DEPTH + 1 }>,
    dropped: u32,
}

impl FeedbackQueue {
    pub const fn new() -> Self {
        Self {
            queue: heapless::spsc::Queue::new(),
            dropped: 0,
        }
    }

    pub fn push(&mut self, item: RawFeedback) {
        if self.queue.enqueue(item).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    pub fn pop(&mut self) -> Option<RawFeedback> {
        self.queue.dequeue()
    }

    pub fn dropped_count(&self) -> u32 {
        self.dropped
    }
}

impl Default for FeedbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert one raw feedback event into its normalized form. Unknown/unsupported raw kinds pass
/// their bytes through untouched in `state`/`cycles`/`start` so the router can still forward a
/// best-effort event rather than silently dropping it.
pub fn to_generic(raw: &RawFeedback) -> GenericFeedback {
    match raw.kind {
        FeedbackKind::Rumble => {
            let b = |i: usize| raw.data.get(i).copied().unwrap_or(0);
            let state = if b(0) != 0 { 1 } else { 0 };
            let dur = rumble_duration_us(b(1), b(2), b(3), b(4), b(5), b(6));
            GenericFeedback {
                wired_id: raw.wired_id,
                kind: FeedbackKind::Rumble,
                state,
                cycles: 0,
                start: dur,
            }
        }
        FeedbackKind::GameId | FeedbackKind::MemWrite | FeedbackKind::Led => GenericFeedback {
            wired_id: raw.wired_id,
            kind: raw.kind,
            state: raw.data.first().copied().unwrap_or(0),
            cycles: raw.data.len() as u8,
            start: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rumble_duration_uses_flat_formula_when_flagged() {
        assert_eq!(rumble_duration_us(10, 5, 8, 100, 0, 0), 1_000_000 / 100);
    }

    #[test]
    fn rumble_duration_uses_scaled_formula() {
        let got = rumble_duration_us(2, 5, 8, 10, 0x80, 1);
        assert_eq!(got, 1_000_000u32 * 2 * 8 / 10);
    }

    #[test]
    fn queue_drops_newest_on_overflow() {
        let mut q = FeedbackQueue::new();
        for i in 0..(FEEDBACK_QUEUE_DEPTH as u8 + 2) {
            q.push(RawFeedback {
                wired_id: i,
                kind: FeedbackKind::Rumble,
                data: Vec::new(),
            });
        }
        assert_eq!(q.dropped_count(), 2);
    }
}
