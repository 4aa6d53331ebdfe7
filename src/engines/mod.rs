//! Wire protocol engines (C7): the per-console Mealy machines that turn a byte/edge-level host
//! transaction into a reply, consulting the translator-filled [`crate::control::WiredData`]
//! buffer and the [`crate::memory_card::MemoryCard`] for read/write commands.
//!
//! Every engine here is a pure function of `(command bytes, port state, buffers) -> reply
//! bytes`; the [`crate::hal::Hal`] peripheral calls (RMT pulse trains, SPI slave loads, edge
//! waits) are the firmware binary's job, driven from these replies, so the engines stay
//! host-testable.

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
