//! Wired-side adapter core: translation layer (C1-C6) plus the per-console protocol engines
//! (C7) and the supervisor that owns them (C8), generic over the [`hal::Hal`] hardware seam
//! (C9) so this crate builds and tests entirely off target, under `std`.
//!
//! The firmware binary (`src/main.rs`) is `no_std`/`no_main` and depends on this crate only for
//! its concrete `teensy4-bsp` board bring-up and the RTIC task wiring; everything that is a
//! *rule* rather than a *peripheral detail* lives here.
#![cfg_attr(not(test), no_std)]

pub mod buttons;
pub mod config;
pub mod control;
pub mod engines;
pub mod error;
pub mod feedback;
pub mod hal;
pub mod kbmon;
pub mod memory_card;
pub mod panic;
pub mod remap;
pub mod supervisor;
pub mod translators;
