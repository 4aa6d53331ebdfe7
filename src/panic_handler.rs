//! `#[panic_handler]` for the firmware binary.
//!
//! A panic here has nowhere to unwind to and no host to report to, so the handler's only job is
//! to get a diagnosis onto the one output a field technician has: the onboard LED. It classifies
//! the panic message through `portbridge::panic::infer_error_type` and blinks the matching
//! pattern from `portbridge::panic::led`, and records the last-set code section/error flag into
//! statics a debugger can read over SWD after the fact.

use core::fmt::Write as _;
use core::panic::PanicInfo;

use portbridge::panic::infer_error_type;

pub const SECTION_NONE: u8 = 0;
pub const SECTION_INIT: u8 = 1;
pub const SECTION_PRE_ENGINE: u8 = 2;
pub const SECTION_ENGINE_INIT: u8 = 3;
pub const SECTION_ENGINE_POLL: u8 = 4;
pub const SECTION_TRANSLATE: u8 = 5;
pub const SECTION_SUPERVISOR: u8 = 6;
pub const SECTION_MAIN_LOOP: u8 = 11;

pub const ERR_NONE: u8 = 0;
pub const ERR_ENGINE_INIT: u8 = 2;
pub const ERR_ENGINE_POLL: u8 = 3;
pub const ERR_BAD_FRAME: u8 = 4;
pub const ERR_TRANSLATE: u8 = 5;
pub const ERR_MEMORY: u8 = 6;
pub const ERR_SUPERVISOR: u8 = 9;
pub const ERR_STORAGE: u8 = 10;
pub const ERR_PERIPHERAL: u8 = 11;
pub const ERR_CONFIGURATION: u8 = 12;

// Consumed by a debugger attached over SWD; nothing in this crate reads these back.
#[used]
#[export_name = "_CODE_SECTION"]
static mut CODE_SECTION: u8 = SECTION_NONE;

#[used]
#[export_name = "_ERROR_FLAG"]
static mut ERROR_FLAG: u8 = ERR_NONE;

#[inline]
pub fn set_code_section(section: u8) {
    unsafe { CODE_SECTION = section };
}

#[inline]
pub fn set_error_flag(error: u8) {
    unsafe { ERROR_FLAG = error };
}

const LED_GPIO_BASE: u32 = 0x401B_C000; // GPIO2, the bank teensy4-bsp's `board::Led` drives.
const LED_BIT: u32 = 1 << 3; // Teensy 4 pin 13.
const REG_DR: isize = 0;
const REG_GDIR: isize = 1;

fn led_set(high: bool) {
    unsafe {
        let gdir = (LED_GPIO_BASE as *mut u32).offset(REG_GDIR);
        core::ptr::write_volatile(gdir, core::ptr::read_volatile(gdir) | LED_BIT);
        let dr = (LED_GPIO_BASE as *mut u32).offset(REG_DR);
        let cur = core::ptr::read_volatile(dr);
        core::ptr::write_volatile(dr, if high { cur | LED_BIT } else { cur & !LED_BIT });
    }
}

fn spin_us(us: u32) {
    cortex_m::asm::delay(us.saturating_mul(600)); // close enough for a blink at any core clock.
}

fn blink(on_us: u32, off_us: u32) {
    led_set(true);
    spin_us(on_us);
    led_set(false);
    spin_us(off_us);
}

/// Mirrors `portbridge::panic::led::LedErrorBlinker`'s per-`ErrorType` patterns, reimplemented
/// against raw MMIO since the panic handler can't assume it still owns a `board::Led`.
fn blink_pattern(error_type: portbridge::panic::ErrorType) {
    use portbridge::panic::ErrorType::*;
    match error_type {
        HardFault => blink(200_000, 200_000),
        MemoryError => {
            blink(600_000, 200_000);
            blink(200_000, 200_000);
            blink(200_000, 1_000_000);
        }
        PeripheralError => {
            blink(600_000, 200_000);
            blink(200_000, 200_000);
            blink(600_000, 1_000_000);
        }
        InitError => {
            blink(600_000, 200_000);
            blink(600_000, 200_000);
            blink(600_000, 1_000_000);
        }
        ConfigError => {
            blink(200_000, 200_000);
            blink(600_000, 200_000);
            blink(200_000, 1_000_000);
        }
        Other => {
            for _ in 0..3 {
                blink(200_000, 200_000);
            }
            for _ in 0..3 {
                blink(600_000, 200_000);
            }
            for _ in 0..3 {
                blink(200_000, 200_000);
            }
            spin_us(1_000_000);
        }
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    cortex_m::interrupt::disable();

    let mut msg: heapless::String<96> = heapless::String::new();
    let _ = write!(msg, "{}", info.message());
    let error_type = infer_error_type(&msg);

    loop {
        blink_pattern(error_type);
    }
}
