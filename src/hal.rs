//! Hardware abstraction seam between the wire protocol engines (C7) and concrete MCU
//! peripherals.
//!
//! The rest of the crate — translators, remap/turbo, the supervisor — never names a
//! `teensy4-bsp` or `imxrt-hal` type. Only the firmware binary's top-level `Hal` impl does,
//! which is what keeps the core host-testable under `#[cfg(test)]` with [`MockHal`].

/// Logical pin identity, independent of the underlying GPIO bank/offset numbering.
///
/// A concrete `Hal` implementation maps these onto real port/pin pairs; which physical pin
/// backs `PinId::P1Th` for example is a pinout-selection detail, not part of this trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinId {
    P1Th,
    P1Tr,
    P1Tl,
    P1Data0,
    P1Data1,
    P1Data2,
    P1Data3,
    P2Th,
    P2Tr,
    P2Tl,
    P2Data0,
    P2Data1,
    P2Data2,
    P2Data3,
    Custom(u8),
}

/// Edge selection for interrupt-driven GPIO lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

/// One RMT-class pulse-train item: a pair of (level, duration-in-ticks) half-periods, matching
/// the N64/GC bit encoding (`BIT_ZERO`/`BIT_ONE`/stop-bit constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RmtItem {
    pub low_ticks: u16,
    pub high_ticks: u16,
}

impl RmtItem {
    pub const fn new(low_ticks: u16, high_ticks: u16) -> Self {
        Self { low_ticks, high_ticks }
    }
}

/// The external contract every wire protocol engine is written against.
///
/// Implementations live in the firmware binary target; translators and engines in this crate
/// are generic over `H: Hal` and never depend on a concrete board support package.
pub trait Hal {
    /// Busy-wait for approximately `n` microseconds. Used for bit-banged engines where no
    /// peripheral timer is available.
    fn delay_us(&mut self, n: u32);

    /// Pause the companion core so a bit-banged protocol frame gets deterministic cycle
    /// counts. Must be paired with [`Hal::core_stall_end`] before the next poll.
    fn core_stall_start(&mut self);
    fn core_stall_end(&mut self);

    fn gpio_set_direction(&mut self, pin: PinId, output: bool);
    fn gpio_set_level(&mut self, pin: PinId, high: bool);
    fn gpio_read(&mut self, pin: PinId) -> bool;
    fn enable_edge_irq(&mut self, pin: PinId, edge: Edge);

    /// Queue an RMT-class pulse train for transmission on `channel`. Used by the N64/GC engine.
    fn rmt_send(&mut self, channel: u8, items: &[RmtItem]);

    /// Load the next response frame into the SPI slave's TX FIFO. Used by PSX/PS2/Dreamcast/
    /// SNES-class engines.
    fn spi_slave_load(&mut self, bytes: &[u8]);

    /// I²C slave register-write notification (Wii Extension Controller engine).
    fn i2c_slave_on_write(&mut self, reg: u8, val: u8);
    /// I²C slave register-read request; returns the byte to present on the bus.
    fn i2c_slave_on_read(&mut self, reg: u8) -> u8;

    /// Pop one received UART byte, if any (CD-i/JVS-class engines).
    fn uart_rx_byte(&mut self) -> Option<u8>;

    /// Free-running microsecond tick counter, used for timeout accounting.
    fn now_ticks(&self) -> u32;
}

/// In-memory `Hal` used by host-side tests. Every peripheral call is recorded or faked so
/// translator/engine logic can be exercised without real silicon.
#[cfg(test)]
pub struct MockHal {
    pub gpio_levels: [bool; 32],
    pub gpio_dirs: [bool; 32],
    pub ticks: u32,
    pub rmt_calls: heapless::Vec<heapless::Vec<RmtItem, 64>, 8>,
    pub spi_loads: heapless::Vec<heapless::Vec<u8, 64>, 8>,
    pub uart_rx: heapless::spsc::Queue<u8, 64>,
}

#[cfg(test)]
impl MockHal {
    pub fn new() -> Self {
        Self {
            gpio_levels: [false; 32],
            gpio_dirs: [false; 32],
            ticks: 0,
            rmt_calls: heapless::Vec::new(),
            spi_loads: heapless::Vec::new(),
            uart_rx: heapless::spsc::Queue::new(),
        }
    }

    fn index(pin: PinId) -> usize {
        match pin {
            PinId::P1Th => 0,
            PinId::P1Tr => 1,
            PinId::P1Tl => 2,
            PinId::P1Data0 => 3,
            PinId::P1Data1 => 4,
            PinId::P1Data2 => 5,
            PinId::P1Data3 => 6,
            PinId::P2Th => 7,
            PinId::P2Tr => 8,
            PinId::P2Tl => 9,
            PinId::P2Data0 => 10,
            PinId::P2Data1 => 11,
            PinId::P2Data2 => 12,
            PinId::P2Data3 => 13,
            PinId::Custom(n) => 16 + (n as usize % 16),
        }
    }
}

#[cfg(test)]
impl Hal for MockHal {
    fn delay_us(&mut self, n: u32) {
        self.ticks = self.ticks.wrapping_add(n);
    }

    fn core_stall_start(&mut self) {}
    fn core_stall_end(&mut self) {}

    fn gpio_set_direction(&mut self, pin: PinId, output: bool) {
        self.gpio_dirs[Self::index(pin)] = output;
    }

    fn gpio_set_level(&mut self, pin: PinId, high: bool) {
        self.gpio_levels[Self::index(pin)] = high;
    }

    fn gpio_read(&mut self, pin: PinId) -> bool {
        self.gpio_levels[Self::index(pin)]
    }

    fn enable_edge_irq(&mut self, _pin: PinId, _edge: Edge) {}

    fn rmt_send(&mut self, _channel: u8, items: &[RmtItem]) {
        let mut v = heapless::Vec::new();
        let _ = v.extend_from_slice(items);
        let _ = self.rmt_calls.push(v);
    }

    fn spi_slave_load(&mut self, bytes: &[u8]) {
        let mut v = heapless::Vec::new();
        let _ = v.extend_from_slice(bytes);
        let _ = self.spi_loads.push(v);
    }

    fn i2c_slave_on_write(&mut self, _reg: u8, _val: u8) {}
    fn i2c_slave_on_read(&mut self, _reg: u8) -> u8 {
        0
    }

    fn uart_rx_byte(&mut self) -> Option<u8> {
        self.uart_rx.dequeue()
    }

    fn now_ticks(&self) -> u32 {
        self.ticks
    }
}
