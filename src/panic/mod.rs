//! Panic handler with LED-based error reporting
//!
//! This module provides visual feedback via the onboard LED when errors occur,
//! with different blink patterns for different error types.

mod led;

pub use led::*;

// Error types for the panic handler. `AdapterError::Fatal` sources (RMT channel exhaustion, SPI
// slave DMA setup failure, and the like) are classified as `PeripheralError` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    HardFault,
    MemoryError,
    PeripheralError,
    InitError,
    ConfigError,
    Other,
}

// Get a string representation of the error type
pub fn error_type_name(error_type: ErrorType) -> &'static str {
    match error_type {
        ErrorType::HardFault => "Hard Fault",
        ErrorType::MemoryError => "Memory Error",
        ErrorType::PeripheralError => "Peripheral Error",
        ErrorType::InitError => "Init Error",
        ErrorType::ConfigError => "Config Error",
        ErrorType::Other => "Other Error",
    }
}

// Try to infer error type from panic message
pub fn infer_error_type(message: &str) -> ErrorType {
    if message.contains("memory") || message.contains("allocation") || message.contains("mempak") {
        ErrorType::MemoryError
    } else if message.contains("rmt") || message.contains("spi") || message.contains("i2c") || message.contains("uart") {
        ErrorType::PeripheralError
    } else if message.contains("init") || message.contains("initialization") {
        ErrorType::InitError
    } else if message.contains("config") || message.contains("configuration") {
        ErrorType::ConfigError
    } else if message.contains("fault") || message.contains("Fault") {
        ErrorType::HardFault
    } else {
        ErrorType::Other
    }
}