pub mod memory;
pub mod ports;
