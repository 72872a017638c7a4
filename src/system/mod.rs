pub mod collector;
pub mod cpu;
pub mod device;
pub mod gpu;
pub mod history;
pub mod memory;
pub mod parse;
pub mod snapshot;
pub mod units;
