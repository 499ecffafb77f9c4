//! Micro16 CPU emulation module
//!
//! Implements the Micro16 processor core: fetch/decode/execute loop,
//! a shared decode step, a flat 256-entry opcode dispatch table, and the
//! register/flag state that ties them together.

pub mod decode;
pub mod dispatch;
pub mod execute;
pub mod harness;
pub mod state;
pub mod timing;

pub use harness::CpuHarness;
pub use state::{Address, Cpu};
