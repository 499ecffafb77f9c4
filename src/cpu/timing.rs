//! Per-family cycle costs.
//!
//! Bit-exact timing against real hardware is an explicit non-goal (see the
//! crate-level specification); cycle counts exist only so callers have a
//! monotonic, observable progress counter. Costs below are a flat
//! per-family estimate roughly proportional to how much work each family
//! does (a register move is cheap, a memory-indexed access or a far call
//! is not), not a cycle-accurate hardware table.

use crate::isa::Family;

pub fn base_cycles(family: Family) -> u64 {
    match family {
        Family::Invalid => 1,
        Family::Implicit => 1,
        Family::RegOnly => 2,
        Family::RegReg => 2,
        Family::SegRegMove => 2,
        Family::SegPushPop => 3,
        Family::RegImm16 => 2,
        Family::LoadStoreDirect => 5,
        Family::LoadStoreIndexed => 6,
        Family::IndexedSp => 6,
        Family::Interrupt => 8,
        Family::RelBranch8 => 3,
        Family::AbsBranch16 => 3,
        Family::RetImm16 => 5,
        Family::ShiftRotate => 2,
        Family::IoPort => 4,
        Family::Enter => 6,
        Family::RepPrefix => 1,
        Family::FarBranch => 6,
    }
}
