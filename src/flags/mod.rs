//! Compiler and linker flag composition.

pub mod assembler;
pub mod flag_set;
pub mod overrides;

pub use assembler::{include_flag, AssembledFlags, FlagAssembler, LinkGroup};
pub use flag_set::FlagSet;
pub use overrides::{FlagOverrides, RawFlagOverrides};
