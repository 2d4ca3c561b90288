//! UM32 virtual machine library.
//!
//! Provides the interpreter core for the UM32 register machine together with
//! an assembler and disassembler for its program images.

pub mod machine;
pub mod utils;
