//! Code generation for the TM machine
//!
//! - [`constants`]: register assignments and frame layout
//! - [`tm`]: instructions and the assembly listing
//! - [`generator`]: the program walk and calling convention

pub mod constants;
pub mod generator;
pub mod tm;

pub use generator::{generate, CodeGenerationError};
pub use tm::{Instruction, Line, Listing};
