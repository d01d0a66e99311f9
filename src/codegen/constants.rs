// Register assignments and frame layout of the TM target machine

/// Always holds zero
pub const REG_ZERO: u8 = 0;

/// General purpose registers, saved by every callee
pub const SCRATCH_REGISTERS: [u8; 3] = [1, 2, 3];

/// Scratch register used to pass `print` its argument
pub const REG_ARGUMENT: u8 = 1;

/// Holds a function's result after it returns
pub const REG_RETURN_VALUE: u8 = 4;

/// Status register: base of the active frame
pub const REG_STATUS: u8 = 5;

/// First free memory cell above the active frame
pub const REG_TOP: u8 = 6;

/// Program counter
pub const REG_PC: u8 = 7;

// Frame slots, relative to the frame base

/// Return address
pub const RETURN_ADDRESS_SLOT: i64 = 0;

/// Caller's status register
pub const SAVED_STATUS_SLOT: i64 = 4;

/// Caller's top register
pub const SAVED_TOP_SLOT: i64 = 5;

/// Cells used by a frame above its base
pub const FRAME_SIZE: i64 = 6;

/// Initial status and top when the program starts
pub const INITIAL_STATUS: i64 = 1;
pub const INITIAL_TOP: i64 = 2;
