#![no_std]
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod timer;

/// Maximum number of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

pub use builder::{BuildError, Builder};
pub use config::{Quirks, ShiftSource, SpriteEdge};
pub use context::Context;
pub use error::Error;
pub use frame::{Frame, FrameView, HEIGHT, WIDTH};
pub use machine::{Chip8, ExecState};
pub use opcode::OpCode;

pub use nb;
