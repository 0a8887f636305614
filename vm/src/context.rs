//! Context for accessing functionalities of platform that `Chip8` is
//! emulated on.
//!
//! Everything the interpreter needs from the outside world goes through this
//! trait: frames out, sound edges out, key states and random bytes in.

use crate::frame::FrameView;

/// Trait aggregating platform functionalities
pub trait Context {
    /// Draw current frame to the screen
    ///
    /// Called by `step` after `CLS` and `DRW`, and by `reset`
    fn on_frame(&mut self, frame: FrameView<'_>);
    /// Turn sound on
    ///
    /// Called by `step` when the sound timer is set from zero to a non-zero value
    fn sound_on(&mut self);
    /// Turn sound off
    ///
    /// Called when the sound timer gets back to zero
    fn sound_off(&mut self);
    /// Get state of each key on 4x4 keyboard
    ///
    /// Called by `step` before each cycle
    fn get_keys(&mut self) -> &[bool; 16];
    /// Generate random 8-bit number
    ///
    /// Called by `step` whenever requested by executing program
    fn gen_random(&mut self) -> u8;
}
