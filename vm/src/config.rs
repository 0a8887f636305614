//! Behaviours that differ between CHIP-8 interpreters in the wild

/// What happens to sprite pixels crossing the right or bottom border
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpriteEdge {
    /// Pixels reappear on the opposite side of the screen
    Wrap,
    /// Pixels past the border are dropped
    Clip,
}

/// Register that `SHR` and `SHL` take their operand from
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShiftSource {
    /// VX is shifted in place, VY is ignored
    Vx,
    /// VX receives VY shifted, as on the COSMAC VIP
    Vy,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Quirks {
    pub sprite_edge: SpriteEdge,
    pub shift_source: ShiftSource,
    /// `LD [I], Vx` and `LD Vx, [I]` leave I pointing past the last byte
    pub index_increment: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            sprite_edge: SpriteEdge::Wrap,
            shift_source: ShiftSource::Vx,
            index_increment: false,
        }
    }
}
