use log::info;

use crate::config::Quirks;
use crate::context::Context;
use crate::error::Error;
use crate::machine::Chip8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("context not provided")]
    MissingContext,
    #[error("program not provided")]
    MissingProgram,
    #[error("cannot load program: {0}")]
    Load(#[from] Error),
}

pub struct Builder<'a, C: Context> {
    context: Option<C>,
    program: Option<&'a [u8]>,
    quirks: Quirks,
}

impl<'a, C: Context> Builder<'a, C> {
    pub fn new() -> Self {
        Self {
            context: None,
            program: None,
            quirks: Quirks::default(),
        }
    }

    pub fn with_context(mut self, ctx: C) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn with_program(mut self, prog: &'a [u8]) -> Self {
        self.program = Some(prog);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn build(self) -> Result<Chip8<C>, BuildError> {
        let context = self.context.ok_or(BuildError::MissingContext)?;
        let program = self.program.ok_or(BuildError::MissingProgram)?;
        let mut chip = Chip8::with_quirks(context, self.quirks);
        chip.load(program)?;
        info!("machine ready, {} byte program, {:?}", program.len(), self.quirks);
        Ok(chip)
    }
}

impl<'a, C: Context> Default for Builder<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}
