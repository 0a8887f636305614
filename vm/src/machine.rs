use core::convert::TryFrom;

use heapless::Vec;
use log::{debug, error, trace};

use crate::config::{Quirks, ShiftSource};
use crate::context::Context;
use crate::error::Error;
use crate::frame::{Frame, FrameView};
use crate::memory::{Memory, ADDRESS_MAX, GLYPH_SIZE, PROGRAM_START};
use crate::opcode::OpCode;
use crate::timer::{Timer, TimerState};
use crate::STACK_DEPTH;

pub const REGISTERS: usize = 16;
pub const KEYS: usize = 16;
const VF: usize = 0xF;

/// Whether the machine fetches instructions or sits on `LD Vx, K`
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExecState {
    Running,
    /// Suspended until any key is held, the key index goes to VX
    AwaitingKey { x: u8 },
}

/// Where execution continues once a handler is done
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Wait(u8),
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

pub struct Chip8<C: Context + Sized> {
    ctx: C,
    quirks: Quirks,
    v: [u8; REGISTERS],
    i: u16,
    pc: u16,
    stack: Vec<u16, STACK_DEPTH>,
    memory: Memory,
    frame: Frame,
    keypad: [bool; KEYS],
    delay_timer: Timer,
    sound_timer: Timer,
    state: ExecState,
}

impl<C: Context + Sized> Chip8<C> {
    pub fn new(ctx: C) -> Self {
        Self::with_quirks(ctx, Quirks::default())
    }

    pub fn with_quirks(ctx: C, quirks: Quirks) -> Self {
        Self {
            ctx,
            quirks,
            v: [0; REGISTERS],
            i: 0,
            pc: PROGRAM_START,
            stack: Vec::new(),
            memory: Memory::new(),
            frame: Frame::new(),
            keypad: [false; KEYS],
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
            state: ExecState::Running,
        }
    }

    /// Load program from slice of bytes to memory from 0x200 (_start address)
    ///
    /// Registers are left alone, call `reset` to start the program over.
    pub fn load(&mut self, prog: &[u8]) -> Result<(), Error> {
        self.memory.load(prog)
    }

    /// Bring every register, timer, the stack, keypad and screen back to
    /// power-on values, restoring the font and the loaded program in memory
    pub fn reset(&mut self) {
        self.v = [0; REGISTERS];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.stack.clear();
        self.delay_timer.store(0);
        if self.sound_timer.load() > 0 {
            self.ctx.sound_off();
        }
        self.sound_timer.store(0);
        self.memory.reset();
        self.keypad = [false; KEYS];
        self.state = ExecState::Running;
        self.frame.clear();
        self.ctx.on_frame(self.frame.view());
        debug!("machine reset");
    }

    /// Run a single fetch-decode-execute cycle
    ///
    /// Returns `WouldBlock` while the program waits for a key press, in which
    /// case nothing is executed and the call should be repeated once the
    /// keypad changes. A failed instruction leaves the machine untouched.
    pub fn step(&mut self) -> nb::Result<(), Error> {
        self.keypad = *self.ctx.get_keys();
        if let ExecState::AwaitingKey { x } = self.state {
            return self.resume_key_wait(x);
        }

        let result = self.cycle();
        if let Err(nb::Error::Other(err)) = &result {
            error!("{:#05X}: {}", self.pc, err);
        }
        result
    }

    /// Decrement both timers, meant to be called at 60Hz
    pub fn tick_timers(&mut self) {
        self.delay_timer.decrement();
        if self.sound_timer.decrement() == TimerState::Finished {
            debug!("sound timer finished");
            self.ctx.sound_off();
        }
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn registers(&self) -> &[u8; REGISTERS] {
        &self.v
    }

    /// Value of register V`reg`, only the low nibble of `reg` is used
    pub fn v(&self, reg: u8) -> u8 {
        self.v[(reg & 0x0F) as usize]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Current call depth
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    /// Return addresses, innermost call last
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.load()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.load()
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_bytes()
    }

    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    /// Key states as seen by the last `step`
    pub fn keypad(&self) -> &[bool; KEYS] {
        &self.keypad
    }

    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    fn cycle(&mut self) -> nb::Result<(), Error> {
        let raw = self.memory.read_word(self.pc)?;
        let opcode = OpCode::try_from(raw)?;
        trace!("{:#05X}: {:04X} {}", self.pc, raw, opcode);

        if !opcode.is_branch() && self.pc + 2 > ADDRESS_MAX {
            return Err(Error::AddressOverflow { addr: self.pc + 2 }.into());
        }

        match self.execute(opcode)? {
            Flow::Next => self.pc += 2,
            Flow::Skip => {
                let target = self.pc + 4;
                if target > ADDRESS_MAX {
                    return Err(Error::AddressOverflow { addr: target }.into());
                }
                self.pc = target;
            }
            Flow::Jump(addr) => self.pc = addr,
            Flow::Wait(x) => {
                debug!("waiting for a key press to store in V{:X}", x);
                self.state = ExecState::AwaitingKey { x };
                return Err(nb::Error::WouldBlock);
            }
        }
        Ok(())
    }

    fn resume_key_wait(&mut self, x: u8) -> nb::Result<(), Error> {
        let key = match self.first_pressed_key() {
            Some(key) => key,
            None => return Err(nb::Error::WouldBlock),
        };
        debug!("key {:X} pressed, resuming at {:#05X}", key, self.pc + 2);
        self.v[x as usize] = key;
        self.pc += 2;
        self.state = ExecState::Running;
        Ok(())
    }

    fn first_pressed_key(&self) -> Option<u8> {
        self.keypad.iter().position(|&pressed| pressed).map(|key| key as u8)
    }

    /// Value of VX when it is used as a key or glyph index
    fn hex_digit_in(&self, x: u8) -> Result<u8, Error> {
        let value = self.v[x as usize];
        if value > 0x0F {
            Err(Error::InvalidRegisterValue { reg: x, value })
        } else {
            Ok(value)
        }
    }

    /// Writes through I may only touch the program region
    fn check_writable(addr: u16, len: u16) -> Result<(), Error> {
        let last = addr + len - 1;
        if addr < PROGRAM_START {
            Err(Error::AddressOutOfRange { addr })
        } else if last > ADDRESS_MAX {
            Err(Error::AddressOutOfRange { addr: last })
        } else {
            Ok(())
        }
    }

    /// Value of I after a bulk register transfer of `len` bytes
    fn index_after(&self, len: u16) -> Result<u16, Error> {
        if !self.quirks.index_increment {
            return Ok(self.i);
        }
        let next = self.i + len;
        if next > ADDRESS_MAX {
            Err(Error::AddressOverflow { addr: next })
        } else {
            Ok(next)
        }
    }

    fn notify_frame(&mut self) {
        self.ctx.on_frame(self.frame.view());
    }
}

// OpCodes impls
impl<C: Context + Sized> Chip8<C> {
    #[rustfmt::skip]
    fn execute(&mut self, opcode: OpCode) -> Result<Flow, Error> {
        match opcode {
            OpCode::Sys { nnn }      => Err(Error::IllegalInstruction { opcode: nnn }),
            OpCode::Cls              => self.clear_screen(),
            OpCode::Ret              => self.subroutine_return(),
            OpCode::Jp { nnn }       => self.jump_to(nnn),
            OpCode::Call { nnn }     => self.call_subroutine_at(nnn),
            OpCode::SeByte { x, nn } => Ok(Flow::skip_if(self.v[x as usize] == nn)),
            OpCode::SneByte { x, nn }=> Ok(Flow::skip_if(self.v[x as usize] != nn)),
            OpCode::SeReg { x, y }   => Ok(Flow::skip_if(self.v[x as usize] == self.v[y as usize])),
            OpCode::SneReg { x, y }  => Ok(Flow::skip_if(self.v[x as usize] != self.v[y as usize])),
            OpCode::LdByte { x, nn } => self.assign_vx(x, nn),
            OpCode::AddByte { x, nn }=> self.assign_vx(x, self.v[x as usize].wrapping_add(nn)),
            OpCode::LdReg { x, y }   => self.assign_vx(x, self.v[y as usize]),
            OpCode::Or { x, y }      => self.assign_vx(x, self.v[x as usize] | self.v[y as usize]),
            OpCode::And { x, y }     => self.assign_vx(x, self.v[x as usize] & self.v[y as usize]),
            OpCode::Xor { x, y }     => self.assign_vx(x, self.v[x as usize] ^ self.v[y as usize]),
            OpCode::AddReg { x, y }  => self.add_vy_to_vx(x, y),
            OpCode::Sub { x, y }     => self.sub_vy_from_vx(x, y),
            OpCode::Shr { x, y }     => self.shift_right(x, y),
            OpCode::Subn { x, y }    => self.sub_vx_from_vy(x, y),
            OpCode::Shl { x, y }     => self.shift_left(x, y),
            OpCode::LdI { nnn }      => self.assign_i(nnn),
            OpCode::JpV0 { nnn }     => self.jump_to_nnn_add_v0(nnn),
            OpCode::Rnd { x, nn }    => self.assign_vx_random_and_nn(x, nn),
            OpCode::Drw { x, y, n }  => self.draw_n_at_vx_vy(x, y, n),
            OpCode::Skp { x }        => self.skip_if_key(x, true),
            OpCode::Sknp { x }       => self.skip_if_key(x, false),
            OpCode::LdVxDt { x }     => self.assign_vx(x, self.delay_timer.load()),
            OpCode::LdVxK { x }      => self.wait_for_key(x),
            OpCode::LdDtVx { x }     => self.assign_delay_timer(x),
            OpCode::LdStVx { x }     => self.assign_sound_timer(x),
            OpCode::AddIVx { x }     => self.add_vx_to_i(x),
            OpCode::LdF { x }        => self.assign_i_glyph_of_vx(x),
            OpCode::LdB { x }        => self.store_bcd_of_vx(x),
            OpCode::LdMemVx { x }    => self.store_v0_to_vx(x),
            OpCode::LdVxMem { x }    => self.load_v0_to_vx(x),
        }
    }

    fn clear_screen(&mut self) -> Result<Flow, Error> {
        self.frame.clear();
        self.notify_frame();
        Ok(Flow::Next)
    }

    /// Resume after the `CALL` on top of the stack
    fn subroutine_return(&mut self) -> Result<Flow, Error> {
        let &call_site = self.stack.last().ok_or(Error::StackUnderflow)?;
        let target = call_site + 2;
        if target > ADDRESS_MAX {
            return Err(Error::AddressOverflow { addr: target });
        }
        self.stack.pop();
        Ok(Flow::Jump(target))
    }

    fn jump_to(&mut self, nnn: u16) -> Result<Flow, Error> {
        if nnn < PROGRAM_START {
            return Err(Error::InvalidJumpTarget { target: nnn });
        }
        Ok(Flow::Jump(nnn))
    }

    fn call_subroutine_at(&mut self, nnn: u16) -> Result<Flow, Error> {
        if nnn < PROGRAM_START {
            return Err(Error::InvalidJumpTarget { target: nnn });
        }
        self.stack
            .push(self.pc)
            .map_err(|_| Error::StackOverflow)?;
        Ok(Flow::Jump(nnn))
    }

    fn assign_vx(&mut self, x: u8, value: u8) -> Result<Flow, Error> {
        self.v[x as usize] = value;
        Ok(Flow::Next)
    }

    fn add_vy_to_vx(&mut self, x: u8, y: u8) -> Result<Flow, Error> {
        let (value, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[VF] = carry as u8;
        Ok(Flow::Next)
    }

    fn sub_vy_from_vx(&mut self, x: u8, y: u8) -> Result<Flow, Error> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = vx.wrapping_sub(vy);
        self.v[VF] = (vx > vy) as u8;
        Ok(Flow::Next)
    }

    fn sub_vx_from_vy(&mut self, x: u8, y: u8) -> Result<Flow, Error> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = vy.wrapping_sub(vx);
        self.v[VF] = (vy > vx) as u8;
        Ok(Flow::Next)
    }

    fn shift_operand(&self, x: u8, y: u8) -> u8 {
        match self.quirks.shift_source {
            ShiftSource::Vx => self.v[x as usize],
            ShiftSource::Vy => self.v[y as usize],
        }
    }

    fn shift_right(&mut self, x: u8, y: u8) -> Result<Flow, Error> {
        let value = self.shift_operand(x, y);
        self.v[x as usize] = value >> 1;
        self.v[VF] = value & 0x01;
        Ok(Flow::Next)
    }

    fn shift_left(&mut self, x: u8, y: u8) -> Result<Flow, Error> {
        let value = self.shift_operand(x, y);
        self.v[x as usize] = value << 1;
        self.v[VF] = (value & 0x80) >> 7;
        Ok(Flow::Next)
    }

    fn assign_i(&mut self, nnn: u16) -> Result<Flow, Error> {
        self.i = nnn;
        Ok(Flow::Next)
    }

    fn jump_to_nnn_add_v0(&mut self, nnn: u16) -> Result<Flow, Error> {
        let target = nnn + self.v[0] as u16;
        if target < PROGRAM_START || target > ADDRESS_MAX {
            return Err(Error::InvalidJumpTarget { target });
        }
        Ok(Flow::Jump(target))
    }

    fn assign_vx_random_and_nn(&mut self, x: u8, nn: u8) -> Result<Flow, Error> {
        self.v[x as usize] = self.ctx.gen_random() & nn;
        Ok(Flow::Next)
    }

    fn draw_n_at_vx_vy(&mut self, x: u8, y: u8, n: u8) -> Result<Flow, Error> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        let sprite = self.memory.slice(self.i, n as u16)?;
        let collision = self
            .frame
            .draw_sprite(vx, vy, sprite, self.quirks.sprite_edge);
        self.v[VF] = collision as u8;
        self.notify_frame();
        Ok(Flow::Next)
    }

    fn skip_if_key(&mut self, x: u8, pressed: bool) -> Result<Flow, Error> {
        let key = self.hex_digit_in(x)?;
        Ok(Flow::skip_if(self.keypad[key as usize] == pressed))
    }

    fn wait_for_key(&mut self, x: u8) -> Result<Flow, Error> {
        match self.first_pressed_key() {
            Some(key) => self.assign_vx(x, key),
            None => Ok(Flow::Wait(x)),
        }
    }

    fn assign_delay_timer(&mut self, x: u8) -> Result<Flow, Error> {
        self.delay_timer.store(self.v[x as usize]);
        Ok(Flow::Next)
    }

    fn assign_sound_timer(&mut self, x: u8) -> Result<Flow, Error> {
        let value = self.v[x as usize];
        let previous = self.sound_timer.load();
        self.sound_timer.store(value);
        if previous == 0 && value > 0 {
            debug!("sound on for {} ticks", value);
            self.ctx.sound_on();
        } else if previous > 0 && value == 0 {
            debug!("sound cut off");
            self.ctx.sound_off();
        }
        Ok(Flow::Next)
    }

    fn add_vx_to_i(&mut self, x: u8) -> Result<Flow, Error> {
        let addr = self.i + self.v[x as usize] as u16;
        if addr > ADDRESS_MAX {
            return Err(Error::AddressOverflow { addr });
        }
        self.i = addr;
        Ok(Flow::Next)
    }

    fn assign_i_glyph_of_vx(&mut self, x: u8) -> Result<Flow, Error> {
        let digit = self.hex_digit_in(x)?;
        self.i = digit as u16 * GLYPH_SIZE;
        Ok(Flow::Next)
    }

    fn store_bcd_of_vx(&mut self, x: u8) -> Result<Flow, Error> {
        Self::check_writable(self.i, 3)?;
        let value = self.v[x as usize];
        self.memory
            .slice_mut(self.i, 3)?
            .copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
        Ok(Flow::Next)
    }

    fn store_v0_to_vx(&mut self, x: u8) -> Result<Flow, Error> {
        let len = x as u16 + 1;
        Self::check_writable(self.i, len)?;
        let next_i = self.index_after(len)?;
        self.memory
            .slice_mut(self.i, len)?
            .copy_from_slice(&self.v[..len as usize]);
        self.i = next_i;
        Ok(Flow::Next)
    }

    fn load_v0_to_vx(&mut self, x: u8) -> Result<Flow, Error> {
        let len = x as u16 + 1;
        let last = self.i + x as u16;
        if last > ADDRESS_MAX {
            return Err(Error::AddressOverflow { addr: last });
        }
        let next_i = self.index_after(len)?;
        let bytes = self.memory.slice(self.i, len)?;
        self.v[..len as usize].copy_from_slice(bytes);
        self.i = next_i;
        Ok(Flow::Next)
    }
}
