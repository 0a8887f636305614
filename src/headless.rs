//! Context running the interpreter without any real peripherals: the screen
//! is kept in memory, keys are set by hand and sound is only tracked.

use nanorand::{rand::pcg64::Pcg64 as Rng, RNG};

use chip8_vm::{Context, Frame, FrameView};

pub struct HeadlessContext {
    frame: Option<Frame>,
    keys: [bool; 16],
    sound: bool,
    rng: Rng,
}

impl HeadlessContext {
    pub fn new(seed: u128) -> Self {
        Self {
            frame: None,
            keys: [false; 16],
            sound: false,
            rng: Rng::new_seed(seed),
        }
    }

    /// Hold down `key`, keys above 0xF do not exist and are ignored
    pub fn press(&mut self, key: u8) {
        if let Some(state) = self.keys.get_mut(key as usize) {
            *state = true;
        }
    }

    /// Release `key`, keys above 0xF are ignored
    pub fn release(&mut self, key: u8) {
        if let Some(state) = self.keys.get_mut(key as usize) {
            *state = false;
        }
    }

    pub fn is_sound_on(&self) -> bool {
        self.sound
    }

    /// Last presented frame, `#` for lit pixels and `.` for dark ones
    pub fn render(&self) -> String {
        let frame = match &self.frame {
            Some(frame) => frame,
            None => return String::new(),
        };
        let mut screen = String::new();
        for row in frame.view().iter_rows() {
            screen.extend(row.iter().by_vals().map(|lit| if lit { '#' } else { '.' }));
            screen.push('\n');
        }
        screen
    }
}

impl Context for HeadlessContext {
    fn on_frame(&mut self, frame: FrameView<'_>) {
        self.frame = Some(frame.copy_frame());
    }

    fn sound_on(&mut self) {
        self.sound = true;
    }

    fn sound_off(&mut self) {
        self.sound = false;
    }

    fn get_keys(&mut self) -> &[bool; 16] {
        &self.keys
    }

    fn gen_random(&mut self) -> u8 {
        self.rng.generate::<u8>()
    }
}
