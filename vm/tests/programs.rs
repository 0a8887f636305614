use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use std::time::Duration;

use crossbeam_utils::thread;

use chip8_vm::{nb, Builder, Chip8, Context, Error, ExecState, FrameView, HEIGHT, WIDTH};

struct TestingContext {
    screen: Vec<String>,
    keys: [bool; 16],
    sound: bool,
}

impl TestingContext {
    fn new() -> Self {
        let row: String = std::iter::repeat('.').take(WIDTH).collect();
        Self {
            screen: vec![row; HEIGHT],
            keys: [false; 16],
            sound: false,
        }
    }

    fn formatted(&self) -> String {
        self.screen.join("\n") + "\n"
    }

    /// Top-left `width` x `height` corner of the screen
    fn corner(&self, width: usize, height: usize) -> Vec<&str> {
        self.screen[..height].iter().map(|row| &row[..width]).collect()
    }
}

impl Context for TestingContext {
    fn on_frame(&mut self, frame: FrameView<'_>) {
        self.screen = frame
            .iter_rows()
            .map(|row| {
                row.iter()
                    .by_vals()
                    .map(|lit| if lit { '#' } else { '.' })
                    .collect()
            })
            .collect();
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
        rand::random::<u8>()
    }
}

fn words(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|word| word.to_be_bytes()).collect()
}

fn chip(program: &[u16]) -> Chip8<TestingContext> {
    let _ = env_logger::builder().is_test(true).try_init();

    Builder::new()
        .with_context(TestingContext::new())
        .with_program(&words(program))
        .build()
        .unwrap()
}

#[test]
fn load_then_add() {
    let mut chip = chip(&[0x6A12, 0x7A05]);
    chip.step().unwrap();
    chip.step().unwrap();
    assert_eq!(chip.v(0xA), 0x17);
    assert_eq!(chip.pc(), 0x204);
}

#[test]
fn call_then_return() {
    let mut program = vec![0u16; 0x81];
    program[0x00] = 0x2300; // CALL 0x300
    program[0x80] = 0x00EE; // RET
    let mut chip = chip(&program);
    chip.step().unwrap();
    assert_eq!((chip.pc(), chip.sp()), (0x300, 1));
    assert_eq!(chip.stack(), &[0x200]);
    chip.step().unwrap();
    assert_eq!((chip.pc(), chip.sp()), (0x202, 0));
}

#[test]
fn draw_font_glyph() {
    #[rustfmt::skip]
    let mut chip = chip(&[
        0x6005, // LD V0, 5
        0xF029, // LD F, V0
        0x6103, // LD V1, 3
        0x6202, // LD V2, 2
        0xD125, // DRW V1, V2, 5
    ]);
    for _ in 0..5 {
        chip.step().unwrap();
    }
    assert_eq!(chip.v(0xF), 0);
    assert_eq!(
        chip.ctx().corner(8, 8),
        [
            "........",
            "........",
            "...####.",
            "...#....",
            "...####.",
            "......#.",
            "...####.",
            "........",
        ],
    );
    assert_eq!(chip.frame().lit_pixels(), 14);
}

#[test]
fn cleared_screen_is_blank() {
    let mut chip = chip(&[0x00E0]);
    chip.step().unwrap();

    let blank = TestingContext::new().formatted();
    assert_eq!(chip.ctx().formatted(), blank);
}

#[test]
fn waits_for_key_press() {
    let mut chip = chip(&[0xF30A, 0x1202]);
    assert_eq!(chip.step(), Err(nb::Error::WouldBlock));
    assert_eq!(chip.state(), ExecState::AwaitingKey { x: 3 });
    assert_eq!(chip.step(), Err(nb::Error::WouldBlock));

    chip.ctx_mut().keys[0x7] = true;
    chip.step().unwrap();
    assert_eq!(chip.v(3), 0x7);
    assert_eq!(chip.pc(), 0x202);
    assert_eq!(chip.state(), ExecState::Running);
}

#[test]
fn beeps_until_timer_runs_out() {
    let mut chip = chip(&[0x6002, 0xF018]);
    chip.step().unwrap();
    chip.step().unwrap();
    assert!(chip.ctx().sound);
    chip.tick_timers();
    assert!(chip.ctx().sound);
    chip.tick_timers();
    assert!(!chip.ctx().sound);
}

#[test]
fn random_is_masked() {
    let mut chip = chip(&[0xC00F, 0xC100]);
    chip.step().unwrap();
    chip.step().unwrap();
    assert!(chip.v(0) <= 0x0F);
    assert_eq!(chip.v(1), 0);
}

#[test]
fn illegal_instruction_halts() {
    let mut chip = chip(&[0x6001, 0x0123]);
    chip.step().unwrap();
    assert_eq!(
        chip.step(),
        Err(nb::Error::Other(Error::IllegalInstruction { opcode: 0x0123 })),
    );
    assert_eq!(chip.pc(), 0x202);
    assert_eq!(chip.v(0), 0x01);
}

#[test]
fn reset_replays_program() {
    let mut chip = chip(&[0x6A12, 0x7A05]);
    chip.step().unwrap();
    chip.step().unwrap();
    chip.reset();
    assert_eq!((chip.pc(), chip.v(0xA)), (0x200, 0));
    chip.step().unwrap();
    chip.step().unwrap();
    assert_eq!(chip.v(0xA), 0x17);
}

#[test]
fn timers_and_cpu_on_separate_threads() {
    #[rustfmt::skip]
    let chip = Mutex::new(chip(&[
        0x6003, // LD V0, 3
        0xF015, // LD DT, V0
        0xF107, // LD V1, DT
        0x3100, // SE V1, 0
        0x1204, // JP 0x204
        0x620A, // LD V2, 0xA
        0xF229, // LD F, V2
        0x6300, // LD V3, 0
        0xD335, // DRW V3, V3, 5
        0x1212, // JP 0x212
    ]));
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|_| {
            for _ in 0..1000 {
                if done.load(Ordering::Acquire) {
                    break;
                }
                chip.lock().unwrap().tick_timers();
                std::thread::sleep(Duration::from_millis(1));
            }
            done.store(true, Ordering::Release);
        });
        s.spawn(|_| {
            while !done.load(Ordering::Acquire) {
                let mut chip = chip.lock().unwrap();
                chip.step().unwrap();
                if chip.pc() == 0x212 {
                    done.store(true, Ordering::Release);
                }
                drop(chip);
                std::thread::yield_now();
            }
        });
    })
    .unwrap();

    let chip = chip.into_inner().unwrap();
    assert_eq!(chip.pc(), 0x212);
    assert_eq!(chip.delay_timer(), 0);
    assert_eq!(
        chip.ctx().corner(5, 6),
        ["####.", "#..#.", "####.", "#..#.", "#..#.", "....."],
    );
}
