#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    On,
    Off,
    /// Reached zero on this decrement
    Finished,
}

/// 8-bit countdown register ticked at 60Hz
#[derive(Debug, Default)]
pub struct Timer(u8);

impl Timer {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn store(&mut self, value: u8) {
        self.0 = value;
    }

    #[inline]
    pub fn load(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn decrement(&mut self) -> TimerState {
        match self.0 {
            0 => TimerState::Off,
            1 => {
                self.0 = 0;
                TimerState::Finished
            }
            _ => {
                self.0 -= 1;
                TimerState::On
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_zero() {
        let mut timer = Timer::new();
        timer.store(3);
        assert_eq!(timer.decrement(), TimerState::On);
        assert_eq!(timer.decrement(), TimerState::On);
        assert_eq!(timer.load(), 1);
        assert_eq!(timer.decrement(), TimerState::Finished);
        assert_eq!(timer.load(), 0);
    }

    #[test]
    fn clamps_at_zero() {
        let mut timer = Timer::new();
        assert_eq!(timer.decrement(), TimerState::Off);
        assert_eq!(timer.decrement(), TimerState::Off);
        assert_eq!(timer.load(), 0);
    }

    #[test]
    fn full_countdown_takes_value_ticks() {
        let mut timer = Timer::new();
        timer.store(0xFF);
        let ticks = (0..).take_while(|_| timer.decrement() != TimerState::Finished).count();
        assert_eq!(ticks + 1, 0xFF);
    }
}
