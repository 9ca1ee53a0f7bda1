/// The delay and sound timers: two 8-bit counters that count down to zero
/// at 60 Hz, independently of instruction throughput.
#[derive(Debug, Default)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// One 60 Hz tick: decrements each timer that is above zero.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// True while the sound timer is running; the audio collaborator
    /// should be beeping.
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }

    pub fn reset(&mut self) {
        self.delay = 0;
        self.sound = 0;
    }
}
