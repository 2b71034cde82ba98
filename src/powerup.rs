use std::time::Duration;

use rand::Rng;

use crate::config::PowerUpTiming;

/// A pending deadline tagged with the scheduler generation that armed it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Timer {
    pub generation: u64,
    pub due: Duration,
}

/// Timer firings the engine turns into state changes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PowerUpEvent {
    Spawn,
    Expire,
}

/// Coarse lifecycle of the scheduler.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SchedulerState {
    Idle,
    Scheduled,
    Active,
}

/// Owns the spawn and expiry deadlines of the single power-up.
///
/// Spawn cadence is independent of expiry and consumption: eating a power-up
/// cancels its expiry but leaves the next spawn where it was. [`stop`] moves
/// to a new generation; a timer armed under an older generation counts as
/// cancelled and is discarded the next time [`poll`] sees it.
///
/// [`stop`]: PowerUpScheduler::stop
/// [`poll`]: PowerUpScheduler::poll
#[derive(Debug, Clone)]
pub struct PowerUpScheduler {
    timing: PowerUpTiming,
    generation: u64,
    spawn_timer: Option<Timer>,
    expiry_timer: Option<Timer>,
}

impl PowerUpScheduler {
    #[must_use]
    pub fn new(timing: PowerUpTiming) -> Self {
        Self {
            timing,
            generation: 0,
            spawn_timer: None,
            expiry_timer: None,
        }
    }

    /// Arms the first spawn after the initial delay. No-op when already started.
    pub fn start(&mut self, now: Duration) {
        if self.live(self.spawn_timer).is_some() {
            return;
        }

        self.spawn_timer = Some(self.timer(now + ms(self.timing.initial_delay_ms)));
    }

    /// Cancels every pending deadline. Returns whether anything was armed.
    pub fn stop(&mut self) -> bool {
        let was_armed = self.state() != SchedulerState::Idle;
        if was_armed {
            self.generation += 1;
        }
        was_armed
    }

    /// Starts the lifetime of a power-up that was just placed on the board.
    pub fn arm_expiry(&mut self, now: Duration) {
        if self.live(self.spawn_timer).is_none() {
            return;
        }

        self.expiry_timer = Some(self.timer(now + ms(self.timing.lifetime_ms)));
    }

    /// Cancels the expiry of a consumed power-up. Returns whether one was pending.
    pub fn consume(&mut self) -> bool {
        let expiry = self.expiry_timer.take();
        self.live(expiry).is_some()
    }

    /// Fires every deadline that is due at `now`, expiry first.
    ///
    /// A fired spawn re-arms itself after a uniformly random delay in
    /// `[min_spawn_delay_ms, max_spawn_delay_ms]`, measured from its own due
    /// time so a late poll does not stretch the cadence.
    pub fn poll<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Vec<PowerUpEvent> {
        let mut fired = Vec::new();

        if let Some(timer) = self.expiry_timer {
            if timer.generation != self.generation {
                self.expiry_timer = None;
            } else if timer.due <= now {
                self.expiry_timer = None;
                fired.push(PowerUpEvent::Expire);
            }
        }

        if let Some(timer) = self.spawn_timer {
            if timer.generation != self.generation {
                self.spawn_timer = None;
            } else if timer.due <= now {
                let range = self.timing.min_spawn_delay_ms..=self.timing.max_spawn_delay_ms;
                let delay = rng.gen_range(range);
                self.spawn_timer = Some(self.timer(timer.due + ms(delay)));
                fired.push(PowerUpEvent::Spawn);
            }
        }

        fired
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        match (self.live(self.spawn_timer), self.live(self.expiry_timer)) {
            (_, Some(_)) => SchedulerState::Active,
            (Some(_), None) => SchedulerState::Scheduled,
            (None, None) => SchedulerState::Idle,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time left before the live power-up expires.
    #[must_use]
    pub fn expires_in(&self, now: Duration) -> Option<Duration> {
        self.live(self.expiry_timer)
            .map(|timer| timer.due.saturating_sub(now))
    }

    /// Time left before the next spawn.
    #[must_use]
    pub fn next_spawn_in(&self, now: Duration) -> Option<Duration> {
        self.live(self.spawn_timer)
            .map(|timer| timer.due.saturating_sub(now))
    }

    fn live(&self, timer: Option<Timer>) -> Option<Timer> {
        timer.filter(|timer| timer.generation == self.generation)
    }

    fn timer(&self, due: Duration) -> Timer {
        Timer {
            generation: self.generation,
            due,
        }
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
