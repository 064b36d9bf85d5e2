use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, SystemTime};

/// Advanced once per simulation step.
pub trait Tickable {
    fn tick(&mut self);
}

/// Time source for the timers. Tests freeze it and advance it by hand so
/// interval behavior is deterministic without sleeping.
pub struct Clock {
    frozen: Option<SystemTime>,
    offset: Duration,
    last_unfrozen: SystemTime,
}

impl Clock {
    /// A singleton instance of Clock.
    // Threading the clock through every timer isn't worth it; one process, one clock.
    pub fn instance() -> &'static Mutex<Self> {
        static INSTANCE: OnceLock<Mutex<Clock>> = OnceLock::new();
        INSTANCE.get_or_init(|| Mutex::new(Clock::new()))
    }

    pub fn new() -> Self {
        Self {
            frozen: None,
            offset: Duration::ZERO,
            last_unfrozen: SystemTime::now(),
        }
    }

    /// Freezes the clock: `now` returns the same instant until `unfreeze`.
    pub fn freeze(&mut self) {
        if self.frozen.is_some() {
            panic!("Clock is already frozen");
        }
        self.frozen = Some(self.now());
    }

    pub fn unfreeze(&mut self) {
        match self.frozen.take() {
            Some(frozen_time) => {
                self.offset += frozen_time
                    .duration_since(self.last_unfrozen)
                    .expect("Time went backwards");
                self.last_unfrozen = SystemTime::now();
            }
            None => panic!("Clock is not frozen"),
        }
    }

    /// Advances the frozen clock by the given duration.
    pub fn advance(&mut self, duration: Duration) {
        match self.frozen {
            Some(frozen_time) => self.frozen = Some(frozen_time + duration),
            None => panic!("Clock is not frozen"),
        }
    }

    /// Returns the time, considering frozen time and accumulated offset.
    pub fn now(&self) -> SystemTime {
        match self.frozen {
            Some(frozen_time) => frozen_time,
            None => SystemTime::now() + self.offset,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due: SystemTime,
    interval: Duration,
    repeat: bool,
}

/// Schedules keyed events to fire after an interval. Call `tick` to retire
/// one-shot entries that fired and re-arm the repeating ones.
pub struct TickTimer<T: Eq + Hash + Clone> {
    entries: HashMap<T, TimerEntry>,
}

impl<T: Eq + Hash + Clone> TickTimer<T> {
    pub fn new() -> Self {
        TickTimer {
            entries: HashMap::new(),
        }
    }

    /// Adds a key to the timer IFF it isn't already scheduled.
    /// * `key` - The key to schedule.
    /// * `interval` - How long to wait before the key is ready.
    /// * `repeat` - If the key should re-arm every `interval` after firing.
    pub fn schedule(&mut self, key: T, interval: Duration, repeat: bool) {
        let now = Clock::instance().lock().unwrap().now();

        self.entries.entry(key).or_insert(TimerEntry {
            due: now + interval,
            interval,
            repeat,
        });
    }

    /// Removes a key from the timer. Returns true if it was scheduled.
    pub fn cancel(&mut self, key: &T) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn is_scheduled(&self, key: &T) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys whose interval has elapsed.
    pub fn ready(&self) -> Vec<T> {
        let now = Clock::instance().lock().unwrap().now();

        self.entries
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<T: Eq + Hash + Clone> Tickable for TickTimer<T> {
    fn tick(&mut self) {
        let now = Clock::instance().lock().unwrap().now();

        self.entries.retain(|_, entry| entry.due > now || entry.repeat);

        for entry in self.entries.values_mut() {
            if entry.due <= now && entry.repeat {
                entry.due = now + entry.interval;
            }
        }
    }
}
