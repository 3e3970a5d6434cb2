use std::fmt;
use std::time::Duration;

/// A simple counter of events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCounter {
    count: u64,
}

impl EventCounter {
    /// Increment the event counter
    pub fn inc(&mut self) {
        self.inc_by(1);
    }

    /// Increment the event counter by provided value
    pub fn inc_by(&mut self, value: u64) {
        self.count += value;
    }

    pub fn get(&self) -> u64 {
        self.count
    }
}

impl fmt::Display for EventCounter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.count)
    }
}

/// A counter of events of different sizes (eg object copies, where the number of objects and the
/// total volume of objects are both counted).
///
/// The counter is trivially composed from two event counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeCounter {
    units: EventCounter,
    volume: EventCounter,
}

impl SizeCounter {
    /// Count one event of `size` bytes.
    pub fn inc(&mut self, size: usize) {
        self.units.inc();
        self.volume.inc_by(size as u64);
    }

    pub fn merge(&mut self, other: &SizeCounter) {
        self.units.inc_by(other.units.get());
        self.volume.inc_by(other.volume.get());
    }

    pub fn units(&self) -> u64 {
        self.units.get()
    }

    pub fn volume(&self) -> u64 {
        self.volume.get()
    }
}

impl fmt::Display for SizeCounter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.units, self.volume)
    }
}

/// Accumulated wall clock time of a recurring event, such as a collection pause.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    total: Duration,
    max: Duration,
    count: u64,
}

impl Timer {
    pub fn record(&mut self, elapsed: Duration) {
        self.total += elapsed;
        self.max = self.max.max(elapsed);
        self.count += 1;
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.2} ms (max {:.2} ms)",
            self.total.as_secs_f64() * 1e3,
            self.max.as_secs_f64() * 1e3
        )
    }
}
