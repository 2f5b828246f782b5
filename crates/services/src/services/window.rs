use utils::time::seconds_since_epoch;

/// Source of the current wall-clock second.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        seconds_since_epoch()
    }
}

/// A one-second window that has been closed and is ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedWindow {
    pub second: i64,
    pub count: u64,
}

/// Counts messages per wall-clock second.
///
/// There is a single state, accumulating `(second, count)`. Observing a message
/// in a different second closes the current window and opens a new one that
/// already holds that message. Nothing is emitted for the window that is open
/// when input stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAggregator {
    second: i64,
    count: u64,
}

impl WindowAggregator {
    pub fn new(second: i64) -> Self {
        Self { second, count: 0 }
    }

    pub fn second(&self) -> i64 {
        self.second
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn observe(&mut self, now: i64) -> Option<CompletedWindow> {
        if now == self.second {
            self.count += 1;
            return None;
        }

        let completed = CompletedWindow {
            second: self.second,
            count: self.count,
        };
        self.second = now;
        self.count = 1;
        Some(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_within_the_same_second() {
        let mut window = WindowAggregator::new(100);
        assert_eq!(window.observe(100), None);
        assert_eq!(window.observe(100), None);
        assert_eq!(window.observe(100), None);
        assert_eq!((window.second(), window.count()), (100, 3));
    }

    #[test]
    fn rollover_emits_previous_window_and_counts_the_new_message() {
        let mut window = WindowAggregator::new(100);
        window.observe(100);
        window.observe(100);

        assert_eq!(
            window.observe(101),
            Some(CompletedWindow {
                second: 100,
                count: 2
            })
        );
        assert_eq!((window.second(), window.count()), (101, 1));
    }

    #[test]
    fn idle_start_emits_an_empty_window() {
        let mut window = WindowAggregator::new(100);
        assert_eq!(
            window.observe(105),
            Some(CompletedWindow {
                second: 100,
                count: 0
            })
        );
    }

    #[test]
    fn any_change_of_second_rolls_over() {
        let mut window = WindowAggregator::new(100);
        window.observe(100);
        assert!(window.observe(99).is_some());
        assert_eq!(window.second(), 99);
    }
}
