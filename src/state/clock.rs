//! Countdown clock driving turn expiry for the question on screen.
//!
//! The clock owns its tokio driver task through the [`TurnClock`] handle;
//! starting or resetting always cancels the previous driver first, so at most
//! one countdown ever decrements the shared state.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

/// Events emitted by the countdown driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second elapsed; payload is the remaining time.
    Tick(u32),
    /// The countdown ran out. Emitted exactly once per countdown.
    Expired,
}

/// Observable countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    /// Seconds remaining, `0 <= time_left <= duration`.
    pub time_left: u32,
    /// True only while a countdown driver is active.
    pub running: bool,
    /// Duration the current countdown started from.
    pub duration: u32,
}

impl ClockState {
    fn idle() -> Self {
        Self {
            time_left: 0,
            running: false,
            duration: 0,
        }
    }
}

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    /// Countdown continues with the given remaining time.
    Continue(u32),
    /// The countdown just ran out.
    Expired,
    /// The clock was stopped elsewhere; the driver should exit.
    Stopped,
}

/// Single-countdown timer with explicit `start`/`reset`/`stop` ownership.
pub struct TurnClock {
    state: Arc<Mutex<ClockState>>,
    events: mpsc::UnboundedSender<ClockEvent>,
    driver: Option<JoinHandle<()>>,
}

impl TurnClock {
    /// Create an idle clock that reports ticks and expiry on `events`.
    pub fn new(events: mpsc::UnboundedSender<ClockEvent>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState::idle())),
            events,
            driver: None,
        }
    }

    /// Begin a countdown from `duration` seconds, cancelling any countdown
    /// already in progress.
    pub fn start(&mut self, duration: u32) {
        let duration = duration.max(1);
        self.cancel_driver();

        if let Ok(mut guard) = self.state.lock() {
            *guard = ClockState {
                time_left: duration,
                running: true,
                duration,
            };
        }

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        self.driver = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so the
            // countdown holds its starting value for a full second.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match tick(&state) {
                    TickOutcome::Continue(left) => {
                        let _ = events.send(ClockEvent::Tick(left));
                    }
                    TickOutcome::Expired => {
                        let _ = events.send(ClockEvent::Expired);
                        break;
                    }
                    TickOutcome::Stopped => break,
                }
            }
        }));
    }

    /// Restart the countdown from `duration` (the manual "renew time"
    /// action). Does not advance the turn.
    pub fn reset(&mut self, duration: u32) {
        self.start(duration);
    }

    /// Cancel the countdown, keeping the remaining time as is. Calling `stop`
    /// on an idle clock is a no-op.
    pub fn stop(&mut self) {
        self.cancel_driver();
        if let Ok(mut guard) = self.state.lock() {
            guard.running = false;
        }
    }

    /// Copy of the current countdown state.
    pub fn snapshot(&self) -> ClockState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|_| ClockState::idle())
    }

    fn cancel_driver(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

impl Drop for TurnClock {
    fn drop(&mut self) {
        self.cancel_driver();
    }
}

/// Advance the countdown by one second.
///
/// Expiry fires on the tick where the previous value was already down to 1:
/// a countdown of N seconds shows exactly the values N..=1, then expires.
fn tick(state: &Mutex<ClockState>) -> TickOutcome {
    let Ok(mut guard) = state.lock() else {
        return TickOutcome::Stopped;
    };

    if !guard.running {
        return TickOutcome::Stopped;
    }

    if guard.time_left <= 1 {
        guard.time_left = 0;
        guard.running = false;
        TickOutcome::Expired
    } else {
        guard.time_left -= 1;
        TickOutcome::Continue(guard.time_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn running_state(duration: u32) -> Mutex<ClockState> {
        Mutex::new(ClockState {
            time_left: duration,
            running: true,
            duration,
        })
    }

    #[test]
    fn countdown_of_n_shows_n_values_then_expires_once() {
        let state = running_state(3);

        assert_eq!(tick(&state), TickOutcome::Continue(2));
        assert_eq!(tick(&state), TickOutcome::Continue(1));
        assert_eq!(tick(&state), TickOutcome::Expired);
        // Driver exits after expiry; a further tick observes a stopped clock.
        assert_eq!(tick(&state), TickOutcome::Stopped);

        let guard = state.lock().unwrap();
        assert_eq!(guard.time_left, 0);
        assert!(!guard.running);
    }

    #[test]
    fn one_second_countdown_expires_on_the_first_tick() {
        let state = running_state(1);
        assert_eq!(tick(&state), TickOutcome::Expired);
    }

    #[test]
    fn tick_on_a_stopped_clock_does_not_expire() {
        let state = running_state(5);
        state.lock().unwrap().running = false;
        assert_eq!(tick(&state), TickOutcome::Stopped);
        assert_eq!(state.lock().unwrap().time_left, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_emits_each_tick_and_exactly_one_expiry() {
        let (tx, mut rx) = unbounded_channel();
        let mut clock = TurnClock::new(tx);
        clock.start(3);

        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(rx.recv().await, Some(ClockEvent::Tick(2)));
        assert_eq!(rx.recv().await, Some(ClockEvent::Tick(1)));
        assert_eq!(rx.recv().await, Some(ClockEvent::Expired));
        assert!(rx.try_recv().is_err());
        assert_eq!(clock.snapshot().time_left, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_the_previous_driver() {
        let (tx, mut rx) = unbounded_channel();
        let mut clock = TurnClock::new(tx);
        clock.start(5);
        clock.start(2);

        tokio::time::sleep(Duration::from_secs(10)).await;

        let mut expiries = 0;
        while let Ok(event) = rx.try_recv() {
            if event == ClockEvent::Expired {
                expiries += 1;
            }
        }
        // Two concurrent drivers would double-count; only the restarted
        // countdown may expire.
        assert_eq!(expiries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_keeps_the_remaining_time() {
        let (tx, mut rx) = unbounded_channel();
        let mut clock = TurnClock::new(tx);
        clock.start(10);

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        clock.stop();
        let at_stop = clock.snapshot();
        assert!(!at_stop.running);
        assert_eq!(at_stop.time_left, 7);

        // Stopping again is a no-op, and no further events arrive.
        clock.stop();
        tokio::time::sleep(Duration::from_secs(10)).await;
        while let Ok(event) = rx.try_recv() {
            assert_ne!(event, ClockEvent::Expired);
        }
        assert_eq!(clock.snapshot().time_left, 7);
    }
}
