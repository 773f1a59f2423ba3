use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use encwatch_core::Msg;

/// Decides when the next reconciliation tick fires.
pub trait Scheduler: Send + 'static {
    /// Blocks until the next tick is due. Returns `false` once no more ticks
    /// should fire.
    fn wait_next(&mut self) -> bool;
}

/// Fires immediately, then once per `period`, optionally stopping after
/// `limit` ticks.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    period: Duration,
    limit: Option<u64>,
    fired: u64,
}

impl IntervalScheduler {
    pub fn new(period: Duration, limit: Option<u64>) -> Self {
        Self {
            period,
            limit,
            fired: 0,
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn wait_next(&mut self) -> bool {
        if self.limit.is_some_and(|limit| self.fired >= limit) {
            return false;
        }
        if self.fired > 0 {
            thread::sleep(self.period);
        }
        self.fired += 1;
        true
    }
}

/// Sends `Msg::Tick` on every scheduler wake-up until the scheduler stops or
/// the receiver goes away.
pub fn spawn_ticker<S: Scheduler>(mut scheduler: S, tx: mpsc::Sender<Msg>) -> JoinHandle<()> {
    thread::spawn(move || {
        while scheduler.wait_next() {
            if tx.send(Msg::Tick).is_err() {
                break;
            }
        }
    })
}
