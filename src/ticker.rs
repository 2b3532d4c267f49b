use std::{
    cell::RefCell,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread,
    time::Duration,
};

use crate::runtime::SessionEvent;

/// Identifies the armed tick a `SessionEvent::Tick` came from
pub type TickId = u64;

static NEXT_TICK_ID: AtomicU64 = AtomicU64::new(1);

/// Owned handle to an armed periodic tick. Dropping it stops the ticks.
#[derive(Debug)]
pub struct TickGuard {
    id: TickId,
    live: Arc<AtomicBool>,
}

impl TickGuard {
    fn new() -> (Self, Arc<AtomicBool>) {
        let id = NEXT_TICK_ID.fetch_add(1, Ordering::Relaxed);
        let live = Arc::new(AtomicBool::new(true));
        (
            Self {
                id,
                live: live.clone(),
            },
            live,
        )
    }

    /// Every tick sent for this guard carries this id
    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn cancel(self) {
        // Drop does the work
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Something that can start a periodic tick
pub trait TickScheduler {
    fn arm(&mut self, interval: Duration) -> TickGuard;
}

/// Spawns a thread per armed tick that feeds `SessionEvent::Tick` into the event channel
#[derive(Debug, Clone)]
pub struct ThreadTicker {
    tx: Sender<SessionEvent>,
}

impl ThreadTicker {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl TickScheduler for ThreadTicker {
    fn arm(&mut self, interval: Duration) -> TickGuard {
        let (guard, live) = TickGuard::new();
        let id = guard.id();
        let tx = self.tx.clone();

        // a tick can still slip out after cancel; receivers drop ids they no longer hold
        thread::spawn(move || loop {
            thread::sleep(interval);
            if !live.load(Ordering::SeqCst) || tx.send(SessionEvent::Tick(id)).is_err() {
                break;
            }
        });

        guard
    }
}

/// Records armed ticks without any thread; tests fire ticks by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    armed: Rc<RefCell<Vec<(TickId, Duration, Arc<AtomicBool>)>>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of ticks ever armed
    pub fn armed_count(&self) -> usize {
        self.armed.borrow().len()
    }

    /// Ticks armed and not yet cancelled
    pub fn live_count(&self) -> usize {
        self.armed
            .borrow()
            .iter()
            .filter(|(_, _, live)| live.load(Ordering::SeqCst))
            .count()
    }

    pub fn last_interval(&self) -> Option<Duration> {
        self.armed.borrow().last().map(|(_, interval, _)| *interval)
    }

    pub fn last_id(&self) -> Option<TickId> {
        self.armed.borrow().last().map(|(id, _, _)| *id)
    }
}

impl TickScheduler for ManualTicks {
    fn arm(&mut self, interval: Duration) -> TickGuard {
        let (guard, live) = TickGuard::new();
        self.armed.borrow_mut().push((guard.id(), interval, live));
        guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn dropping_guard_cancels() {
        let mut ticks = ManualTicks::new();
        let guard = ticks.arm(Duration::from_secs(1));
        assert!(guard.is_live());
        assert_eq!(ticks.live_count(), 1);
        assert_eq!(ticks.last_id(), Some(guard.id()));

        guard.cancel();
        assert_eq!(ticks.live_count(), 0);
        assert_eq!(ticks.armed_count(), 1);
    }

    #[test]
    fn each_guard_gets_a_fresh_id() {
        let mut ticks = ManualTicks::new();
        let first = ticks.arm(Duration::from_secs(1));
        let second = ticks.arm(Duration::from_secs(1));
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn manual_ticks_share_state_between_clones() {
        let ticks = ManualTicks::new();
        let mut handle = ticks.clone();
        let _guard = handle.arm(Duration::from_millis(250));

        assert_eq!(ticks.live_count(), 1);
        assert_eq!(ticks.last_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn thread_ticker_sends_ticks_until_cancelled() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::new(tx);
        let guard = ticker.arm(Duration::from_millis(5));

        let id = guard.id();
        assert_matches!(
            rx.recv_timeout(Duration::from_secs(1)),
            Ok(SessionEvent::Tick(tick)) if tick == id
        );

        guard.cancel();
        // allow an in-flight tick to land, then the channel must go quiet
        thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
