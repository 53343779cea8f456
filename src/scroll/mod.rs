//! Edge-triggered infinite-scroll sentinel.
//!
//! The feed view plants a sentinel after the last rendered item and feeds
//! its visibility into an [`IntersectionTrigger`]. The trigger fires its
//! callback exactly once per hidden-to-visible transition, so holding the
//! sentinel on screen while a page loads does not stack requests.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

type IntersectCallback = Box<dyn Fn() + Send + Sync>;

pub struct IntersectionTrigger {
    enabled: AtomicBool,
    was_visible: AtomicBool,
    on_intersect: IntersectCallback,
}

impl IntersectionTrigger {
    /// # Arguments
    ///
    /// * `enabled` - initial gate state; a disabled trigger swallows events
    /// * `on_intersect` - invoked on each hidden-to-visible edge
    pub fn new(enabled: bool, on_intersect: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            was_visible: AtomicBool::new(false),
            on_intersect: Box::new(on_intersect),
        }
    }

    /// Gates the trigger. Disabling also resets the edge state so that
    /// re-enabling with the sentinel already on screen fires again.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.was_visible.store(false, Ordering::SeqCst);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Feeds one visibility sample. Fires the callback only when the
    /// sentinel goes from hidden to visible while the trigger is enabled;
    /// repeated visible samples are edges already consumed.
    pub fn observe(&self, visible: bool) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        let was = self.was_visible.swap(visible, Ordering::SeqCst);
        if visible && !was {
            (self.on_intersect)();
        }
    }

    /// Consumes a visibility stream until `cancel` fires, mirroring the
    /// observe/unobserve lifecycle of a mounted sentinel.
    pub fn bind(
        self,
        mut visibility: watch::Receiver<bool>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.observe(*visibility.borrow_and_update());
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = visibility.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        self.observe(*visibility.borrow_and_update());
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn counting_trigger(enabled: bool) -> (Arc<AtomicUsize>, IntersectionTrigger) {
        let fires = Arc::new(AtomicUsize::new(0));
        let counter = fires.clone();
        let trigger = IntersectionTrigger::new(enabled, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (fires, trigger)
    }

    #[test]
    fn test_fires_once_per_rising_edge() {
        let (fires, trigger) = counting_trigger(true);

        trigger.observe(true);
        trigger.observe(true);
        trigger.observe(true);
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        trigger.observe(false);
        trigger.observe(true);
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disabled_trigger_swallows_events() {
        let (fires, trigger) = counting_trigger(false);

        trigger.observe(true);
        trigger.observe(false);
        trigger.observe(true);
        assert_eq!(fires.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disable_resets_edge_state() {
        let (fires, trigger) = counting_trigger(true);

        trigger.observe(true);
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        // Page exhausted while the sentinel stays on screen.
        trigger.set_enabled(false);
        trigger.observe(true);
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        // New pages arrive; the still-visible sentinel fires again.
        trigger.set_enabled(true);
        trigger.observe(true);
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bind_consumes_stream_until_cancelled() {
        let (fires, trigger) = counting_trigger(true);
        let (tx, rx) = watch::channel(false);
        let cancel = CancellationToken::new();
        let handle = trigger.bind(rx, cancel.clone());

        // Watch channels coalesce rapid writes, so let the consumer see each
        // edge before sending the next.
        for visible in [true, false, true] {
            tx.send(visible).unwrap();
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }

        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }
}
