use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{ListAccessor, ListError, ScrollTier};

/// Tuning for the scroll loop.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPolicy {
    /// Settle time between a gesture and the next count sample.
    pub pause: Duration,
    /// Consecutive no-growth samples before the list is declared exhausted.
    pub idle_limit: u32,
    /// Hard cap on scroll attempts per drive call.
    pub max_scrolls: u32,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(1500),
            idle_limit: 12,
            max_scrolls: 5000,
        }
    }
}

/// Why a drive call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Rendered count reached the requested target.
    TargetReached,
    /// `idle_limit` consecutive samples without growth.
    IdleLimit,
    /// `max_scrolls` attempts spent.
    BudgetExhausted,
}

/// Observable position in the scroll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No gesture issued yet.
    Idle,
    /// A gesture is in flight, waiting for the settle pause.
    Scrolling,
    /// The last sample showed more items than the one before.
    Growing,
    /// The last sample showed no growth.
    Stalled { idle_rounds: u32 },
    Done(StopReason),
}

/// Final sample of one drive call.
#[derive(Debug, Clone, Copy)]
pub struct DriveOutcome {
    pub rendered: usize,
    pub attempts: u32,
    pub reason: StopReason,
}

/// Grows the rendered set of a virtualized list by polling, not by counting
/// scrolls: render latency varies, so the only trustworthy stop signals are
/// the sampled count itself and a run of samples with no growth.
pub struct ScrollDriver {
    policy: ScrollPolicy,
    state: DriverState,
}

impl ScrollDriver {
    pub fn new(policy: ScrollPolicy) -> Self {
        Self {
            policy,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Scroll until at least `target` items are rendered, the idle limit
    /// trips, or the attempt budget runs out. Never errors on a list that
    /// merely stops growing; only a failed count probe is fatal.
    pub async fn drive_until<A>(
        &mut self,
        list: &A,
        target: usize,
    ) -> Result<DriveOutcome, ListError>
    where
        A: ListAccessor + ?Sized,
    {
        self.state = DriverState::Idle;
        let mut rendered = list.rendered_count().await?;
        if rendered >= target {
            return Ok(self.finish(rendered, 0, StopReason::TargetReached));
        }

        let mut idle: u32 = 0;
        let mut attempts: u32 = 0;
        loop {
            if attempts >= self.policy.max_scrolls {
                return Ok(self.finish(rendered, attempts, StopReason::BudgetExhausted));
            }
            attempts += 1;
            self.state = DriverState::Scrolling;

            self.scroll_once(list).await;
            if rendered > 0 {
                // Nudging the tail card into the viewport prods virtualizers
                // that ignore container-level scroll offsets.
                if let Err(err) = list.bring_into_view(rendered - 1).await {
                    trace!(index = rendered - 1, error = %err, "tail nudge failed");
                }
            }
            tokio::time::sleep(self.policy.pause).await;

            let sampled = list.rendered_count().await?;
            if sampled > rendered {
                rendered = sampled;
                idle = 0;
                self.state = DriverState::Growing;
            } else {
                idle += 1;
                self.state = DriverState::Stalled { idle_rounds: idle };
            }
            debug!(attempts, rendered, target, "scroll progress");

            if rendered >= target {
                return Ok(self.finish(rendered, attempts, StopReason::TargetReached));
            }
            if idle >= self.policy.idle_limit {
                return Ok(self.finish(rendered, attempts, StopReason::IdleLimit));
            }
        }
    }

    /// One gesture: container scroll first, keyboard paging if that tier is
    /// unusable. A round where both tiers fail still counts as an attempt;
    /// the idle limit ends the loop if the situation persists.
    async fn scroll_once<A>(&self, list: &A)
    where
        A: ListAccessor + ?Sized,
    {
        if let Err(primary) = list.scroll_forward(ScrollTier::Container).await {
            debug!(error = %primary, "container scroll failed, paging via keyboard");
            if let Err(fallback) = list.scroll_forward(ScrollTier::Keyboard).await {
                warn!(error = %fallback, "both scroll tiers failed this round");
            }
        }
    }

    fn finish(&mut self, rendered: usize, attempts: u32, reason: StopReason) -> DriveOutcome {
        self.state = DriverState::Done(reason);
        debug!(?reason, rendered, attempts, "drive finished");
        DriveOutcome {
            rendered,
            attempts,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{ItemHandle, ListAccessor, ListError, ScrollTier};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted list: reveals `step` items every `growth_every`-th successful
    /// gesture, up to `cap`.
    struct ScriptedList {
        cap: usize,
        step: usize,
        growth_every: u32,
        rendered: Mutex<usize>,
        gestures: AtomicU32,
        fail_container: bool,
        fail_keyboard: bool,
    }

    impl ScriptedList {
        fn frozen_at(count: usize) -> Self {
            Self {
                cap: count,
                step: 0,
                growth_every: 1,
                rendered: Mutex::new(count),
                gestures: AtomicU32::new(0),
                fail_container: false,
                fail_keyboard: false,
            }
        }

        fn growing(step: usize, cap: usize) -> Self {
            Self {
                cap,
                step,
                growth_every: 1,
                rendered: Mutex::new(0),
                gestures: AtomicU32::new(0),
                fail_container: false,
                fail_keyboard: false,
            }
        }
    }

    #[async_trait]
    impl ListAccessor for ScriptedList {
        async fn rendered_count(&self) -> Result<usize, ListError> {
            Ok(*self.rendered.lock().unwrap())
        }

        async fn item_at(&self, index: usize) -> Result<ItemHandle, ListError> {
            Err(ListError::ItemUnavailable { index })
        }

        async fn scroll_forward(&self, tier: ScrollTier) -> Result<(), ListError> {
            match tier {
                ScrollTier::Container if self.fail_container => {
                    return Err(ListError::ScrollFailed("no container".into()))
                }
                ScrollTier::Keyboard if self.fail_keyboard => {
                    return Err(ListError::ScrollFailed("no focus target".into()))
                }
                _ => {}
            }
            let count = self.gestures.fetch_add(1, Ordering::SeqCst) + 1;
            if count % self.growth_every == 0 {
                let mut rendered = self.rendered.lock().unwrap();
                *rendered = (*rendered + self.step).min(self.cap);
            }
            Ok(())
        }

        async fn bring_into_view(&self, _index: usize) -> Result<(), ListError> {
            Ok(())
        }
    }

    struct BrokenCount;

    #[async_trait]
    impl ListAccessor for BrokenCount {
        async fn rendered_count(&self) -> Result<usize, ListError> {
            Err(ListError::QueryFailed("dialog gone".into()))
        }

        async fn item_at(&self, index: usize) -> Result<ItemHandle, ListError> {
            Err(ListError::ItemUnavailable { index })
        }

        async fn scroll_forward(&self, _tier: ScrollTier) -> Result<(), ListError> {
            Ok(())
        }

        async fn bring_into_view(&self, _index: usize) -> Result<(), ListError> {
            Ok(())
        }
    }

    fn quick(idle_limit: u32, max_scrolls: u32) -> ScrollPolicy {
        ScrollPolicy {
            pause: Duration::from_millis(1),
            idle_limit,
            max_scrolls,
        }
    }

    #[test]
    fn met_target_issues_no_gestures() {
        tokio_test::block_on(async {
            let list = ScriptedList::frozen_at(30);
            let mut driver = ScrollDriver::new(quick(12, 5000));

            let outcome = driver.drive_until(&list, 20).await.unwrap();

            assert_eq!(outcome.reason, StopReason::TargetReached);
            assert_eq!(outcome.attempts, 0);
            assert_eq!(outcome.rendered, 30);
            assert_eq!(list.gestures.load(Ordering::SeqCst), 0);
            assert_eq!(driver.state(), DriverState::Done(StopReason::TargetReached));
        });
    }

    #[test]
    fn frozen_list_stops_after_exactly_the_idle_limit() {
        tokio_test::block_on(async {
            let list = ScriptedList::frozen_at(8);
            let mut driver = ScrollDriver::new(quick(5, 5000));

            let outcome = driver.drive_until(&list, 50).await.unwrap();

            assert_eq!(outcome.reason, StopReason::IdleLimit);
            assert_eq!(outcome.attempts, 5);
            assert_eq!(outcome.rendered, 8);
        });
    }

    #[test]
    fn growth_resets_the_idle_counter() {
        tokio_test::block_on(async {
            // Growth lands on every third gesture; with an idle limit of 3 the
            // loop would die before the first growth if resets did not happen.
            let list = ScriptedList {
                cap: 3,
                step: 1,
                growth_every: 3,
                rendered: Mutex::new(0),
                gestures: AtomicU32::new(0),
                fail_container: false,
                fail_keyboard: false,
            };
            let mut driver = ScrollDriver::new(quick(3, 5000));

            let outcome = driver.drive_until(&list, 99).await.unwrap();

            assert_eq!(outcome.reason, StopReason::IdleLimit);
            assert_eq!(outcome.rendered, 3);
            assert_eq!(outcome.attempts, 12);
        });
    }

    #[test]
    fn attempt_budget_caps_the_loop() {
        tokio_test::block_on(async {
            let list = ScriptedList::growing(1, usize::MAX);
            let mut driver = ScrollDriver::new(quick(50, 7));

            let outcome = driver.drive_until(&list, 1000).await.unwrap();

            assert_eq!(outcome.reason, StopReason::BudgetExhausted);
            assert_eq!(outcome.attempts, 7);
            assert_eq!(outcome.rendered, 7);
        });
    }

    #[test]
    fn container_failure_falls_back_to_keyboard_paging() {
        tokio_test::block_on(async {
            let list = ScriptedList {
                cap: 10,
                step: 5,
                growth_every: 1,
                rendered: Mutex::new(0),
                gestures: AtomicU32::new(0),
                fail_container: true,
                fail_keyboard: false,
            };
            let mut driver = ScrollDriver::new(quick(12, 5000));

            let outcome = driver.drive_until(&list, 10).await.unwrap();

            assert_eq!(outcome.reason, StopReason::TargetReached);
            assert_eq!(outcome.rendered, 10);
            assert!(list.gestures.load(Ordering::SeqCst) > 0);
        });
    }

    #[test]
    fn failure_of_both_tiers_idles_out_without_error() {
        tokio_test::block_on(async {
            let list = ScriptedList {
                cap: 4,
                step: 1,
                growth_every: 1,
                rendered: Mutex::new(4),
                gestures: AtomicU32::new(0),
                fail_container: true,
                fail_keyboard: true,
            };
            let mut driver = ScrollDriver::new(quick(4, 5000));

            let outcome = driver.drive_until(&list, 10).await.unwrap();

            assert_eq!(outcome.reason, StopReason::IdleLimit);
            assert_eq!(outcome.attempts, 4);
            assert_eq!(list.gestures.load(Ordering::SeqCst), 0);
        });
    }

    #[test]
    fn count_probe_failure_is_fatal() {
        tokio_test::block_on(async {
            let mut driver = ScrollDriver::new(quick(12, 5000));
            let err = driver.drive_until(&BrokenCount, 10).await.unwrap_err();
            assert!(matches!(err, ListError::QueryFailed(_)));
        });
    }
}
