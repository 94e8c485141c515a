//! Shared network-activity flag.

use std::sync::Mutex;

use heroes_core::LoadingMode;
use heroes_signal::{ReadSignal, Signal, SubscriptionId};

/// Boolean "a request is in flight" signal consumed by loading indicators.
///
/// In [`LoadingMode::Flag`] every `hide()` lowers the flag, even when other
/// requests are still pending. In [`LoadingMode::Counted`] the flag stays up
/// until the number of `hide()` calls catches up with `show()`.
///
/// Subscribers run with no lock held, so they may read the service or call
/// `show`/`hide` themselves.
pub struct LoadingService {
    flag: Signal<bool>,
    mode: LoadingMode,
    activity: Mutex<Activity>,
}

#[derive(Default)]
struct Activity {
    in_flight: usize,
    /// Value the flag should converge to.
    wanted: bool,
}

impl LoadingService {
    pub fn new(mode: LoadingMode) -> Self {
        Self {
            flag: Signal::new(false),
            mode,
            activity: Mutex::new(Activity::default()),
        }
    }

    pub fn mode(&self) -> LoadingMode {
        self.mode
    }

    pub fn show(&self) {
        {
            let mut activity = self.activity.lock().unwrap();
            activity.in_flight += 1;
            activity.wanted = true;
        }
        self.sync_flag();
    }

    pub fn hide(&self) {
        {
            let mut activity = self.activity.lock().unwrap();
            activity.in_flight = activity.in_flight.saturating_sub(1);
            activity.wanted = match self.mode {
                LoadingMode::Flag => false,
                LoadingMode::Counted => activity.in_flight > 0,
            };
        }
        self.sync_flag();
    }

    pub fn loading(&self) -> bool {
        *self.flag.get()
    }

    /// Requests shown but not yet hidden.
    pub fn in_flight(&self) -> usize {
        self.activity.lock().unwrap().in_flight
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.flag.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.flag.unsubscribe(id)
    }

    pub fn signal(&self) -> ReadSignal<bool> {
        self.flag.read_only()
    }

    /// Copy the latest wanted value into the flag. Reading `wanted` inside
    /// the signal's write lock means the last writer always leaves the flag
    /// matching the latest show/hide, whatever order the calls race in.
    fn sync_flag(&self) {
        self.flag.update_if(|flag| {
            let wanted = self.activity.lock().unwrap().wanted;
            let changed = *flag != wanted;
            *flag = wanted;
            changed
        });
    }
}

impl Default for LoadingService {
    fn default() -> Self {
        Self::new(LoadingMode::Flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_idle() {
        let loading = LoadingService::default();
        assert!(!loading.loading());
        assert_eq!(loading.in_flight(), 0);
        assert_eq!(loading.mode(), LoadingMode::Flag);
    }

    #[test]
    fn flag_mode_any_hide_clears() {
        let loading = LoadingService::new(LoadingMode::Flag);
        loading.show();
        loading.show();
        loading.hide();

        assert!(!loading.loading());
        assert_eq!(loading.in_flight(), 1);
    }

    #[test]
    fn counted_mode_waits_for_last_hide() {
        let loading = LoadingService::new(LoadingMode::Counted);
        loading.show();
        loading.show();

        loading.hide();
        assert!(loading.loading());

        loading.hide();
        assert!(!loading.loading());
    }

    #[test]
    fn extra_hide_does_not_underflow() {
        let loading = LoadingService::new(LoadingMode::Counted);
        loading.hide();
        loading.show();
        assert!(loading.loading());
        assert_eq!(loading.in_flight(), 1);
    }

    #[test]
    fn subscribers_only_see_transitions() {
        let loading = LoadingService::new(LoadingMode::Counted);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        loading.subscribe(move |v| s.lock().unwrap().push(*v));

        loading.show();
        loading.show();
        loading.hide();
        loading.hide();

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn subscriber_can_read_in_flight() {
        let loading = Arc::new(LoadingService::new(LoadingMode::Counted));
        let observed = Arc::new(Mutex::new(Vec::new()));
        {
            let loading_c = Arc::clone(&loading);
            let observed = Arc::clone(&observed);
            loading.subscribe(move |_| observed.lock().unwrap().push(loading_c.in_flight()));
        }

        let (tx, rx) = std::sync::mpsc::channel();
        let worker = Arc::clone(&loading);
        std::thread::spawn(move || {
            worker.show();
            worker.hide();
            tx.send(()).unwrap();
        });

        rx.recv_timeout(std::time::Duration::from_secs(2))
            .expect("show/hide blocked while notifying");
        assert_eq!(*observed.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn panicking_subscriber_leaves_service_usable() {
        let loading = LoadingService::new(LoadingMode::Counted);
        loading.subscribe(|v| {
            if *v {
                panic!("indicator failed");
            }
        });

        let shown = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| loading.show()));
        assert!(shown.is_err());

        loading.hide();
        assert_eq!(loading.in_flight(), 0);
        assert!(!loading.loading());
    }
}
