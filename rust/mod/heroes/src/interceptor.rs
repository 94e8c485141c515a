//! Loading interceptor for outbound HTTP calls.
//!
//! Wraps a request handler so the shared [`LoadingService`] flag is raised
//! before the call and lowered a fixed delay after it settles. The delay is
//! measured from completion, so even an instant response keeps the
//! indicator visible for the full minimum duration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Request};
use tracing::{debug, trace};

use crate::loading::LoadingService;

/// Header that opts a request out of loading tracking.
pub const SKIP_LOADER_HEADER: &str = "skip-loader";

/// True when the request carries a non-empty `skip-loader` header.
///
/// Any non-empty value counts, including `"false"`.
pub fn skips_loader(headers: &HeaderMap) -> bool {
    headers
        .get(SKIP_LOADER_HEADER)
        .is_some_and(|value| !value.is_empty())
}

#[derive(Clone)]
pub struct LoadingInterceptor {
    loading: Arc<LoadingService>,
    min_duration: Duration,
}

impl LoadingInterceptor {
    pub fn new(loading: Arc<LoadingService>, min_duration: Duration) -> Self {
        Self {
            loading,
            min_duration,
        }
    }

    pub fn loading(&self) -> &Arc<LoadingService> {
        &self.loading
    }

    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    /// Run `next(request)` with loading tracking.
    ///
    /// The handler's result, success or failure, is returned unchanged. The
    /// flag is lowered `min_duration` after the handler settles, including
    /// when the returned future is dropped before completion.
    pub async fn intercept<B, T, E, F, Fut>(&self, request: Request<B>, next: F) -> Result<T, E>
    where
        F: FnOnce(Request<B>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if skips_loader(request.headers()) {
            trace!(uri = %request.uri(), "skip-loader set");
            return next(request).await;
        }

        debug!(method = %request.method(), uri = %request.uri(), "request started");
        self.loading.show();
        let _settle = HideAfter {
            loading: Arc::clone(&self.loading),
            delay: self.min_duration,
        };
        next(request).await
    }
}

/// Schedules `hide()` when dropped, i.e. once the wrapped call has settled.
struct HideAfter {
    loading: Arc<LoadingService>,
    delay: Duration,
}

impl Drop for HideAfter {
    fn drop(&mut self) {
        let loading = Arc::clone(&self.loading);
        let delay = self.delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    loading.hide();
                });
            }
            // Without a runtime there is no timer to wait on.
            Err(_) => loading.hide(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroes_core::LoadingMode;
    use std::convert::Infallible;

    const MIN: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn interceptor(mode: LoadingMode) -> LoadingInterceptor {
        LoadingInterceptor::new(Arc::new(LoadingService::new(mode)), MIN)
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    fn with_skip(value: &str) -> Request<()> {
        Request::builder()
            .uri("/test")
            .header(SKIP_LOADER_HEADER, value)
            .body(())
            .unwrap()
    }

    async fn ok(_req: Request<()>) -> Result<u16, Infallible> {
        Ok(200)
    }

    async fn not_found(_req: Request<()>) -> Result<u16, u16> {
        Err(404)
    }

    // ========================================================================
    // Basic flow
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn shows_then_hides_after_min_duration() {
        let i = interceptor(LoadingMode::Flag);

        let status = i.intercept(get("/test"), ok).await.unwrap();
        assert_eq!(status, 200);
        assert!(i.loading().loading());

        tokio::time::sleep(ms(400)).await;
        assert!(i.loading().loading());

        tokio::time::sleep(ms(101)).await;
        assert!(!i.loading().loading());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_passes_through_and_still_hides() {
        let i = interceptor(LoadingMode::Flag);

        for status in [400u16, 401, 403, 404, 500] {
            let result = i
                .intercept(get("/test"), |_req| async move { Err::<(), u16>(status) })
                .await;
            assert_eq!(result, Err(status));
            assert!(i.loading().loading());

            tokio::time::sleep(ms(501)).await;
            assert!(!i.loading().loading());
        }

        assert_eq!(i.intercept(get("/x"), not_found).await, Err(404));
    }

    #[tokio::test(start_paused = true)]
    async fn flag_is_raised_before_handler_runs() {
        let i = interceptor(LoadingMode::Flag);
        let loading = Arc::clone(i.loading());

        let seen = i
            .intercept(get("/test"), |_req| async move {
                Ok::<_, Infallible>(loading.loading())
            })
            .await
            .unwrap();
        assert!(seen);
    }

    #[tokio::test(start_paused = true)]
    async fn all_methods_are_tracked() {
        let i = interceptor(LoadingMode::Flag);
        for method in ["GET", "POST", "PUT", "DELETE", "PATCH"] {
            let req = Request::builder()
                .method(method)
                .uri("/test")
                .body(())
                .unwrap();
            i.intercept(req, ok).await.unwrap();
            assert!(i.loading().loading(), "{method} not tracked");

            tokio::time::sleep(ms(501)).await;
            assert!(!i.loading().loading());
        }
    }

    // ========================================================================
    // Timing
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn fast_response_still_shows_for_min_duration() {
        let i = interceptor(LoadingMode::Flag);
        let task = {
            let i = i.clone();
            tokio::spawn(async move {
                i.intercept(get("/test"), |_req| async {
                    tokio::time::sleep(ms(10)).await;
                    Ok::<_, Infallible>(())
                })
                .await
            })
        };

        tokio::time::sleep(ms(5)).await;
        assert!(i.loading().loading());

        // Resolved at 10ms; flag must hold until 510ms.
        tokio::time::sleep(ms(500)).await;
        assert!(i.loading().loading());

        tokio::time::sleep(ms(6)).await;
        assert!(!i.loading().loading());
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_delay_counts_from_completion() {
        let i = interceptor(LoadingMode::Flag);
        let task = {
            let i = i.clone();
            tokio::spawn(async move {
                i.intercept(get("/slow"), |_req| async {
                    tokio::time::sleep(ms(1000)).await;
                    Ok::<_, Infallible>(())
                })
                .await
            })
        };

        tokio::time::sleep(ms(1001)).await;
        assert!(i.loading().loading());

        tokio::time::sleep(ms(498)).await;
        assert!(i.loading().loading());

        tokio::time::sleep(ms(2)).await;
        assert!(!i.loading().loading());
        task.await.unwrap().unwrap();
    }

    // ========================================================================
    // skip-loader
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn skip_header_never_raises_flag() {
        let i = interceptor(LoadingMode::Flag);
        let raised = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let r = raised.clone();
        i.loading().subscribe(move |v| {
            if *v {
                r.store(true, std::sync::atomic::Ordering::Relaxed);
            }
        });

        i.intercept(with_skip("true"), ok).await.unwrap();
        tokio::time::sleep(MIN).await;

        assert!(!raised.load(std::sync::atomic::Ordering::Relaxed));
        assert_eq!(i.loading().in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_header_any_non_empty_value() {
        let i = interceptor(LoadingMode::Flag);
        i.intercept(with_skip("false"), ok).await.unwrap();
        assert!(!i.loading().loading());

        i.intercept(with_skip(""), ok).await.unwrap();
        assert!(i.loading().loading());
    }

    #[test]
    fn skips_loader_reads_header_map() {
        let mut headers = HeaderMap::new();
        assert!(!skips_loader(&headers));
        headers.insert(SKIP_LOADER_HEADER, "1".parse().unwrap());
        assert!(skips_loader(&headers));
    }

    // ========================================================================
    // Overlapping requests
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn concurrent_requests_show_and_hide_independently() {
        let i = interceptor(LoadingMode::Flag);
        let shows = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let s = shows.clone();
        i.loading().subscribe(move |v| {
            if *v {
                s.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        });

        let (a, b) = tokio::join!(i.intercept(get("/a"), ok), i.intercept(get("/b"), ok));
        a.unwrap();
        b.unwrap();
        assert_eq!(i.loading().in_flight(), 2);

        tokio::time::sleep(ms(501)).await;
        assert!(!i.loading().loading());
        assert_eq!(i.loading().in_flight(), 0);
        assert!(shows.load(std::sync::atomic::Ordering::Relaxed) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flag_mode_clears_while_other_request_pending() {
        let i = interceptor(LoadingMode::Flag);
        let slow = {
            let i = i.clone();
            tokio::spawn(async move {
                i.intercept(get("/slow"), |_req| async {
                    tokio::time::sleep(ms(2000)).await;
                    Ok::<_, Infallible>(())
                })
                .await
            })
        };
        tokio::time::sleep(ms(1)).await;
        i.intercept(get("/fast"), ok).await.unwrap();

        tokio::time::sleep(ms(501)).await;
        assert!(!i.loading().loading(), "boolean flag is not reference-counted");
        assert_eq!(i.loading().in_flight(), 1);
        slow.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn counted_mode_holds_until_last_request_settles() {
        let i = interceptor(LoadingMode::Counted);
        let slow = {
            let i = i.clone();
            tokio::spawn(async move {
                i.intercept(get("/slow"), |_req| async {
                    tokio::time::sleep(ms(2000)).await;
                    Ok::<_, Infallible>(())
                })
                .await
            })
        };
        tokio::time::sleep(ms(1)).await;
        i.intercept(get("/fast"), ok).await.unwrap();

        tokio::time::sleep(ms(501)).await;
        assert!(i.loading().loading());

        slow.await.unwrap().unwrap();
        tokio::time::sleep(ms(501)).await;
        assert!(!i.loading().loading());
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn dropped_request_still_hides() {
        let i = interceptor(LoadingMode::Flag);
        let pending = i.intercept(get("/never"), |_req| async {
            std::future::pending::<Result<(), Infallible>>().await
        });

        let timed_out = tokio::time::timeout(ms(100), pending).await;
        assert!(timed_out.is_err());
        assert!(i.loading().loading());

        tokio::time::sleep(ms(501)).await;
        assert!(!i.loading().loading());
    }

    #[test]
    fn without_runtime_hides_immediately() {
        let loading = Arc::new(LoadingService::default());
        loading.show();
        drop(HideAfter {
            loading: Arc::clone(&loading),
            delay: MIN,
        });
        assert!(!loading.loading());
    }
}
