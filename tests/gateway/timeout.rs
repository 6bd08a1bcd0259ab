//! Timeout enforcement: fallback at the deadline, Timeout recorded, slot
//! released the moment the call is abandoned.

use super::{slow_registry, small_window_config};
use callgate::{BreakerState, DependencyConfig, FallbackProvider, Registry};
use callgate_faultinject::FaultInjectLayer;
use std::convert::Infallible;
use std::time::Duration;
use tower::{service_fn, Layer};

#[tokio::test(start_paused = true)]
async fn slow_call_is_cut_off_at_the_deadline() {
    // 500ms dependency behind a 200ms timeout.
    let registry = slow_registry("license", Duration::from_millis(500));

    let started = tokio::time::Instant::now();
    let res = registry
        .invoke("license", "lic-1".to_string())
        .await
        .unwrap();

    assert_eq!(res, "placeholder for lic-1");
    assert_eq!(started.elapsed(), Duration::from_millis(200));

    let metrics = registry.breaker_metrics("license").unwrap();
    assert_eq!(metrics.recorded_calls, 1);
    assert_eq!(metrics.failure_count, 1, "timeout recorded as a failure");
}

#[tokio::test(start_paused = true)]
async fn slot_frees_when_the_call_is_abandoned() {
    let registry = slow_registry("license", Duration::from_millis(500));

    registry
        .invoke("license", "lic-1".to_string())
        .await
        .unwrap();

    // Immediately after the timeout fires, not 300ms later when the slow
    // future would have finished.
    assert_eq!(registry.in_flight("license").unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_invoke_frees_the_slot_and_records_one_timeout() {
    // A dependency that never answers, behind a deadline long enough that
    // the caller dropping the invoke is what ends the call, not the timeout.
    let registry: Registry<String, String, Infallible> = Registry::builder()
        .dependency(
            DependencyConfig::builder("license")
                .max_concurrency(2)
                .call_timeout(Duration::from_secs(60))
                .failure_threshold(0.5)
                .min_samples(4)
                .window_size(4)
                .open_wait(Duration::from_millis(100))
                .half_open_trial_permits(1)
                .build(),
            service_fn(|_key: String| std::future::pending::<Result<String, Infallible>>()),
            FallbackProvider::from_fn(|key: &String| format!("placeholder for {key}")),
        )
        .build()
        .unwrap();

    let task = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.invoke("license", "lic-1".to_string()).await })
    };
    while registry.in_flight("license").unwrap() == 0 {
        tokio::task::yield_now().await;
    }

    task.abort();
    let _ = task.await;

    assert_eq!(registry.in_flight("license").unwrap(), 0, "slot released");
    let metrics = registry.breaker_metrics("license").unwrap();
    assert_eq!(metrics.recorded_calls, 1, "exactly one outcome recorded");
    assert_eq!(metrics.failure_count, 1, "cancellation recorded as a timeout");
}

#[tokio::test(start_paused = true)]
async fn repeated_timeouts_trip_the_circuit() {
    let registry = slow_registry("license", Duration::from_millis(500));

    for i in 0..4 {
        registry
            .invoke("license", format!("lic-{i}"))
            .await
            .unwrap();
    }
    assert_eq!(
        registry.breaker_state("license").unwrap(),
        BreakerState::Open
    );

    // Open circuit answers from the fallback without burning 200ms.
    let started = tokio::time::Instant::now();
    let res = registry
        .invoke("license", "lic-9".to_string())
        .await
        .unwrap();
    assert_eq!(res, "placeholder for lic-9");
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn delayed_trial_reopens_the_circuit() {
    // Injected delays push every call past the timeout, the trip included;
    // a trial that is itself delayed sends the circuit straight back open.
    let delay_all = FaultInjectLayer::builder()
        .name("license")
        .rate(1.0)
        .delay(Duration::from_millis(500))
        .seed(7)
        .build();
    let flaky =
        delay_all.layer(service_fn(|key: String| async move {
            Ok::<_, Infallible>(format!("record for {key}"))
        }));

    let registry: Registry<String, String, Infallible> = Registry::builder()
        .dependency(
            small_window_config("license"),
            flaky,
            FallbackProvider::from_fn(|key: &String| format!("placeholder for {key}")),
        )
        .build()
        .unwrap();

    for i in 0..4 {
        let res = registry
            .invoke("license", format!("lic-{i}"))
            .await
            .unwrap();
        assert_eq!(res, format!("placeholder for lic-{i}"));
    }
    assert_eq!(
        registry.breaker_state("license").unwrap(),
        BreakerState::Open
    );

    // Past the open wait the next call is the half-open trial. It is still
    // delayed (rate 1.0), so it fails and reopens the circuit.
    tokio::time::sleep(Duration::from_millis(150)).await;
    registry
        .invoke("license", "trial-1".to_string())
        .await
        .unwrap();
    assert_eq!(
        registry.breaker_state("license").unwrap(),
        BreakerState::Open
    );
}

// Real time, not the paused clock: the breaker measures its open wait on
// `std::time::Instant`, which a paused tokio clock does not advance.
#[tokio::test]
async fn successful_trial_closes_after_timeouts() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let slow = Arc::new(AtomicBool::new(true));
    let slow_clone = Arc::clone(&slow);

    let registry: Registry<String, String, Infallible> = Registry::builder()
        .dependency(
            small_window_config("license"),
            service_fn(move |key: String| {
                let slow = Arc::clone(&slow_clone);
                async move {
                    if slow.load(Ordering::SeqCst) {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                    Ok(format!("record for {key}"))
                }
            }),
            FallbackProvider::from_fn(|key: &String| format!("placeholder for {key}")),
        )
        .build()
        .unwrap();

    for i in 0..4 {
        registry
            .invoke("license", format!("lic-{i}"))
            .await
            .unwrap();
    }
    assert_eq!(
        registry.breaker_state("license").unwrap(),
        BreakerState::Open
    );

    // Dependency recovers; wait out the open period and probe.
    slow.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let res = registry
        .invoke("license", "trial".to_string())
        .await
        .unwrap();
    assert_eq!(res, "record for trial", "trial call reaches the dependency");
    assert_eq!(
        registry.breaker_state("license").unwrap(),
        BreakerState::Closed
    );
    assert_eq!(
        registry.breaker_metrics("license").unwrap().recorded_calls,
        0,
        "window cleared on close"
    );
}
