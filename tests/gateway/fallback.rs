//! Invoke totality and fallback substitution.

use super::toggled_registry;
use callgate::BreakerState;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn registered_names_always_get_an_answer() {
    super::init_tracing();
    let (registry, healthy) = toggled_registry("firm");

    // Healthy, unhealthy, and circuit-open phases; invoke never errors.
    for i in 0..20 {
        if i == 5 {
            healthy.store(false, Ordering::SeqCst);
        }
        let res = registry.invoke("firm", format!("key-{i}")).await;
        assert!(res.is_ok(), "invoke must be total for registered names");
    }
}

#[tokio::test]
async fn real_response_while_healthy_fallback_while_not() {
    let (registry, healthy) = toggled_registry("firm");

    let res = registry.invoke("firm", "key-1".to_string()).await.unwrap();
    assert_eq!(res, "record for key-1");

    healthy.store(false, Ordering::SeqCst);
    let res = registry.invoke("firm", "key-2".to_string()).await.unwrap();
    assert_eq!(res, "placeholder for key-2");
}

#[tokio::test]
async fn unknown_names_error_instead_of_guessing() {
    let (registry, _healthy) = toggled_registry("firm");

    let err = registry
        .invoke("company", "key-1".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.name, "company");
}

#[tokio::test]
async fn open_circuit_fallback_is_deterministic_per_request() {
    let (registry, _healthy) = toggled_registry("license");
    registry.force_open("license").unwrap();
    assert_eq!(
        registry.breaker_state("license").unwrap(),
        BreakerState::Open
    );

    // Same request, same fallback value, every time.
    let first = registry
        .invoke("license", "lic-9".to_string())
        .await
        .unwrap();
    for _ in 0..10 {
        let again = registry
            .invoke("license", "lic-9".to_string())
            .await
            .unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(first, "placeholder for lic-9");

    // A different request maps to its own value, still deterministically.
    let other = registry
        .invoke("license", "lic-10".to_string())
        .await
        .unwrap();
    assert_eq!(other, "placeholder for lic-10");
}

#[tokio::test]
async fn fallback_runs_for_every_failure_class() {
    // Underlying failure.
    let (registry, healthy) = toggled_registry("firm");
    healthy.store(false, Ordering::SeqCst);
    assert_eq!(
        registry.invoke("firm", "k".to_string()).await.unwrap(),
        "placeholder for k"
    );

    // Circuit open.
    registry.force_open("firm").unwrap();
    assert_eq!(
        registry.invoke("firm", "k".to_string()).await.unwrap(),
        "placeholder for k"
    );
}

#[tokio::test]
async fn refusals_record_no_outcome() {
    let (registry, _healthy) = toggled_registry("firm");
    registry.force_open("firm").unwrap();

    for _ in 0..5 {
        registry.invoke("firm", "k".to_string()).await.unwrap();
    }
    let metrics = registry.breaker_metrics("firm").unwrap();
    assert_eq!(metrics.recorded_calls, 0);
}
