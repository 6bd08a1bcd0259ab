//! End-to-end demo: a firm service looking up licenses in a flaky
//! license-directory dependency.
//!
//! The license service is decorated with a fault injector that delays one
//! call in three by five seconds, well past the gateway's one-second timeout.
//! Watch the breaker trip once enough timeouts accumulate, the fallback
//! placeholder records take over, and the circuit probe its way back to
//! Closed after the open wait.
//!
//! Run with:
//! ```text
//! cargo run -p callgate --example license_lookup
//! ```

use callgate::{BreakerState, DependencyConfig, FallbackProvider, Registry};
use callgate_faultinject::FaultInjectLayer;
use std::convert::Infallible;
use std::time::Duration;
use tower::{service_fn, Layer};

#[derive(Debug, Clone)]
struct License {
    key: String,
    holder: String,
}

const LICENSE_SERVICE: &str = "license-service";

#[tokio::main]
async fn main() {
    // The "remote" license directory: instant answers when healthy.
    let license_directory = service_fn(|key: String| async move {
        Ok::<_, Infallible>(License {
            holder: format!("holder of {key}"),
            key,
        })
    });

    // One call in three hangs for five seconds.
    let flaky_directory = FaultInjectLayer::builder()
        .name(LICENSE_SERVICE)
        .rate(1.0 / 3.0)
        .delay(Duration::from_secs(5))
        .seed(20240917)
        .build()
        .layer(license_directory);

    let registry: Registry<String, License, Infallible> = Registry::builder()
        .dependency(
            DependencyConfig::builder(LICENSE_SERVICE)
                .max_concurrency(4)
                .call_timeout(Duration::from_secs(1))
                .failure_threshold(0.5)
                .min_samples(4)
                .window_size(4)
                .open_wait(Duration::from_secs(5))
                .on_fallback_served(|reason| println!("    -> fallback served ({reason})"))
                .build(),
            flaky_directory,
            FallbackProvider::from_fn(|key: &String| License {
                key: key.clone(),
                holder: "license service unavailable".to_string(),
            }),
        )
        .build()
        .expect("demo configuration is valid");

    println!("== flaky phase: 1-in-3 calls delayed 5s behind a 1s timeout ==");
    let mut announced_open = false;
    for i in 0..12 {
        let license = registry
            .invoke(LICENSE_SERVICE, format!("lic-{i}"))
            .await
            .expect("registered dependency");
        let state = registry.breaker_state(LICENSE_SERVICE).expect("registered");
        println!(
            "{:8}: {:28} [breaker: {:?}]",
            license.key, license.holder, state
        );

        if state == BreakerState::Open && !announced_open {
            announced_open = true;
            println!("\ncircuit open; remaining lookups answer from the fallback:");
        }
    }

    let metrics = registry.breaker_metrics(LICENSE_SERVICE).expect("registered");
    println!(
        "\nwindow after flaky phase: {} recorded, {} failures (ratio {:.2})",
        metrics.recorded_calls, metrics.failure_count, metrics.failure_ratio
    );

    println!("\n== waiting out the open period (5s) ==");
    tokio::time::sleep(Duration::from_millis(5100)).await;

    // The next call is the half-open trial. Injection is still active, so a
    // trial can be unlucky and reopen the circuit; two calls in three pass.
    println!("== recovery phase ==");
    for i in 0..6 {
        let license = registry
            .invoke(LICENSE_SERVICE, format!("lic-{i}"))
            .await
            .expect("registered dependency");
        println!(
            "{:8}: {:28} [breaker: {:?}]",
            license.key,
            license.holder,
            registry.breaker_state(LICENSE_SERVICE).expect("registered")
        );
    }
}
