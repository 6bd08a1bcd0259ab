//! The concurrency bound under arbitrary interleavings.

use callgate_bulkhead::{Bulkhead, BulkheadConfig};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn bulkhead(max: usize) -> Bulkhead {
    Bulkhead::new(
        BulkheadConfig::builder()
            .name("property-test")
            .max_concurrency(max)
            .build(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// However many tasks contend, the number holding a slot at once never
    /// exceeds the ceiling, and every admission is released.
    #[test]
    fn concurrency_bound_holds(
        max in 1usize..6,
        tasks in 1usize..64,
        hold_micros in prop::collection::vec(0u64..500, 1..64),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async move {
            let bh = bulkhead(max);
            let active = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));

            let mut handles = Vec::new();
            for i in 0..tasks {
                let bh = bh.clone();
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                let hold = Duration::from_micros(hold_micros[i % hold_micros.len()]);
                handles.push(tokio::spawn(async move {
                    if let Some(_permit) = bh.try_admit() {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(hold).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                    }
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }

            assert!(peak.load(Ordering::SeqCst) <= max);
            assert_eq!(bh.in_flight(), 0);
        });
    }

    /// Sequential admit/release cycles always restore every slot.
    #[test]
    fn slots_are_conserved(
        max in 1usize..8,
        cycles in 1usize..32,
        batch in 1usize..16,
    ) {
        let bh = bulkhead(max);
        for _ in 0..cycles {
            let permits: Vec<_> = (0..batch).filter_map(|_| bh.try_admit()).collect();
            prop_assert_eq!(permits.len(), batch.min(max));
            prop_assert_eq!(bh.in_flight(), permits.len());
            drop(permits);
            prop_assert_eq!(bh.in_flight(), 0);
        }
    }
}
