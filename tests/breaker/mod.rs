//! Test organization:
//! - thresholds.rs: window feeding, ratio evaluation, trip timing
//! - half_open.rs: trial admission accounting and recovery transitions

mod thresholds;
