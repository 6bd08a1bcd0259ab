//! Test organization:
//! - concurrency.rs: the in-flight bound and exactly-once release under load
