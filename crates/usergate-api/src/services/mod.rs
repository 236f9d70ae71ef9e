//! 시작 시 실행되는 서비스.

pub mod admin_seed;

pub use admin_seed::{seed_admin, SeedOutcome};
