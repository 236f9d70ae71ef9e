//! 도메인 모델.
//!
//! - [`user`]: 사용자 레코드 및 역할
//! - [`store`]: 사용자 조회/저장 trait 및 인메모리 구현

pub mod store;
pub mod user;

pub use store::{IdentityStore, InMemoryUserStore, StoreError, StoreResult, UserStore};
pub use user::{Identity, NewIdentity, Profile, Role};
