// 领域模型与存储抽象

pub mod errors;
pub mod visit;

pub use errors::{CacheError, StoreError, VisitError};
pub use visit::{CacheStore, Visit, VisitStore};
