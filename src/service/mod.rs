pub mod visit;

pub use visit::{DEFAULT_CACHE_TTL, VisitService};
