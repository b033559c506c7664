pub mod visit;

pub use visit::PgVisitRepository;
