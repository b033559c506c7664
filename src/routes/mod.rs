pub mod health;
pub mod visit;

pub use health::health;
