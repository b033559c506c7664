mod handler;

pub use handler::{ping, visit_count};
