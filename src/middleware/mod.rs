mod error_handler;
mod request_id;

pub use error_handler::log_errors;
pub use request_id::make_request_span;
