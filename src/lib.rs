use config::Config;
use service::VisitService;

pub mod cache;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod service;
pub mod utils;

pub use router::build_router;

#[derive(Clone)]
pub struct AppState {
    pub visits: VisitService,
    pub config: Config,
}
