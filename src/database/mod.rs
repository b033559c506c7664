// 持久化层：Postgres 实现与进程内实现

pub mod memory;
pub mod repositories;

pub use memory::MemoryVisitStore;
pub use repositories::PgVisitRepository;

/// 嵌入的数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
