//! PostgreSQL repository implementations (sqlx).

pub mod annotation;
pub mod audit;
pub mod file;
pub mod version;

pub use annotation::PgAnnotationRepository;
pub use audit::PgAuditLogRepository;
pub use file::PgFileRepository;
pub use version::PgVersionRepository;
