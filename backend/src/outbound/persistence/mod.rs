//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters: repository implementations only translate between Diesel
//! row structs and domain types, with connections managed via `bb8` pools
//! through `diesel-async`. Row structs (`models.rs`) and the schema
//! definitions (`schema.rs`) are internal implementation details, never
//! exposed to the domain layer. The multi-table writes the domain's
//! atomicity contract names (enrollment plus stats, enrollment plus receipt)
//! run inside single transactions here.

mod diesel_course_catalog;
mod diesel_enrollment_repository;
mod models;
mod pool;
mod schema;

pub use diesel_course_catalog::DieselCourseCatalog;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
