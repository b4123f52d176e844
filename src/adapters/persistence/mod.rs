//! Persistence adapters. Implement TodoRepoPort.

pub mod sqlite_repo;

pub use sqlite_repo::SqliteTodoRepo;
