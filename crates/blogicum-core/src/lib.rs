//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! This crate holds the records, the visibility and authorization policy,
//! and the ports the infrastructure implements. It performs no I/O.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod query;

pub use error::{DomainError, RepoError};
pub use pagination::{PAGE_SIZE, Page, PageRequest};
pub use query::{PostQuery, PostScope};
