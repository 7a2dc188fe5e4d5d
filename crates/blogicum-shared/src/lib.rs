//! # Blogicum Shared
//!
//! Wire types shared by the server and its clients: form payloads with
//! their validation rules, response bodies, and the error envelope.

pub mod dto;
pub mod forms;
pub mod response;

pub use response::{ErrorResponse, Paged};
