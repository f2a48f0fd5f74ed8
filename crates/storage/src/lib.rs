#![forbid(unsafe_code)]

pub mod repository;
pub mod session_store;
pub mod sqlite;
