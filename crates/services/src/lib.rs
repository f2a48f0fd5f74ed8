#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
mod locks;
pub mod question_service;

pub use quiz_core::Clock;

pub use engine::SessionEngine;
pub use error::{EngineError, QuestionServiceError};
pub use question_service::QuestionService;
