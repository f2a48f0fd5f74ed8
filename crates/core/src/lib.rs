#![forbid(unsafe_code)]

pub mod answer;
pub mod format;
pub mod model;
pub mod time;

pub use answer::check_answer;
pub use format::format_question;
pub use time::Clock;
