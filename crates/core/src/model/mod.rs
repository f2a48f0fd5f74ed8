mod ids;
mod question;
mod session;

pub use ids::{ParseIdError, QuestionId, SenderId, SenderIdError};
pub use question::{Question, QuestionDraft, QuestionError, QuestionKind, ValidatedQuestion};
pub use session::{AnswerStep, QuizSession, QuizSessionError};
