mod ids;
mod question;

pub use ids::{CompanyId, ParseIdError, QuestionId};
pub use question::{Company, Difficulty, Question, QuestionError};
