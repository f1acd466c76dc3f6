//! Quiz navigation: session history, the seen set, and random unseen selection.
//!
//! Everything here is pure. Persisting the seen set and history after a
//! transition is the job of the services layer.

mod picker;
mod progress;
mod session;

pub use picker::{FirstPicker, Picker};
pub use progress::QuizProgress;
pub use session::{QuizIntent, QuizSession, StoredQuiz};
