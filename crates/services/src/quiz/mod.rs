mod persistence;
mod picker;
mod service;
mod view;

pub use persistence::{HISTORY_KEY, QuizPersistence, SEEN_QUESTIONS_KEY};
pub use picker::RandomPicker;
pub use service::QuizService;
pub use view::{HistoryEntry, QuizSnapshot};
