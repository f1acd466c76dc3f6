/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub seen: usize,
    pub total: usize,
    pub history_len: usize,
    pub history_index: usize,
    pub is_complete: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

impl QuizProgress {
    /// Questions not yet shown in this run.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.seen)
    }
}
