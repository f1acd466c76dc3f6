/// Source of randomness for choosing the next unseen question.
///
/// Implementations return an index in `0..len`. The state machine only calls
/// `pick` with `len > 0` and clamps out-of-range answers to the last slot.
pub trait Picker {
    fn pick(&mut self, len: usize) -> usize;
}

impl<F> Picker for F
where
    F: FnMut(usize) -> usize,
{
    fn pick(&mut self, len: usize) -> usize {
        self(len)
    }
}

/// Always picks the first candidate. Handy for deterministic tests and demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl Picker for FirstPicker {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}
