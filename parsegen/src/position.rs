/// Keep track of a position within a str, moving forward as tokens are
/// consumed.
#[derive(Debug, Clone, Copy)]
pub struct Position<'a> {
    input: &'a str,
    idx: usize,
}

impl<'a> Position<'a> {
    pub fn new(input: &'a str) -> Self {
        Position { input, idx: 0 }
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn at_end(&self) -> bool {
        self.idx >= self.input.len()
    }

    /// Input not consumed yet.
    pub fn rest(&self) -> &'a str {
        &self.input[self.idx..]
    }

    /// Move forward `n` bytes, returning the skipped text. `n` must end on a
    /// char boundary within the input.
    pub fn advance(&mut self, n: usize) -> &'a str {
        let start = self.idx;
        self.idx += n;
        &self.input[start..self.idx]
    }

    /// Move back to an index previously returned by `idx`.
    pub fn reset(&mut self, idx: usize) {
        self.idx = idx;
    }
}
