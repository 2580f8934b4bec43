/// Fixed-length series of real samples read at the macro-update cadence.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSeries {
    values: Vec<f64>,
    cursor: usize,
}

impl SampleSeries {
    /// Panics on an empty series; callers validate scenario data first.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sample series must not be empty");
        Self { values, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> f64 {
        self.values[self.cursor]
    }

    pub fn at(&self, idx: usize) -> f64 {
        self.values[idx % self.values.len()]
    }

    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.values.len();
    }
}
