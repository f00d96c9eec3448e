//! Memo store bucket-size histogram, printed after a search to judge how
//! evenly keys spread over the buckets.
use std::fmt;

/// Widest bar drawn by the report.
const BAR_WIDTH_LIMIT: usize = 120;

/// Default cut-off above which bucket sizes are reported together.
pub const SAMPLING_THRESHOLD: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    /// Records across all buckets.
    pub total: usize,
    /// Largest bucket.
    pub max: usize,
    /// Smallest bucket.
    pub min: usize,
    pub sampling_threshold: usize,
    // counts[s] is the number of buckets holding s records; the final slot
    // collects every bucket above the threshold.
    counts: Vec<usize>,
}

impl Distribution {
    pub fn from_sizes(sizes: &[usize], sampling_threshold: usize) -> Self {
        let mut counts = vec![0; sampling_threshold + 2];
        for &size in sizes {
            counts[size.min(sampling_threshold + 1)] += 1;
        }
        Distribution {
            total: sizes.iter().sum(),
            max: sizes.iter().copied().max().unwrap_or(0),
            min: sizes.iter().copied().min().unwrap_or(0),
            sampling_threshold,
            counts,
        }
    }

    /// Number of buckets holding exactly `size` records, for sizes up to the
    /// sampling threshold.
    pub fn buckets_of_size(&self, size: usize) -> usize {
        if size > self.sampling_threshold {
            0
        } else {
            self.counts[size]
        }
    }

    /// Number of buckets larger than the sampling threshold.
    pub fn overflow(&self) -> usize {
        self.counts[self.sampling_threshold + 1]
    }

    fn shown_sizes(&self) -> std::ops::RangeInclusive<usize> {
        self.min.min(self.sampling_threshold)..=self.max.min(self.sampling_threshold)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[ Bucket Size Distribution ]  \tTotal : {}  Max : {}  Min : {}",
            self.total, self.max, self.min
        )?;

        let tallest = self
            .shown_sizes()
            .map(|size| self.counts[size])
            .max()
            .unwrap_or(0)
            .max(1);
        for size in self.shown_sizes() {
            let count = self.counts[size];
            let bar = "|".repeat(count * BAR_WIDTH_LIMIT / tallest);
            writeln!(f, "{:>4} : {} {}", size, bar, count)?;
        }
        write!(f, " >{} :  {}", self.sampling_threshold, self.overflow())
    }
}
