use log::info;

/// Histogram of path lengths, collected by
/// [`Llrb::validate`](crate::Llrb::validate).
///
/// Each sample is the number of links walked from the root down to an
/// empty child link. For a balanced tree the spread between `min()` and
/// `max()` stays within a factor of two.
#[derive(Clone, Debug, Default)]
pub struct Depth {
    count: usize,
    sum: usize,
    shortest: Option<usize>,
    longest: usize,
    histogram: Vec<u64>, // index is the depth, item is the path count
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Depth::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if self.histogram.len() <= depth {
            self.histogram.resize(depth + 1, 0);
        }
        self.histogram[depth] += 1;
        self.count += 1;
        self.sum += depth;
        self.shortest = Some(self.shortest.map_or(depth, |d| d.min(depth)));
        self.longest = self.longest.max(depth);
    }

    /// Number of root-to-leaf paths seen.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Shortest path, zero when nothing was sampled.
    pub fn min(&self) -> usize {
        self.shortest.unwrap_or(0)
    }

    /// Longest path.
    pub fn max(&self) -> usize {
        self.longest
    }

    /// Average path length, rounded down.
    pub fn mean(&self) -> usize {
        self.sum.checked_div(self.count).unwrap_or(0)
    }

    /// Tail of the distribution as `(percentile, depth)` pairs. A pair is
    /// reported for every depth at which the cumulative share of paths
    /// first reaches 90 percent or moves past the last reported
    /// percentile.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut seen = 0_u64;
        let mut floor = 90_u8;
        let mut out = vec![];
        for (depth, n) in self.histogram.iter().enumerate() {
            if *n == 0 {
                continue;
            }
            seen += n;
            let perc = (seen * 100 / self.count as u64) as u8;
            if perc >= floor {
                out.push((perc, depth));
                floor = perc;
            }
        }
        out
    }

    /// Log a summary line followed by the tail percentiles.
    pub fn pretty_print(&self, prefix: &str) {
        info!(
            "{}depth (min, avg, max): {:?}",
            prefix,
            (self.min(), self.mean(), self.max())
        );
        self.percentiles()
            .into_iter()
            .filter(|(_, depth)| *depth > 0)
            .for_each(|(perc, depth)| info!("{}  {} percentile = {}", prefix, perc, depth));
    }

    /// Render as a single line of JSON-like text.
    pub fn json(&self) -> String {
        let tail = self
            .percentiles()
            .iter()
            .map(|(perc, depth)| format!("{}: {}", perc, depth))
            .collect::<Vec<String>>()
            .join(", ");
        format!(
            "{{ min: {}, mean: {}, max: {}, percentiles: {} }}",
            self.min(),
            self.mean(),
            self.max(),
            tail
        )
    }
}

#[cfg(test)]
#[path = "depth_test.rs"]
mod depth_test;
