//! Worker lanes and their partition into stem clones.
//!
//! A stem task is walked by a fixed pool of worker lanes. Lanes are grouped
//! into contiguous clones; a split hands part of every clone's lanes to new
//! clones. Each lane knows its index inside its clone and the clone size,
//! and clone ids are an exclusive prefix count of the lanes that close a clone.

/// Largest worker pool per task.
pub const MAX_WORKERS: u32 = 32;

/// Position of one lane in the current partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lane {
    /// Index of the lane inside its clone.
    pub index: u32,
    /// Number of lanes in the clone.
    pub count: u32,
    /// Clone id, stable and increasing with the lane order.
    pub clone: u32,
}

impl Lane {
    /// The lane that speaks for its clone (writes poses, requests segments).
    pub fn is_leader(&self) -> bool {
        self.index == 0
    }

    fn closes_clone(&self) -> bool {
        self.index + 1 == self.count
    }
}

/// Exclusive prefix count of set flags.
///
/// # Examples
/// ```
/// use sylvan::generation::clones::exclusive_prefix_count;
///
/// assert_eq!(exclusive_prefix_count(&[true, false, true, true]), vec![0, 1, 1, 2]);
/// ```
pub fn exclusive_prefix_count(flags: &[bool]) -> Vec<u32> {
    flags
        .iter()
        .scan(0u32, |count, &flag| {
            let before = *count;
            *count += flag as u32;
            Some(before)
        })
        .collect()
}

/// Lane partition of one task's worker pool.
#[derive(Clone, Debug)]
pub struct ClonePartition {
    lanes: Vec<Lane>,
}

impl ClonePartition {
    /// All `workers` lanes walking a single clone.
    pub fn new(workers: u32) -> Self {
        let workers = workers.clamp(1, MAX_WORKERS);
        Self {
            lanes: (0..workers)
                .map(|index| Lane {
                    index,
                    count: workers,
                    clone: 0,
                })
                .collect(),
        }
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn workers(&self) -> u32 {
        self.lanes.len() as u32
    }

    /// Number of clones currently alive.
    pub fn clone_count(&self) -> u32 {
        self.lanes.iter().filter(|lane| lane.closes_clone()).count() as u32
    }

    /// Split every clone into `branches` parts.
    ///
    /// Lanes that do not divide evenly stay with the original part. Clones
    /// with fewer lanes than `branches` produce as many parts as they have
    /// lanes. Returns, per lane, whether it stayed on the original branch.
    pub fn split(&mut self, branches: u32) -> Vec<bool> {
        let branches = branches.max(1);
        let mut original = Vec::with_capacity(self.lanes.len());

        for lane in &mut self.lanes {
            let per_split = (lane.count / branches).max(1);
            let surplus = lane.count.saturating_sub(branches * per_split);
            let kept = per_split + surplus;

            let is_original = lane.index < kept;
            if is_original {
                lane.count = kept;
            } else {
                lane.index = (lane.index - kept) % per_split;
                lane.count = per_split;
            }
            original.push(is_original);
        }

        let closing: Vec<bool> = self.lanes.iter().map(Lane::closes_clone).collect();
        for (lane, clone) in self.lanes.iter_mut().zip(exclusive_prefix_count(&closing)) {
            lane.clone = clone;
        }
        original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clones(partition: &ClonePartition) -> Vec<u32> {
        partition.lanes().iter().map(|lane| lane.clone).collect()
    }

    #[test]
    fn test_single_clone_initially() {
        let partition = ClonePartition::new(32);
        assert_eq!(partition.clone_count(), 1);
        assert!(partition.lanes().iter().all(|lane| lane.clone == 0 && lane.count == 32));
        assert_eq!(ClonePartition::new(100).workers(), MAX_WORKERS);
        assert_eq!(ClonePartition::new(0).workers(), 1);
    }

    #[test]
    fn test_even_split() {
        let mut partition = ClonePartition::new(32);
        let original = partition.split(2);

        assert!(original[..16].iter().all(|&o| o));
        assert!(original[16..].iter().all(|&o| !o));
        assert_eq!(partition.clone_count(), 2);
        let ids = clones(&partition);
        assert!(ids[..16].iter().all(|&c| c == 0));
        assert!(ids[16..].iter().all(|&c| c == 1));
        assert_eq!(partition.lanes()[16].index, 0);
        assert_eq!(partition.lanes()[31].index, 15);
    }

    #[test]
    fn test_surplus_stays_with_original() {
        let mut partition = ClonePartition::new(32);
        partition.split(2);
        partition.split(3);

        // Each 16-lane clone keeps 6 lanes and hands out two clones of 5
        assert_eq!(partition.clone_count(), 6);
        let ids = clones(&partition);
        let expected: Vec<u32> = [(0, 6), (1, 5), (2, 5), (3, 6), (4, 5), (5, 5)]
            .iter()
            .flat_map(|&(id, n)| std::iter::repeat(id).take(n))
            .collect();
        assert_eq!(ids, expected);
        let leaders = partition.lanes().iter().filter(|lane| lane.is_leader()).count();
        assert_eq!(leaders, 6);
    }

    #[test]
    fn test_more_branches_than_lanes() {
        let mut partition = ClonePartition::new(4);
        let original = partition.split(8);
        assert_eq!(original, vec![true, false, false, false]);
        assert_eq!(partition.clone_count(), 4);
        assert_eq!(clones(&partition), vec![0, 1, 2, 3]);

        // Single-lane clones cannot split further
        let original = partition.split(3);
        assert!(original.iter().all(|&o| o));
        assert_eq!(partition.clone_count(), 4);
    }

    #[test]
    fn test_no_split_keeps_partition() {
        let mut partition = ClonePartition::new(8);
        partition.split(2);
        let before = partition.lanes().to_vec();
        let original = partition.split(1);
        assert!(original.iter().all(|&o| o));
        assert_eq!(partition.lanes(), &before[..]);
    }
}
