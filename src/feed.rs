use crate::prediction::{Prediction, Tier};

/// Maximum number of rows kept in memory and on screen.
pub const FEED_CAP: usize = 100;

/// Filter applied to the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    Tier(Tier),
    CrossSignal,
}

impl FeedFilter {
    pub fn matches(&self, p: &Prediction) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::Tier(t) => p.tier == *t,
            FeedFilter::CrossSignal => p.cross_platform,
        }
    }
}

/// Aggregate counts shown in the stat boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub total: usize,
    pub critical: usize,
    pub viral: usize,
    pub pre_viral: usize,
}

/// In-memory list of predictions, newest first, capped at [`FEED_CAP`].
///
/// Owned and mutated exclusively by the UI thread; worker threads hand rows
/// over through the event channel instead of touching this directly.
#[derive(Debug, Default)]
pub struct PredictionFeed {
    rows: Vec<Prediction>,
}

impl PredictionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh snapshot, truncated to the cap.
    pub fn replace(&mut self, mut rows: Vec<Prediction>) {
        rows.truncate(FEED_CAP);
        self.rows = rows;
    }

    /// Prepend a realtime insert and drop the oldest row past the cap.
    pub fn push_front(&mut self, row: Prediction) {
        self.rows.insert(0, row);
        self.rows.truncate(FEED_CAP);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Prediction] {
        &self.rows
    }

    pub fn stats(&self) -> FeedStats {
        let mut stats = FeedStats {
            total: self.rows.len(),
            ..Default::default()
        };
        for p in &self.rows {
            match p.tier {
                Tier::Critical => stats.critical += 1,
                Tier::Viral => stats.viral += 1,
                Tier::PreViral => stats.pre_viral += 1,
                _ => {}
            }
        }
        stats
    }

    /// Rows passing the filter, newest first.
    pub fn filtered(&self, filter: FeedFilter) -> impl Iterator<Item = &Prediction> {
        self.rows.iter().filter(move |p| filter.matches(p))
    }
}
