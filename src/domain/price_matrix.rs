//! Price matrix: every pair's series on one unified timeline.

use crate::domain::currency::InstrumentPair;
use crate::domain::price_series::{PriceBar, PriceSeries};
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct PriceMatrix {
    timeline: Vec<NaiveDateTime>,
    series: HashMap<InstrumentPair, PriceSeries>,
}

impl PriceMatrix {
    /// Align all series on the union of their timestamps.
    ///
    /// A missing sample copies the previous bar (forward fill); samples before a
    /// series' first bar copy that first bar (backward fill). A later series for
    /// an already present pair replaces the earlier one, timestamps included.
    pub fn align(input: Vec<PriceSeries>) -> Self {
        let mut latest: HashMap<InstrumentPair, PriceSeries> = HashMap::with_capacity(input.len());
        for s in input {
            latest.insert(s.pair(), s);
        }
        let unique: Vec<PriceSeries> = latest.into_values().collect();

        let timeline = build_unified_timeline(&unique);
        let series = unique
            .iter()
            .map(|s| (s.pair(), fill_to_timeline(s, &timeline)))
            .collect();

        Self { timeline, series }
    }

    pub fn timeline(&self) -> &[NaiveDateTime] {
        &self.timeline
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn get(&self, pair: &InstrumentPair) -> Option<&PriceSeries> {
        self.series.get(pair)
    }

    pub fn contains(&self, pair: &InstrumentPair) -> bool {
        self.series.contains_key(pair)
    }

    /// Pairs present in the matrix, sorted by symbol.
    pub fn pairs(&self) -> Vec<InstrumentPair> {
        let mut pairs: Vec<_> = self.series.keys().copied().collect();
        pairs.sort();
        pairs
    }
}

pub fn build_unified_timeline(series: &[PriceSeries]) -> Vec<NaiveDateTime> {
    let unique: BTreeSet<NaiveDateTime> = series.iter().flat_map(|s| s.timestamps()).collect();
    unique.into_iter().collect()
}

fn fill_to_timeline(series: &PriceSeries, timeline: &[NaiveDateTime]) -> PriceSeries {
    let bars = series.bars();
    let mut filled = Vec::with_capacity(timeline.len());
    let mut next = 0;

    for &ts in timeline {
        while next < bars.len() && bars[next].timestamp <= ts {
            next += 1;
        }
        // `next` now counts bars at or before `ts`; zero means before the first bar.
        let source = if next == 0 { &bars[0] } else { &bars[next - 1] };
        filled.push(PriceBar {
            timestamp: ts,
            ..source.clone()
        });
    }

    // Timeline is strictly increasing and every copied price was already validated.
    PriceSeries::from_validated(series.pair(), filled)
}
