use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::seating::SeatingChart;

/// A chart together with the moment it was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub chart: SeatingChart,
    pub generated_at: DateTime<Utc>,
}

/// Current chart plus a single level of undo
#[derive(Debug, Default)]
pub struct ChartHistory {
    current: Option<Generation>,
    previous: Option<Generation>,
}

impl ChartHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `chart` current; the old current becomes the undo target
    pub fn record(&mut self, chart: SeatingChart) {
        self.record_at(chart, Utc::now());
    }

    pub fn record_at(&mut self, chart: SeatingChart, generated_at: DateTime<Utc>) {
        let generation = Generation {
            chart,
            generated_at,
        };
        self.previous = self.current.replace(generation);
    }

    /// Reverts to the previous chart. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        match self.previous.take() {
            Some(previous) => {
                self.current = Some(previous);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&Generation> {
        self.current.as_ref()
    }

    pub fn current_chart(&self) -> Option<&SeatingChart> {
        self.current.as_ref().map(|g| &g.chart)
    }

    pub fn can_undo(&self) -> bool {
        self.previous.is_some()
    }
}
