use serde::{Deserialize, Serialize};

use super::types::{RefectoryTable, Serie, Shift, BOYS_PER_TABLE, GIRLS_PER_TABLE};

/// Number of tables in each series of a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLayout {
    pub first_series: u32,
    pub second_series: u32,
}

impl ShiftLayout {
    pub fn new(first_series: u32, second_series: u32) -> Self {
        Self {
            first_series,
            second_series,
        }
    }

    pub fn table_count(&self) -> u32 {
        self.first_series.saturating_add(self.second_series)
    }

    /// Series a table number belongs to, or None if the shift has no such table
    pub fn serie_of(&self, table_number: u32) -> Option<Serie> {
        if table_number == 0 || table_number > self.table_count() {
            None
        } else if table_number <= self.first_series {
            Some(Serie::First)
        } else {
            Some(Serie::Second)
        }
    }

    /// Builds the empty table shells of the shift
    /// First series = tables 1..=N
    /// Second series = tables N+1..=N+M
    pub fn table_shells(&self) -> Vec<RefectoryTable> {
        (1..=self.table_count())
            .filter_map(|number| {
                self.serie_of(number)
                    .map(|serie| RefectoryTable::empty(number, serie))
            })
            .collect()
    }

    pub fn boy_capacity(&self) -> usize {
        self.table_count() as usize * BOYS_PER_TABLE
    }

    pub fn girl_capacity(&self) -> usize {
        self.table_count() as usize * GIRLS_PER_TABLE
    }
}

/// Table configuration of both shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingLayout {
    pub morning: ShiftLayout,
    pub evening: ShiftLayout,
}

impl SeatingLayout {
    pub fn shift(&self, shift: Shift) -> &ShiftLayout {
        match shift {
            Shift::Morning => &self.morning,
            Shift::Evening => &self.evening,
        }
    }
}

impl Default for SeatingLayout {
    fn default() -> Self {
        Self {
            morning: ShiftLayout::new(28, 11),
            evening: ShiftLayout::new(28, 8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_series_continues_numbering() {
        let layout = ShiftLayout::new(2, 3);
        let shells = layout.table_shells();
        let numbers: Vec<u32> = shells.iter().map(|t| t.table_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(shells[1].serie, Serie::First);
        assert_eq!(shells[2].serie, Serie::Second);
    }

    #[test]
    fn serie_of_rejects_out_of_range() {
        let layout = ShiftLayout::new(28, 11);
        assert_eq!(layout.serie_of(0), None);
        assert_eq!(layout.serie_of(28), Some(Serie::First));
        assert_eq!(layout.serie_of(29), Some(Serie::Second));
        assert_eq!(layout.serie_of(40), None);
    }

    #[test]
    fn table_count_saturates_instead_of_overflowing() {
        assert_eq!(ShiftLayout::new(u32::MAX, 1).table_count(), u32::MAX);
    }

    #[test]
    fn default_layout_capacities() {
        let layout = SeatingLayout::default();
        assert_eq!(layout.morning.table_count(), 39);
        assert_eq!(layout.evening.table_count(), 36);
        assert_eq!(layout.morning.boy_capacity(), 117);
        assert_eq!(layout.evening.girl_capacity(), 252);
    }
}
