use std::collections::{HashMap, HashSet};

use super::types::{EnrolledStudent, RefectoryTable};

/// Index of a table in a contiguous shell list numbered from 1
pub fn table_index(tables: &[RefectoryTable], table_number: u32) -> Option<usize> {
    let index = (table_number as usize).checked_sub(1)?;
    match tables.get(index) {
        Some(table) if table.table_number == table_number => Some(index),
        _ => tables.iter().position(|t| t.table_number == table_number),
    }
}

/// Puts students back at the table they held in the previous chart
///
/// Previous tables and their seat lists are walked in order so a retained
/// table keeps its seating order. A student is kept only when they are still
/// on the roster and the table still exists and has room for their current
/// gender. Returns the ids of everyone who got their old seat back.
pub fn retain_previous_seats<'a>(
    tables: &mut [RefectoryTable],
    previous: &[RefectoryTable],
    roster: &HashMap<&'a str, &'a EnrolledStudent>,
) -> HashSet<&'a str> {
    let mut retained = HashSet::new();

    for previous_table in previous {
        let Some(index) = table_index(tables, previous_table.table_number) else {
            continue;
        };

        for previous_student in previous_table.occupants() {
            let Some((&id, &current)) = roster.get_key_value(previous_student.id.as_str()) else {
                continue;
            };
            if retained.contains(id) {
                continue;
            }
            if tables[index].try_seat(current) {
                retained.insert(id);
            }
        }
    }

    retained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::layout::ShiftLayout;
    use crate::seating::types::Gender;

    fn student(id: &str, class: &str, gender: Gender) -> EnrolledStudent {
        EnrolledStudent {
            id: id.to_string(),
            full_name: format!("Student {}", id),
            class: class.to_string(),
            gender,
        }
    }

    #[test]
    fn keeps_seat_when_table_still_exists() {
        let a = student("a", "6A", Gender::Male);
        let b = student("b", "6A", Gender::Female);
        let mut previous = ShiftLayout::new(3, 0).table_shells();
        previous[2].try_seat(&a);
        previous[0].try_seat(&b);

        let roster: HashMap<&str, &EnrolledStudent> =
            [("a", &a), ("b", &b)].into_iter().collect();
        let mut tables = ShiftLayout::new(3, 0).table_shells();
        let retained = retain_previous_seats(&mut tables, &previous, &roster);

        assert_eq!(retained.len(), 2);
        assert_eq!(tables[2].boys[0].id, "a");
        assert_eq!(tables[0].girls[0].id, "b");
    }

    #[test]
    fn drops_seat_of_removed_table_and_departed_student() {
        let a = student("a", "6A", Gender::Male);
        let gone = student("gone", "6A", Gender::Male);
        let mut previous = ShiftLayout::new(5, 0).table_shells();
        previous[4].try_seat(&a);
        previous[0].try_seat(&gone);

        let roster: HashMap<&str, &EnrolledStudent> = [("a", &a)].into_iter().collect();
        let mut tables = ShiftLayout::new(2, 0).table_shells();
        let retained = retain_previous_seats(&mut tables, &previous, &roster);

        assert!(retained.is_empty());
        assert!(tables.iter().all(|t| t.is_empty()));
    }

    #[test]
    fn gender_change_respects_fresh_capacity() {
        // previously seated among boys, now recorded as a girl
        let mut changed = student("c", "6A", Gender::Male);
        let mut previous = ShiftLayout::new(1, 0).table_shells();
        previous[0].try_seat(&changed);
        changed.gender = Gender::Female;

        let roster: HashMap<&str, &EnrolledStudent> = [("c", &changed)].into_iter().collect();
        let mut tables = ShiftLayout::new(1, 0).table_shells();
        retain_previous_seats(&mut tables, &previous, &roster);

        assert!(tables[0].boys.is_empty());
        assert_eq!(tables[0].girls.len(), 1);
    }
}
