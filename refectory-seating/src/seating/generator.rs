use std::collections::{HashMap, HashSet};

use log::{info, warn};

use super::layout::{SeatingLayout, ShiftLayout};
use super::retain::retain_previous_seats;
use super::types::{
    EnrolledStudent, Gender, RefectoryTable, SeatingChart, Shift, UnassignedStudents,
};

/// Generates a seating chart with the default table layout
pub fn generate(students: &[EnrolledStudent], previous: Option<&SeatingChart>) -> SeatingChart {
    generate_with_layout(students, previous, &SeatingLayout::default())
}

/// Generates a seating chart for both shifts
///
/// When a previous chart is given, students keep their old table wherever the
/// fresh capacity allows it and only the rest are placed anew. Students that
/// do not fit are listed in `unassigned` rather than overfilling a table.
pub fn generate_with_layout(
    students: &[EnrolledStudent],
    previous: Option<&SeatingChart>,
    layout: &SeatingLayout,
) -> SeatingChart {
    let roster = unique_roster(students);

    let (morning, unassigned_morning) = generate_shift(
        &roster,
        layout.shift(Shift::Morning),
        previous.map(|chart| chart.tables(Shift::Morning)),
    );
    let (evening, unassigned_evening) = generate_shift(
        &roster,
        layout.shift(Shift::Evening),
        previous.map(|chart| chart.tables(Shift::Evening)),
    );

    for (shift, tables, unassigned) in [
        (Shift::Morning, &morning, &unassigned_morning),
        (Shift::Evening, &evening, &unassigned_evening),
    ] {
        info!(
            "{} shift: {} tables, {} seated, {} unassigned",
            shift,
            tables.len(),
            roster.len() - unassigned.len(),
            unassigned.len()
        );
    }

    SeatingChart {
        morning,
        evening,
        unassigned: UnassignedStudents {
            morning: unassigned_morning,
            evening: unassigned_evening,
        },
    }
}

/// Drops repeated ids, keeping the first occurrence
fn unique_roster(students: &[EnrolledStudent]) -> Vec<&EnrolledStudent> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(students.len());
    for student in students {
        if seen.insert(student.id.as_str()) {
            unique.push(student);
        } else {
            warn!("Duplicate student id {} ignored", student.id);
        }
    }
    unique
}

/// Groups students by class, classes in order of first appearance
pub(crate) fn group_by_class<'a>(students: &[&'a EnrolledStudent]) -> Vec<Vec<&'a EnrolledStudent>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&EnrolledStudent>> = Vec::new();
    for &student in students {
        let slot = *index.entry(student.class.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(student);
    }
    groups
}

/// Seats one shift and returns its tables plus the ids left without a seat
fn generate_shift(
    roster: &[&EnrolledStudent],
    layout: &ShiftLayout,
    previous: Option<&[RefectoryTable]>,
) -> (Vec<RefectoryTable>, Vec<String>) {
    let mut tables = layout.table_shells();

    let retained = match previous {
        Some(previous_tables) => {
            let lookup: HashMap<&str, &EnrolledStudent> =
                roster.iter().map(|s| (s.id.as_str(), *s)).collect();
            retain_previous_seats(&mut tables, previous_tables, &lookup)
        }
        None => HashSet::new(),
    };

    let pending: Vec<&EnrolledStudent> = roster
        .iter()
        .copied()
        .filter(|s| !retained.contains(s.id.as_str()))
        .collect();
    let classes = group_by_class(&pending);

    let mut placed: HashSet<&str> = retained;
    for gender in [Gender::Male, Gender::Female] {
        // Tables only ever fill up, so the cursor never has to move back
        let mut cursor = 0;
        'classes: for class in &classes {
            for student in class.iter().filter(|s| s.gender == gender) {
                while cursor < tables.len() && !tables[cursor].has_room(gender) {
                    cursor += 1;
                }
                if cursor == tables.len() {
                    break 'classes;
                }
                tables[cursor].try_seat(student);
                placed.insert(student.id.as_str());
            }
        }
    }

    let unassigned = roster
        .iter()
        .filter(|s| !placed.contains(s.id.as_str()))
        .map(|s| s.id.clone())
        .collect();

    (tables, unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::types::{Serie, BOYS_PER_TABLE, GIRLS_PER_TABLE};

    fn student(id: &str, class: &str, gender: Gender) -> EnrolledStudent {
        EnrolledStudent {
            id: id.to_string(),
            full_name: format!("Student {}", id),
            class: class.to_string(),
            gender,
        }
    }

    fn class_of(class: &str, boys: usize, girls: usize) -> Vec<EnrolledStudent> {
        let mut students = Vec::new();
        for i in 0..boys {
            students.push(student(&format!("{}-b{}", class, i), class, Gender::Male));
        }
        for i in 0..girls {
            students.push(student(&format!("{}-g{}", class, i), class, Gender::Female));
        }
        students
    }

    #[test]
    fn full_class_fills_first_table_exactly() {
        let students = class_of("6A", 3, 7);
        let chart = generate(&students, None);

        for shift in Shift::ALL {
            let tables = chart.tables(shift);
            assert_eq!(tables[0].boys.len(), BOYS_PER_TABLE);
            assert_eq!(tables[0].girls.len(), GIRLS_PER_TABLE);
            assert!(tables[1].is_empty());
            assert!(chart.unassigned(shift).is_empty());
        }
    }

    #[test]
    fn fourth_boy_spills_to_second_table() {
        let students = class_of("6A", 4, 0);
        let chart = generate(&students, None);

        assert_eq!(chart.morning[0].boys.len(), 3);
        assert_eq!(chart.morning[1].boys.len(), 1);
        assert!(chart.morning.iter().all(|t| t.girls.is_empty()));
    }

    #[test]
    fn empty_roster_yields_empty_shells() {
        let chart = generate(&[], None);

        assert_eq!(chart.morning.len(), 39);
        assert_eq!(chart.evening.len(), 36);
        assert!(chart.morning.iter().chain(chart.evening.iter()).all(|t| t.is_empty()));
        assert!(chart.unassigned.morning.is_empty());
        assert!(chart.unassigned.evening.is_empty());
    }

    #[test]
    fn over_enrolled_boys_are_left_unassigned() {
        let students = class_of("6A", 200, 0);
        let chart = generate(&students, None);

        assert_eq!(chart.seated_count(Shift::Morning), 117);
        assert_eq!(chart.unassigned.morning.len(), 83);
        assert_eq!(chart.seated_count(Shift::Evening), 108);
        assert_eq!(chart.unassigned.evening.len(), 92);
        // the last students in roster order are the ones left over
        assert_eq!(chart.unassigned.morning[0], "6A-b117");
    }

    #[test]
    fn first_series_fills_before_second() {
        let layout = SeatingLayout {
            morning: ShiftLayout::new(2, 2),
            evening: ShiftLayout::new(1, 1),
        };
        let students = class_of("5B", 7, 0);
        let chart = generate_with_layout(&students, None, &layout);

        let series: Vec<(Serie, usize)> =
            chart.morning.iter().map(|t| (t.serie, t.boys.len())).collect();
        assert_eq!(
            series,
            vec![
                (Serie::First, 3),
                (Serie::First, 3),
                (Serie::Second, 1),
                (Serie::Second, 0)
            ]
        );
        assert_eq!(chart.unassigned.evening.len(), 1);
    }

    #[test]
    fn classes_stay_together_in_roster_order() {
        // interleaved roster, grouping follows first appearance of each class
        let mut students = Vec::new();
        for i in 0..3 {
            students.push(student(&format!("b{}", i), "5B", Gender::Male));
            students.push(student(&format!("a{}", i), "6A", Gender::Male));
        }
        let chart = generate(&students, None);

        let first: Vec<&str> = chart.morning[0].boys.iter().map(|s| s.class.as_str()).collect();
        let second: Vec<&str> = chart.morning[1].boys.iter().map(|s| s.class.as_str()).collect();
        assert_eq!(first, vec!["5B"; 3]);
        assert_eq!(second, vec!["6A"; 3]);
    }

    #[test]
    fn new_student_takes_first_table_with_room() {
        let mut students = class_of("6A", 3, 7);
        students.extend(class_of("6B", 2, 0));
        let chart = generate(&students, None);

        students.push(student("late", "6C", Gender::Male));
        let regenerated = generate(&students, Some(&chart));

        for shift in Shift::ALL {
            for s in &students[..students.len() - 1] {
                assert_eq!(chart.table_of(shift, &s.id), regenerated.table_of(shift, &s.id));
            }
            assert_eq!(regenerated.table_of(shift, "late"), Some(2));
        }
    }

    #[test]
    fn removed_student_frees_seat_without_moving_others() {
        let students = class_of("6A", 6, 0);
        let chart = generate(&students, None);

        let remaining: Vec<EnrolledStudent> =
            students.iter().filter(|s| s.id != "6A-b1").cloned().collect();
        let regenerated = generate(&remaining, Some(&chart));

        assert_eq!(regenerated.morning[0].boys.len(), 2);
        assert_eq!(regenerated.morning[1].boys.len(), 3);
        assert_eq!(regenerated.table_of(Shift::Morning, "6A-b5"), Some(2));
    }

    #[test]
    fn duplicate_ids_are_seated_once() {
        let mut students = class_of("6A", 1, 0);
        students.push(students[0].clone());
        let chart = generate(&students, None);

        assert_eq!(chart.seated_count(Shift::Morning), 1);
        assert!(chart.unassigned.morning.is_empty());
    }
}
