use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::seating::generator::group_by_class;
use crate::seating::retain::table_index;
use crate::seating::{EnrolledStudent, SeatingChart, SeatingLayout, Shift, UnassignedStudents};

/// Table numbers written back onto a student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAssignment {
    pub student_id: String,
    pub morning_table: Option<u32>,
    pub evening_table: Option<u32>,
}

impl StudentAssignment {
    pub fn table(&self, shift: Shift) -> Option<u32> {
        match shift {
            Shift::Morning => self.morning_table,
            Shift::Evening => self.evening_table,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.morning_table.is_some() && self.evening_table.is_some()
    }
}

/// One assignment per student, in roster order
pub fn project_assignments(
    students: &[EnrolledStudent],
    chart: &SeatingChart,
) -> Vec<StudentAssignment> {
    let mut lookup: HashMap<(Shift, &str), u32> = HashMap::new();
    for shift in Shift::ALL {
        for table in chart.tables(shift) {
            for student in table.occupants() {
                lookup.insert((shift, student.id.as_str()), table.table_number);
            }
        }
    }

    students
        .iter()
        .map(|s| StudentAssignment {
            student_id: s.id.clone(),
            morning_table: lookup.get(&(Shift::Morning, s.id.as_str())).copied(),
            evening_table: lookup.get(&(Shift::Evening, s.id.as_str())).copied(),
        })
        .collect()
}

/// Students missing a table in at least one shift
pub fn incomplete_assignments(assignments: &[StudentAssignment]) -> Vec<&StudentAssignment> {
    assignments.iter().filter(|a| !a.is_complete()).collect()
}

pub fn save_assignments<P: AsRef<Path>>(path: P, assignments: &[StudentAssignment]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, assignments)?;
    Ok(())
}

pub fn load_assignments<P: AsRef<Path>>(path: P) -> Result<Vec<StudentAssignment>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Chart read back from a saved assignments file
///
/// Returns `Ok(None)` when no file has been saved yet.
pub fn load_saved_chart<P: AsRef<Path>>(
    path: P,
    students: &[EnrolledStudent],
    layout: &SeatingLayout,
) -> Result<Option<SeatingChart>> {
    if !path.as_ref().exists() {
        return Ok(None);
    }
    let assignments = load_assignments(path)?;
    Ok(Some(chart_from_assignments(students, &assignments, layout)))
}

/// Rebuilds a chart from stored table numbers for display
///
/// Students are placed in the generator's seating order (classes by first
/// appearance, then roster order) at their recorded table when that table
/// exists in the layout and still has room for their gender. Everyone else
/// is reported as unassigned for that shift, in roster order.
pub fn chart_from_assignments(
    students: &[EnrolledStudent],
    assignments: &[StudentAssignment],
    layout: &SeatingLayout,
) -> SeatingChart {
    let by_student: HashMap<&str, &StudentAssignment> = assignments
        .iter()
        .map(|a| (a.student_id.as_str(), a))
        .collect();
    let roster: Vec<&EnrolledStudent> = students.iter().collect();
    let seating_order: Vec<&EnrolledStudent> =
        group_by_class(&roster).into_iter().flatten().collect();

    let mut chart = SeatingChart {
        morning: layout.morning.table_shells(),
        evening: layout.evening.table_shells(),
        unassigned: UnassignedStudents::default(),
    };

    for shift in Shift::ALL {
        let tables = match shift {
            Shift::Morning => &mut chart.morning,
            Shift::Evening => &mut chart.evening,
        };
        let mut seated: HashSet<&str> = HashSet::new();
        for &student in &seating_order {
            if seated.contains(student.id.as_str()) {
                continue;
            }
            let index = by_student
                .get(student.id.as_str())
                .and_then(|a| a.table(shift))
                .and_then(|number| table_index(tables, number));
            if let Some(index) = index {
                if tables[index].try_seat(student) {
                    seated.insert(student.id.as_str());
                }
            }
        }
        let unassigned: Vec<String> = students
            .iter()
            .filter(|s| !seated.contains(s.id.as_str()))
            .map(|s| s.id.clone())
            .collect();
        match shift {
            Shift::Morning => chart.unassigned.morning = unassigned,
            Shift::Evening => chart.unassigned.evening = unassigned,
        }
    }

    chart
}
