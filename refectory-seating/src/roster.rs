use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::warn;

use crate::error::{Result, SeatingError};
use crate::seating::{EnrolledStudent, Gender};

/// Parses a gender cell from the usual spellings found in school exports
pub fn parse_gender(value: &str) -> Option<Gender> {
    match value.trim().to_lowercase().as_str() {
        "male" | "m" | "boy" | "masculin" | "garcon" | "garçon" => Some(Gender::Male),
        "female" | "f" | "girl" | "feminin" | "féminin" | "fille" => Some(Gender::Female),
        _ => None,
    }
}

/// Checks the fields the seating generator relies on
pub fn validate_student(student: &EnrolledStudent) -> std::result::Result<(), String> {
    if student.id.trim().is_empty() {
        return Err("Student ID is required".to_string());
    }
    if student.full_name.trim().is_empty() {
        return Err(format!("Student {} has no name", student.id));
    }
    if student.class.trim().is_empty() {
        return Err(format!("Student {} has no class", student.id));
    }
    Ok(())
}

/// Headers taken as the student id column before any looser match
const ID_HEADERS: [&str; 5] = ["id", "student id", "student_id", "studentid", "matricule"];
const CLASS_HEADERS: [&str; 3] = ["class", "classe", "grade"];

struct Columns {
    id: usize,
    name: usize,
    class: usize,
    gender: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |pred: &dyn Fn(&str) -> bool| {
            headers
                .iter()
                .position(|h| pred(&h.trim().to_lowercase()))
        };
        let exact = |names: &[&'static str]| find(&|h| names.iter().any(|n| *n == h));
        let is_id = |h: &str| h.contains(" id") || h.ends_with("_id") || h.starts_with("id");

        Self {
            id: exact(&ID_HEADERS)
                .or_else(|| find(&|h| is_id(h) && !h.contains("class")))
                .unwrap_or(0),
            name: find(&|h| h.contains("name") || h == "nom").unwrap_or(1),
            class: exact(&CLASS_HEADERS)
                .or_else(|| find(&|h| (h.contains("class") || h.contains("grade")) && !is_id(h)))
                .unwrap_or(2),
            gender: find(&|h| h.contains("gender") || h.contains("sex")).unwrap_or(3),
        }
    }
}

/// Reads the enrolled-student roster from CSV with a header row
///
/// Rows without an id or name are skipped, as are rows whose gender cannot be
/// read. When an id appears twice the later row wins but keeps the position of
/// the first, so the roster order stays stable.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<EnrolledStudent>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?;
    if headers.len() < 4 {
        return Err(SeatingError::InvalidRoster(format!(
            "expected id, name, class and gender columns, found {}",
            headers.len()
        )));
    }
    let columns = Columns::from_headers(headers);

    let mut students: Vec<EnrolledStudent> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        let id = record.get(columns.id).unwrap_or("").to_string();
        let full_name = record.get(columns.name).unwrap_or("").to_string();
        let class = record.get(columns.class).unwrap_or("").to_string();
        let gender_cell = record.get(columns.gender).unwrap_or("");

        // Skip if essential fields are missing
        if id.is_empty() || full_name.is_empty() {
            continue;
        }

        let Some(gender) = parse_gender(gender_cell) else {
            warn!(
                "Roster row {}: unknown gender {:?} for student {}, skipped",
                line + 2,
                gender_cell,
                id
            );
            continue;
        };

        let student = EnrolledStudent {
            id,
            full_name,
            class,
            gender,
        };

        match positions.get(&student.id) {
            Some(&index) => students[index] = student,
            None => {
                positions.insert(student.id.clone(), students.len());
                students.push(student);
            }
        }
    }

    Ok(students)
}

/// Loads the roster from a CSV file
pub fn load_roster<P: AsRef<Path>>(csv_path: P) -> Result<Vec<EnrolledStudent>> {
    let file = std::fs::File::open(csv_path)?;
    read_roster(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_columns_by_header_name() {
        let csv = "Gender,Class,Full Name,Student ID\nF,6A,Awa Diallo,17\nboy,5B,Moussa Ba,18\n";
        let students = read_roster(csv.as_bytes()).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id, "17");
        assert_eq!(students[0].full_name, "Awa Diallo");
        assert_eq!(students[0].class, "6A");
        assert_eq!(students[0].gender, Gender::Female);
        assert_eq!(students[1].gender, Gender::Male);
    }

    #[test]
    fn exact_id_header_wins_over_class_id() {
        let csv = "class_id,Student ID,name,class,gender\nC6,17,Awa,6A,f\n";
        let students = read_roster(csv.as_bytes()).unwrap();

        assert_eq!(students[0].id, "17");
        assert_eq!(students[0].class, "6A");
    }

    #[test]
    fn loose_id_header_skips_class_columns() {
        let csv = "class_id,pupil_id,name,class,gender\nC6,17,Awa,6A,f\n";
        let students = read_roster(csv.as_bytes()).unwrap();

        assert_eq!(students[0].id, "17");
    }

    #[test]
    fn later_row_replaces_earlier_in_place() {
        let csv = "id,name,class,gender\n1,Ana,6A,f\n2,Ben,6A,m\n1,Ana B.,6B,f\n";
        let students = read_roster(csv.as_bytes()).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id, "1");
        assert_eq!(students[0].full_name, "Ana B.");
        assert_eq!(students[0].class, "6B");
        assert_eq!(students[1].id, "2");
    }

    #[test]
    fn skips_incomplete_and_unknown_gender_rows() {
        let csv = "id,name,class,gender\n,NoId,6A,f\n3,,6A,m\n4,Cid,6A,unknown\n5,Dia,6A,Fille\n";
        let students = read_roster(csv.as_bytes()).unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, "5");
    }

    #[test]
    fn rejects_roster_with_too_few_columns() {
        let err = read_roster("id,name\n1,Ana\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SeatingError::InvalidRoster(_)));
    }

    #[test]
    fn validate_requires_class() {
        let student = EnrolledStudent {
            id: "9".to_string(),
            full_name: "Eli".to_string(),
            class: " ".to_string(),
            gender: Gender::Male,
        };
        assert!(validate_student(&student).is_err());
    }
}
