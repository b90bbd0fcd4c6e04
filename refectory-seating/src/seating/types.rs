use std::fmt;

use serde::{Deserialize, Serialize};

/// Seats reserved for boys at every refectory table
pub const BOYS_PER_TABLE: usize = 3;
/// Seats reserved for girls at every refectory table
pub const GIRLS_PER_TABLE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Number of seats of this gender at a single table
    pub fn table_capacity(self) -> usize {
        match self {
            Gender::Male => BOYS_PER_TABLE,
            Gender::Female => GIRLS_PER_TABLE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Boy",
            Gender::Female => "Girl",
        }
    }
}

/// A student enrolled in the active term, as supplied by the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledStudent {
    pub id: String,
    pub full_name: String,
    pub class: String,
    pub gender: Gender,
}

/// Meal period with its own table numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Evening,
}

impl Shift {
    pub const ALL: [Shift; 2] = [Shift::Morning, Shift::Evening];

    pub fn parse(value: &str) -> Option<Shift> {
        match value.trim().to_lowercase().as_str() {
            "morning" | "lunch" | "midi" => Some(Shift::Morning),
            "evening" | "dinner" | "soir" => Some(Shift::Evening),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Evening => "Evening",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dining wave within a shift. Serialized as `1` / `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Serie {
    First,
    Second,
}

impl Serie {
    pub fn number(self) -> u8 {
        match self {
            Serie::First => 1,
            Serie::Second => 2,
        }
    }
}

impl TryFrom<u8> for Serie {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Serie::First),
            2 => Ok(Serie::Second),
            other => Err(format!("invalid serie: {}", other)),
        }
    }
}

impl From<Serie> for u8 {
    fn from(serie: Serie) -> u8 {
        serie.number()
    }
}

impl fmt::Display for Serie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One dining table of a shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefectoryTable {
    pub table_number: u32,
    pub serie: Serie,
    pub boys: Vec<EnrolledStudent>,
    pub girls: Vec<EnrolledStudent>,
}

impl RefectoryTable {
    pub fn empty(table_number: u32, serie: Serie) -> Self {
        Self {
            table_number,
            serie,
            boys: Vec::new(),
            girls: Vec::new(),
        }
    }

    pub fn seats(&self, gender: Gender) -> &[EnrolledStudent] {
        match gender {
            Gender::Male => &self.boys,
            Gender::Female => &self.girls,
        }
    }

    /// Free seats left for the given gender
    pub fn free_seats(&self, gender: Gender) -> usize {
        gender.table_capacity().saturating_sub(self.seats(gender).len())
    }

    pub fn has_room(&self, gender: Gender) -> bool {
        self.free_seats(gender) > 0
    }

    /// Seats the student if their gender slot still has room
    pub fn try_seat(&mut self, student: &EnrolledStudent) -> bool {
        if !self.has_room(student.gender) {
            return false;
        }
        match student.gender {
            Gender::Male => self.boys.push(student.clone()),
            Gender::Female => self.girls.push(student.clone()),
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.boys.is_empty() && self.girls.is_empty()
    }

    pub fn occupants(&self) -> impl Iterator<Item = &EnrolledStudent> {
        self.boys.iter().chain(self.girls.iter())
    }
}

/// Ids of students left without a table, per shift, in roster order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedStudents {
    pub morning: Vec<String>,
    pub evening: Vec<String>,
}

/// Full output of a generation: both shifts plus who could not be seated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingChart {
    pub morning: Vec<RefectoryTable>,
    pub evening: Vec<RefectoryTable>,
    pub unassigned: UnassignedStudents,
}

impl SeatingChart {
    pub fn tables(&self, shift: Shift) -> &[RefectoryTable] {
        match shift {
            Shift::Morning => &self.morning,
            Shift::Evening => &self.evening,
        }
    }

    pub fn unassigned(&self, shift: Shift) -> &[String] {
        match shift {
            Shift::Morning => &self.unassigned.morning,
            Shift::Evening => &self.unassigned.evening,
        }
    }

    /// Table number of a student in the given shift, if seated
    pub fn table_of(&self, shift: Shift, student_id: &str) -> Option<u32> {
        self.tables(shift)
            .iter()
            .find(|t| t.occupants().any(|s| s.id == student_id))
            .map(|t| t.table_number)
    }

    pub fn seated_count(&self, shift: Shift) -> usize {
        self.tables(shift)
            .iter()
            .map(|t| t.boys.len() + t.girls.len())
            .sum()
    }
}
