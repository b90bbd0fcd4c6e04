pub mod types;
pub mod layout;
pub mod retain;
pub mod generator;

pub use types::{
    EnrolledStudent, Gender, RefectoryTable, SeatingChart, Serie, Shift, UnassignedStudents,
    BOYS_PER_TABLE, GIRLS_PER_TABLE,
};
pub use layout::{SeatingLayout, ShiftLayout};
pub use generator::{generate, generate_with_layout};
