pub mod assignments;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod history;
pub mod roster;
pub mod seating;
pub mod web;

pub use error::{Result, SeatingError};
pub use seating::{
    generate, generate_with_layout, EnrolledStudent, Gender, RefectoryTable, SeatingChart,
    SeatingLayout, Serie, Shift, ShiftLayout,
};
