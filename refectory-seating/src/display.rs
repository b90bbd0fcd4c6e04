use crate::seating::{EnrolledStudent, SeatingChart, Shift};

/// Formats a student name with class tag
pub fn format_student_name(class: &str, name: &str) -> String {
    if class.is_empty() {
        name.to_string()
    } else {
        format!("[{}] {}", class, name)
    }
}

/// Prints a seating chart in a readable format
pub fn print_chart(title: &str, chart: &SeatingChart, students: &[EnrolledStudent]) {
    println!("\n=== {} ===", title);

    for shift in Shift::ALL {
        let tables = chart.tables(shift);
        println!("\n--- {} shift ({} tables) ---", shift, tables.len());
        println!("Total students seated: {}", chart.seated_count(shift));

        let unassigned = chart.unassigned(shift);
        if !unassigned.is_empty() {
            println!("⚠️  Students without a table ({}):", unassigned.len());
            for student_id in unassigned {
                if let Some(student) = students.iter().find(|s| s.id == *student_id) {
                    let formatted_name = format_student_name(&student.class, &student.full_name);
                    println!("  - {} (ID: {}, {})", formatted_name, student_id, student.gender.label());
                }
            }
        }

        for table in tables {
            if table.is_empty() {
                println!("  Table {} (serie {}) -> [EMPTY]", table.table_number, table.serie);
                continue;
            }
            println!(
                "  Table {} (serie {}) -> {} boys, {} girls",
                table.table_number,
                table.serie,
                table.boys.len(),
                table.girls.len()
            );
            for student in table.occupants() {
                println!(
                    "      {} {}",
                    student.gender.label(),
                    format_student_name(&student.class, &student.full_name)
                );
            }
        }
    }
}
