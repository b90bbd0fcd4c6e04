use chrono::Local;
use log::{info, warn};

use refectory_seating::assignments::{
    incomplete_assignments, load_saved_chart, project_assignments, save_assignments,
};
use refectory_seating::config::Config;
use refectory_seating::display::print_chart;
use refectory_seating::export::{export_chart_to_file, ExportFilter};
use refectory_seating::roster::load_roster;
use refectory_seating::{generate_with_layout, EnrolledStudent, SeatingChart, Shift};

/// Chart read back from the saved assignments, if a usable file is present
fn saved_chart(config: &Config, students: &[EnrolledStudent]) -> Option<SeatingChart> {
    match load_saved_chart(&config.assignments_path, students, &config.layout) {
        Ok(chart) => chart,
        Err(e) => {
            warn!(
                "Ignoring saved assignments at {}: {}",
                config.assignments_path.display(),
                e
            );
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut config = Config::from_env()?;

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        let students = if config.roster_path.exists() {
            Some(load_roster(&config.roster_path)?)
        } else {
            warn!("No roster at {}, upload one through /api/roster", config.roster_path.display());
            None
        };
        let chart = students.as_deref().and_then(|s| saved_chart(&config, s));

        println!("Starting web server on port {}...", config.port);
        println!("Access the API at http://localhost:{}/api/stats", config.port);

        refectory_seating::web::start_server(&config, students, chart).await?;
        return Ok(());
    }

    // CLI mode: roster path from the first argument or the configuration
    if let Some(path) = args.get(1) {
        config.roster_path = path.into();
    }

    println!("Loading roster from {}...", config.roster_path.display());
    let students = load_roster(&config.roster_path)?;
    println!("Loaded {} enrolled students", students.len());

    let previous = saved_chart(&config, &students);
    if previous.is_some() {
        info!("Keeping seats from {}", config.assignments_path.display());
    }

    println!("\n\n=== Generating Seating Chart ===");
    let chart = generate_with_layout(&students, previous.as_ref(), &config.layout);
    print_chart("Refectory Seating Chart", &chart, &students);

    println!("\n=== Writing Exports ===");
    let today = Local::now().date_naive();
    for shift in Shift::ALL {
        let path = export_chart_to_file(&chart, &ExportFilter::shift(shift), &config.export_dir, today)?;
        println!("  - {}", path.display());
    }

    let assignments = project_assignments(&students, &chart);
    save_assignments(&config.assignments_path, &assignments)?;
    println!("Assignments saved to {}", config.assignments_path.display());

    let incomplete = incomplete_assignments(&assignments);
    if !incomplete.is_empty() {
        println!(
            "⚠️  {} students without a complete table assignment",
            incomplete.len()
        );
    }

    Ok(())
}
