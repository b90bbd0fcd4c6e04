use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::assignments::{incomplete_assignments, project_assignments, save_assignments};
use crate::config::Config;
use crate::export::{export_chart_csv, export_file_name, ExportFilter};
use crate::history::ChartHistory;
use crate::roster::{read_roster, validate_student};
use crate::seating::{
    generate_with_layout, EnrolledStudent, Gender, RefectoryTable, SeatingChart, SeatingLayout,
    Serie, Shift,
};

// Roster and charts live in memory; saved assignments go to a JSON file
pub struct AppState {
    pub students: Mutex<Option<Vec<EnrolledStudent>>>,
    pub history: Mutex<ChartHistory>,
    pub layout: SeatingLayout,
    pub assignments_path: PathBuf,
    pub admin_password: String,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::preloaded(config, None, None)
    }

    /// State seeded with a roster and the chart read back from saved assignments
    pub fn preloaded(
        config: &Config,
        students: Option<Vec<EnrolledStudent>>,
        chart: Option<SeatingChart>,
    ) -> Self {
        let mut history = ChartHistory::new();
        if let Some(chart) = chart {
            history.record(chart);
        }
        Self {
            students: Mutex::new(students),
            history: Mutex::new(history),
            layout: config.layout,
            assignments_path: config.assignments_path.clone(),
            admin_password: config.admin_password.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct GenerateQuery {
    fresh: Option<bool>,
}

#[derive(Deserialize)]
pub struct SerieQuery {
    serie: Option<u8>,
}

#[derive(Serialize)]
pub struct UnassignedCounts {
    morning: usize,
    evening: usize,
}

#[derive(Serialize)]
pub struct UnassignedStudent {
    id: String,
    full_name: String,
    class: String,
    gender: Gender,
}

#[derive(Serialize)]
pub struct ChartResponse {
    shift: Shift,
    generated_at: DateTime<Utc>,
    tables: Vec<RefectoryTable>,
    unassigned: Vec<UnassignedStudent>,
}

#[derive(Serialize, Default)]
pub struct ClassStats {
    boys: u32,
    girls: u32,
}

#[derive(Serialize)]
pub struct ShiftCapacity {
    shift: Shift,
    tables: u32,
    boy_seats: usize,
    girl_seats: usize,
}

#[derive(Serialize)]
pub struct StatsResponse {
    class_counts: BTreeMap<String, ClassStats>,
    capacity: Vec<ShiftCapacity>,
    unassigned: Option<UnassignedCounts>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("application state is poisoned"))
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    password == state.admin_password
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"}))
}

fn unassigned_counts(chart: &SeatingChart) -> UnassignedCounts {
    UnassignedCounts {
        morning: chart.unassigned.morning.len(),
        evening: chart.unassigned.evening.len(),
    }
}

/// Parses the `{shift}` path segment and optional `serie` query value
fn parse_filter(
    shift: &str,
    serie: Option<u8>,
) -> std::result::Result<(Shift, Option<Serie>), HttpResponse> {
    let shift = Shift::parse(shift).ok_or_else(|| {
        HttpResponse::BadRequest().json(serde_json::json!({"error": "Invalid shift"}))
    })?;
    let serie = serie
        .map(Serie::try_from)
        .transpose()
        .map_err(|e| HttpResponse::BadRequest().json(serde_json::json!({"error": e})))?;
    Ok((shift, serie))
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Roster CSV upload endpoint
async fn upload_roster(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    match read_roster(&body[..]) {
        Ok(students) => {
            let warnings: Vec<String> = students
                .iter()
                .filter_map(|s| validate_student(s).err())
                .collect();
            info!("Roster uploaded: {} students", students.len());
            let count = students.len();
            *lock(&state.students)? = Some(students);

            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "students": count,
                "warnings": warnings,
            })))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Generate endpoint, biased towards the current chart unless `fresh=true`
async fn generate_chart(
    req: HttpRequest,
    query: web::Query<GenerateQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    let students = lock(&state.students)?;
    let Some(ref students) = *students else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No roster uploaded"})));
    };

    let mut history = lock(&state.history)?;
    let previous = if query.fresh.unwrap_or(false) {
        None
    } else {
        history.current_chart()
    };
    let chart = generate_with_layout(students, previous, &state.layout);
    let counts = unassigned_counts(&chart);
    history.record(chart);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Seating chart generated successfully",
        "unassigned": counts,
    })))
}

// Undo endpoint, one level deep
async fn undo_chart(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    if lock(&state.history)?.undo() {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Conflict().json(serde_json::json!({"success": false, "error": "Nothing to undo"})))
    }
}

// Save assignments endpoint, separate from generation
async fn save_chart_assignments(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    let students = lock(&state.students)?;
    let history = lock(&state.history)?;
    let (Some(students), Some(chart)) = (students.as_ref(), history.current_chart()) else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No chart available"})));
    };

    let assignments = project_assignments(students, chart);
    let incomplete = incomplete_assignments(&assignments).len();
    save_assignments(&state.assignments_path, &assignments).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Failed to save assignments: {}", e))
    })?;
    if incomplete > 0 {
        warn!("{} students without a complete table assignment", incomplete);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "saved": assignments.len(),
        "incomplete": incomplete,
    })))
}

// Chart endpoint
async fn get_chart(
    shift: web::Path<String>,
    query: web::Query<SerieQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (shift, serie) = match parse_filter(&shift, query.serie) {
        Ok(parsed) => parsed,
        Err(response) => return Ok(response),
    };

    // Same lock order as generation: roster first, then history
    let students = lock(&state.students)?;
    let history = lock(&state.history)?;
    let Some(generation) = history.current() else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Chart not available"})));
    };
    let chart = &generation.chart;

    let tables: Vec<RefectoryTable> = chart
        .tables(shift)
        .iter()
        .filter(|t| serie.map_or(true, |s| s == t.serie))
        .cloned()
        .collect();

    let unassigned = chart
        .unassigned(shift)
        .iter()
        .filter_map(|id| {
            students
                .as_ref()
                .and_then(|all| all.iter().find(|s| s.id == *id))
        })
        .map(|s| UnassignedStudent {
            id: s.id.clone(),
            full_name: s.full_name.clone(),
            class: s.class.clone(),
            gender: s.gender,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ChartResponse {
        shift,
        generated_at: generation.generated_at,
        tables,
        unassigned,
    }))
}

// Spreadsheet export endpoint
async fn export_chart(
    shift: web::Path<String>,
    query: web::Query<SerieQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let filter = match parse_filter(&shift, query.serie) {
        Ok((shift, serie)) => ExportFilter {
            shift: Some(shift),
            serie,
        },
        Err(response) => return Ok(response),
    };

    let history = lock(&state.history)?;
    let Some(chart) = history.current_chart() else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Chart not available"})));
    };

    let mut body = Vec::new();
    export_chart_csv(chart, &filter, &mut body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Export failed: {}", e)))?;
    let file_name = export_file_name(&filter, Utc::now().date_naive());

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(body))
}

// Stats endpoint
async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let students = lock(&state.students)?;
    let Some(ref students) = *students else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No data available"})));
    };

    let mut class_counts: BTreeMap<String, ClassStats> = BTreeMap::new();
    for student in students {
        let stats = class_counts.entry(student.class.clone()).or_default();
        match student.gender {
            Gender::Male => stats.boys += 1,
            Gender::Female => stats.girls += 1,
        }
    }

    let capacity = Shift::ALL
        .iter()
        .map(|&shift| {
            let layout = state.layout.shift(shift);
            ShiftCapacity {
                shift,
                tables: layout.table_count(),
                boy_seats: layout.boy_capacity(),
                girl_seats: layout.girl_capacity(),
            }
        })
        .collect();

    let unassigned = lock(&state.history)?.current_chart().map(unassigned_counts);

    Ok(HttpResponse::Ok().json(StatsResponse {
        class_counts,
        capacity,
        unassigned,
    }))
}

/// Registers the API routes
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(admin_login))
        .route("/api/roster", web::post().to(upload_roster))
        .route("/api/generate", web::post().to(generate_chart))
        .route("/api/undo", web::post().to(undo_chart))
        .route("/api/assignments", web::post().to(save_chart_assignments))
        .route("/api/stats", web::get().to(get_stats))
        .service(web::resource("/api/chart/{shift}").route(web::get().to(get_chart)))
        .service(web::resource("/api/export/{shift}").route(web::get().to(export_chart)));
}

pub async fn start_server(
    config: &Config,
    students: Option<Vec<EnrolledStudent>>,
    chart: Option<SeatingChart>,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::preloaded(config, students, chart));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
