/// Handler Module Index
///
/// One module per resource family. Every handler takes its dependencies from
/// the shared AppState and returns `Result<_, ApiError>`, so status-code and
/// body wording decisions live in the error layer, not here.
pub mod admin;
pub mod auth;
pub mod certificates;
pub mod courses;
pub mod dashboards;
pub mod enrollments;
pub mod jobs;
pub mod quizzes;
pub mod uploads;
