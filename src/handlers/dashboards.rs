use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::{AuthPrincipal, require_admin},
    error::ApiError,
    models::{AdminDashboardStats, StudentDashboard},
};

/// get_admin_stats
///
/// [Admin Route] Core application counters for the administrative dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>, ApiError> {
    require_admin(&principal)?;
    Ok(Json(state.repo.get_admin_stats().await?))
}

/// get_my_dashboard
///
/// [Authenticated Route] Activity summary for the requesting youth account:
/// enrollments by status, passed attempts, certificates earned.
#[utoipa::path(
    get,
    path = "/me/dashboard",
    responses((status = 200, description = "My activity", body = StudentDashboard))
)]
pub async fn get_my_dashboard(
    principal: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<StudentDashboard>, ApiError> {
    Ok(Json(state.repo.get_student_dashboard(principal.id).await?))
}
