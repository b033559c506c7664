use axum::extract::State;

use crate::{AppState, error::AppError, utils::ClientIp};

#[axum::debug_handler]
pub async fn ping(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> Result<&'static str, AppError> {
    if let Err(e) = state.visits.record_ping(&ip).await {
        tracing::error!(ip = %ip, error = %e, "Failed to record ping");
        return Err(AppError::RecordVisit(e));
    }

    tracing::info!(ip = %ip, "Ping recorded");
    Ok("pong")
}

#[axum::debug_handler]
pub async fn visit_count(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> Result<String, AppError> {
    match state.visits.get_visit_count(&ip).await {
        Ok(count) => {
            tracing::info!(ip = %ip, count, "Visit count retrieved");
            Ok(count.to_string())
        }
        Err(e) => {
            tracing::error!(ip = %ip, error = %e, "Failed to get visit count");
            Err(AppError::GetVisitCount(e))
        }
    }
}
