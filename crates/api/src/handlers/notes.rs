//! Handlers for the `/api/notes` resource.
//!
//! Minimal owned-content listing; the gate already enforces authentication
//! and entitlement for this path.

use artellico_db::models::note::NoteSummary;
use artellico_db::repositories::NoteRepo;
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/notes
pub async fn list_notes(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<DataResponse<Vec<NoteSummary>>>> {
    let notes = NoteRepo::list_for_user(&state.pool, current.user.id).await?;
    Ok(Json(DataResponse { data: notes }))
}
