use crate::controller::{dispatch, select_tab, CallbackRequest, Event, Update};
use crate::errors::AppError;
use crate::models::RegionSummary;
use crate::state::AppState;
use crate::ui::{render_index, TabId};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Html,
    Json,
};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.dashboard))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<Vec<RegionSummary>> {
    Json(state.dashboard.region_summary.clone())
}

pub async fn get_tab(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Json<Update>, AppError> {
    let tab = TabId::parse(&tab).ok_or_else(|| AppError::not_found(format!("unknown tab '{tab}'")))?;
    Ok(Json(select_tab(&state.dashboard, tab)))
}

pub async fn callback(
    State(state): State<AppState>,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> Result<Json<Update>, AppError> {
    let Json(payload) = payload?;
    debug!("callback from '{}'", payload.input);
    let event = Event::try_from(payload)?;
    Ok(Json(dispatch(&state.dashboard, event)))
}
