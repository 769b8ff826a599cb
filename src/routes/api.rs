//! JSON view of the facility directory.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::assistant::Recipient;
use crate::facility::Facility;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FacilitiesQuery {
    /// Restrict to facilities treating this recipient; all facilities if absent
    pub recipient: Option<Recipient>,
}

#[derive(Debug, Serialize)]
pub struct FacilitiesResponse {
    pub recipient: Option<Recipient>,
    pub facilities: Vec<Facility>,
}

/// GET /api/facilities?recipient=human|animal
#[instrument(name = "api::facilities", skip(state))]
pub async fn facilities(
    State(state): State<AppState>,
    Query(query): Query<FacilitiesQuery>,
) -> Json<FacilitiesResponse> {
    let facilities = match query.recipient {
        Some(recipient) => state
            .facilities
            .for_recipient(recipient)
            .into_iter()
            .cloned()
            .collect(),
        None => state.facilities.all().to_vec(),
    };

    Json(FacilitiesResponse {
        recipient: query.recipient,
        facilities,
    })
}
