// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    extract::{ApiJson, ApiPath, ApiQuery},
    PageParams,
};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{DoctorDetails, DoctorListItem, DoctorRegistration, DoctorUpdate, Page},
    state::AppState,
};

/// Envelope returned by doctor writes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorResponse {
    /// `CREATED` or `UPDATED`
    pub code: String,
    pub message: String,
    #[serde(rename = "medico")]
    pub doctor: DoctorDetails,
}

#[utoipa::path(
    get,
    path = "/medicos",
    params(PageParams),
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses((status = 200, body = Page<DoctorListItem>))
)]
pub async fn list_doctors(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<DoctorListItem>>, ApiError> {
    let store = state.store.read().await;
    let items = store
        .active_doctors()
        .into_iter()
        .map(DoctorListItem::from)
        .collect();
    Ok(Json(Page::of(items, params.page, params.size)))
}

#[utoipa::path(
    post,
    path = "/medicos",
    request_body = DoctorRegistration,
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = DoctorResponse),
        (status = 400, description = "Validation failed or unknown specialty"),
        (status = 409, description = "Email and document already registered"),
    )
)]
pub async fn register_doctor(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<DoctorRegistration>,
) -> Result<(StatusCode, HeaderMap, Json<DoctorResponse>), ApiError> {
    request.validate().map_err(ApiError::validation)?;

    let doctor = state.store.write().await.create_doctor(request)?;
    tracing::info!(doctor_id = doctor.id, by = %user.login, "Doctor registered");

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/medicos/{}", doctor.id))
        .map_err(ApiError::internal)?;
    headers.insert(LOCATION, location);

    Ok((
        StatusCode::CREATED,
        headers,
        Json(DoctorResponse {
            code: "CREATED".to_string(),
            message: "Doctor registered.".to_string(),
            doctor: DoctorDetails::from(&doctor),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/medicos",
    request_body = DoctorUpdate,
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = DoctorResponse),
        (status = 404, description = "No doctor with this id"),
    )
)]
pub async fn update_doctor(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(update): ApiJson<DoctorUpdate>,
) -> Result<Json<DoctorResponse>, ApiError> {
    update.validate().map_err(ApiError::validation)?;

    let doctor = state.store.write().await.update_doctor(&update)?;
    tracing::info!(doctor_id = doctor.id, by = %user.login, "Doctor updated");

    Ok(Json(DoctorResponse {
        code: "UPDATED".to_string(),
        message: "Doctor updated.".to_string(),
        doctor: DoctorDetails::from(&doctor),
    }))
}

#[utoipa::path(
    delete,
    path = "/medicos/{id}",
    params(("id" = u64, Path, description = "Doctor id")),
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Doctor deactivated"),
        (status = 404, description = "No doctor with this id"),
    )
)]
pub async fn deactivate_doctor(
    ApiPath(id): ApiPath<u64>,
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.deactivate_doctor(id)?;
    tracing::info!(doctor_id = id, by = %user.login, "Doctor deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/medicos/{id}",
    params(("id" = u64, Path, description = "Doctor id")),
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = DoctorDetails),
        (status = 404, description = "No doctor with this id"),
    )
)]
pub async fn doctor_details(
    ApiPath(id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<DoctorDetails>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(DoctorDetails::from(store.doctor(id)?)))
}
