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
    models::{Page, PatientDetails, PatientListItem, PatientRegistration, PatientUpdate},
    state::AppState,
};

/// Envelope returned by patient writes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientResponse {
    /// `CREATED` or `UPDATED`
    pub code: String,
    pub message: String,
    #[serde(rename = "paciente")]
    pub patient: PatientDetails,
}

#[utoipa::path(
    get,
    path = "/pacientes",
    params(PageParams),
    tag = "Patients",
    security(("bearer_auth" = [])),
    responses((status = 200, body = Page<PatientListItem>))
)]
pub async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<PatientListItem>>, ApiError> {
    let store = state.store.read().await;
    let items = store
        .active_patients()
        .into_iter()
        .map(PatientListItem::from)
        .collect();
    Ok(Json(Page::of(items, params.page, params.size)))
}

#[utoipa::path(
    post,
    path = "/pacientes",
    request_body = PatientRegistration,
    tag = "Patients",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = PatientResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email and document already registered"),
    )
)]
pub async fn register_patient(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<PatientRegistration>,
) -> Result<(StatusCode, HeaderMap, Json<PatientResponse>), ApiError> {
    request.validate().map_err(ApiError::validation)?;

    let patient = state.store.write().await.create_patient(request)?;
    tracing::info!(patient_id = patient.id, by = %user.login, "Patient registered");

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/pacientes/{}", patient.id))
        .map_err(ApiError::internal)?;
    headers.insert(LOCATION, location);

    Ok((
        StatusCode::CREATED,
        headers,
        Json(PatientResponse {
            code: "CREATED".to_string(),
            message: "Patient registered.".to_string(),
            patient: PatientDetails::from(&patient),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/pacientes",
    request_body = PatientUpdate,
    tag = "Patients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = PatientResponse),
        (status = 404, description = "No patient with this id"),
    )
)]
pub async fn update_patient(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(update): ApiJson<PatientUpdate>,
) -> Result<Json<PatientResponse>, ApiError> {
    update.validate().map_err(ApiError::validation)?;

    let patient = state.store.write().await.update_patient(&update)?;
    tracing::info!(patient_id = patient.id, by = %user.login, "Patient updated");

    Ok(Json(PatientResponse {
        code: "UPDATED".to_string(),
        message: "Patient updated.".to_string(),
        patient: PatientDetails::from(&patient),
    }))
}

#[utoipa::path(
    delete,
    path = "/pacientes/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    tag = "Patients",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Patient deactivated"),
        (status = 404, description = "No patient with this id"),
    )
)]
pub async fn deactivate_patient(
    ApiPath(id): ApiPath<u64>,
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.deactivate_patient(id)?;
    tracing::info!(patient_id = id, by = %user.login, "Patient deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/pacientes/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    tag = "Patients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = PatientDetails),
        (status = 404, description = "No patient with this id"),
    )
)]
pub async fn patient_details(
    ApiPath(id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<PatientDetails>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(PatientDetails::from(store.patient(id)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::models::Address;
    use crate::state::tests::test_state;

    fn medic() -> Auth {
        Auth(AuthenticatedUser {
            user_id: 2,
            login: "dr.luis".to_string(),
            role: Role::UserMedic,
        })
    }

    fn registration(name: &str, email: &str, document: &str) -> PatientRegistration {
        PatientRegistration {
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0202".to_string(),
            identity_document: document.to_string(),
            address: Some(Address {
                street: "Jr. Union".to_string(),
                district: "Sur".to_string(),
                city: "Arequipa".to_string(),
                number: "7".to_string(),
                complement: Some("Dpto 3".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn register_then_fetch() {
        let state = test_state().await;
        let (status, headers, Json(body)) = register_patient(
            State(state.clone()),
            medic(),
            ApiJson(registration("Paula", "paula@mail.pe", "40123456")),
        )
        .await
        .expect("registration succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.code, "CREATED");
        assert_eq!(headers[LOCATION], format!("/pacientes/{}", body.patient.id).as_str());

        let Json(details) = patient_details(ApiPath(body.patient.id), State(state))
            .await
            .unwrap();
        assert_eq!(details, body.patient);
    }

    #[tokio::test]
    async fn missing_address_fails_validation() {
        let state = test_state().await;
        let mut request = registration("Paula", "paula@mail.pe", "40123456");
        request.address = None;

        let err = register_patient(State(state), medic(), ApiJson(request))
            .await
            .unwrap_err();
        assert_eq!(err.code, "ERR_VALIDATION_FAILED");
        assert!(err.errors.unwrap().contains_key("direccion"));
    }

    #[tokio::test]
    async fn deactivated_patient_leaves_listing() {
        let state = test_state().await;
        let (_, _, Json(body)) = register_patient(
            State(state.clone()),
            medic(),
            ApiJson(registration("Paula", "paula@mail.pe", "40123456")),
        )
        .await
        .unwrap();

        let status = deactivate_patient(ApiPath(body.patient.id), State(state.clone()), medic())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(page) = list_patients(State(state), ApiQuery(PageParams::default()))
            .await
            .unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn update_without_id_fails_validation() {
        let state = test_state().await;
        let err = update_patient(
            State(state),
            medic(),
            ApiJson(PatientUpdate {
                name: Some("Paula".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.errors.unwrap().contains_key("id"));
    }
}
