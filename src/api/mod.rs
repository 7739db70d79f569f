// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    IntoParams, Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        middleware::{enforce_access_policy, identity_filter},
        OptionalAuth, Role,
    },
    error::ApiError,
    models::{
        Address, AddressUpdate, DoctorDetails, DoctorListItem, DoctorRegistration, DoctorUpdate,
        PatientDetails, PatientListItem, PatientRegistration, PatientUpdate, Specialty,
        DEFAULT_PAGE_SIZE,
    },
    state::AppState,
};

pub mod auth;
pub mod doctors;
pub mod extract;
pub mod patients;

/// Paging query for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Zero-based page number
    #[serde(default)]
    pub page: usize,
    /// Page size, at most 100
    #[serde(default = "default_page_size")]
    pub size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(auth::login))
        .route(
            "/medicos",
            get(doctors::list_doctors)
                .post(doctors::register_doctor)
                .put(doctors::update_doctor),
        )
        .route(
            "/medicos/{id}",
            get(doctors::doctor_details).delete(doctors::deactivate_doctor),
        )
        .route(
            "/pacientes",
            get(patients::list_patients)
                .post(patients::register_patient)
                .put(patients::update_patient),
        )
        .route(
            "/pacientes/{id}",
            get(patients::patient_details).delete(patients::deactivate_patient),
        )
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // Innermost first: the policy runs after the identity filter, both
        // inside tracing; CORS answers preflights before anything else.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_access_policy,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), identity_filter))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(OptionalAuth(user): OptionalAuth, uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), user_id = user.map(|u| u.user_id), "No route");
    ApiError::not_found("No resource at this path")
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        doctors::list_doctors,
        doctors::register_doctor,
        doctors::update_doctor,
        doctors::deactivate_doctor,
        doctors::doctor_details,
        patients::list_patients,
        patients::register_patient,
        patients::update_patient,
        patients::deactivate_patient,
        patients::patient_details
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::LoginResponse,
            doctors::DoctorResponse,
            patients::PatientResponse,
            Address,
            AddressUpdate,
            Specialty,
            Role,
            DoctorRegistration,
            DoctorUpdate,
            DoctorDetails,
            DoctorListItem,
            PatientRegistration,
            PatientUpdate,
            PatientDetails,
            PatientListItem
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Authentication", description = "Login and token issuance"),
        (name = "Doctors", description = "Doctor records"),
        (name = "Patients", description = "Patient records")
    )
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessPolicy, AccessRule, AuthenticatedUser, Requirement, TokenCodec};
    use crate::state::tests::{test_state, TEST_PASSWORD};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn login(app: &Router, login: &str) -> String {
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "login": login, "clave": TEST_PASSWORD })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login as {login}: {body}");
        body["authenticationToken"].as_str().unwrap().to_string()
    }

    async fn seed_doctors(state: &AppState, count: usize) {
        let mut store = state.store.write().await;
        for i in 1..=count {
            store
                .create_doctor(DoctorRegistration {
                    name: format!("Doctor {i}"),
                    email: format!("doctor{i}@voll.med"),
                    phone: "555-0000".to_string(),
                    document: format!("{:04}", 1000 + i),
                    specialty: Some(Specialty::Pediatria),
                    address: Some(Address {
                        street: "Calle 1".to_string(),
                        district: "Centro".to_string(),
                        city: "Lima".to_string(),
                        number: "1".to_string(),
                        complement: None,
                    }),
                })
                .unwrap();
        }
    }

    #[tokio::test]
    async fn login_returns_token_envelope() {
        let app = router(test_state().await);
        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "login": "dr.ana", "clave": TEST_PASSWORD })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "AUTH_SUCCESS");
        assert!(!body["authenticationToken"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let app = router(test_state().await);
        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "login": "dr.ana", "clave": "wrong" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "ERR_INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unreadable_login_body_is_bad_request() {
        let app = router(test_state().await);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ERR_INVALID_REQUEST");
    }

    #[tokio::test]
    async fn admin_deletes_doctor_but_not_patient() {
        let state = test_state().await;
        seed_doctors(&state, 5).await;
        let app = router(state.clone());
        let token = login(&app, "dr.ana").await;

        let (status, _) = send(&app, request(Method::DELETE, "/medicos/5", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!state.store.read().await.doctor(5).unwrap().active);

        let (status, body) =
            send(&app, request(Method::DELETE, "/pacientes/5", Some(&token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "ERR_ACCESS_DENIED");
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let app = router(test_state().await);
        for uri in ["/medicos/1", "/medicos"] {
            let (status, body) = send(&app, request(Method::GET, uri, Some("garbage"), None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "ERR_MALFORMED_TOKEN");
        }
    }

    #[tokio::test]
    async fn empty_bearer_token_is_malformed() {
        let app = router(test_state().await);
        let (status, body) = send(&app, request(Method::GET, "/medicos/1", Some(""), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ERR_MALFORMED_TOKEN");
    }

    #[tokio::test]
    async fn bad_path_and_query_render_json_errors() {
        let app = router(test_state().await);
        let token = login(&app, "dr.ana").await;

        for uri in ["/medicos/abc", "/medicos/-1", "/medicos?page=abc"] {
            let (status, body) = send(&app, request(Method::GET, uri, Some(&token), None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "ERR_INVALID_REQUEST", "{uri}");
            assert!(body["message"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn unsupported_method_renders_json_error() {
        let app = router(test_state().await);
        let token = login(&app, "dr.ana").await;
        let (status, body) = send(&app, request(Method::PATCH, "/medicos", Some(&token), None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["code"], "ERR_METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn anonymous_requests_need_authentication() {
        let app = router(test_state().await);
        for (method, uri) in [
            (Method::GET, "/medicos"),
            (Method::DELETE, "/pacientes/1"),
            (Method::GET, "/no-such-route"),
        ] {
            let (status, body) = send(&app, request(method, uri, None, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["code"], "ERR_AUTHENTICATION_REQUIRED");
        }
    }

    #[tokio::test]
    async fn expired_and_foreign_tokens_are_rejected() {
        let state = test_state().await;
        let app = router(state.clone());
        let ana = AuthenticatedUser {
            user_id: 1,
            login: "dr.ana".to_string(),
            role: Role::Admin,
        };

        let expired = state.tokens.issue_at(&ana, 1_000_000_000).unwrap();
        let (status, body) = send(&app, request(Method::GET, "/medicos", Some(&expired), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "ERR_TOKEN_EXPIRED");

        let foreign = TokenCodec::from_secret(b"some-other-secret-of-enough-length!")
            .unwrap()
            .issue(&ana)
            .unwrap();
        let (status, body) = send(&app, request(Method::GET, "/medicos", Some(&foreign), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "ERR_INVALID_TOKEN");
    }

    #[tokio::test]
    async fn token_for_removed_user_is_anonymous() {
        let state = test_state().await;
        let app = router(state.clone());
        let ghost = AuthenticatedUser {
            user_id: 77,
            login: "ghost".to_string(),
            role: Role::Admin,
        };
        let token = state.tokens.issue(&ghost).unwrap();

        let (status, body) = send(&app, request(Method::GET, "/medicos", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "ERR_AUTHENTICATION_REQUIRED");
    }

    #[tokio::test]
    async fn roles_follow_the_clinic_policy() {
        let state = test_state().await;
        seed_doctors(&state, 1).await;
        let app = router(state);
        let patient = login(&app, "paty").await;
        let medic = login(&app, "dr.luis").await;

        let (status, body) = send(&app, request(Method::GET, "/medicos", Some(&patient), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalElements"], 1);

        let (status, _) = send(&app, request(Method::GET, "/pacientes", Some(&patient), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, request(Method::DELETE, "/medicos/1", Some(&medic), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The medic passes the policy; the handler then finds no patient.
        let (status, body) =
            send(&app, request(Method::DELETE, "/pacientes/1", Some(&medic), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ERR_RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn admin_registers_doctor_through_router() {
        let app = router(test_state().await);
        let token = login(&app, "dr.ana").await;
        let doctor = json!({
            "nombre": "Rosa",
            "email": "rosa@voll.med",
            "telefono": "555-0101",
            "documento": "123456",
            "especialidad": "CARDIOLOGIA",
            "direccion": {
                "calle": "Av. Central",
                "distrito": "Norte",
                "ciudad": "Lima",
                "numero": "100"
            }
        });

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/medicos", Some(&token), Some(doctor.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/medicos/1");
        assert!(response.headers().contains_key("x-request-id"));

        let mut bad = doctor;
        bad["especialidad"] = json!("DERMATOLOGIA");
        bad["email"] = json!("otra@voll.med");
        let (status, body) = send(&app, request(Method::POST, "/medicos", Some(&token), Some(bad))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ERR_INVALID_SPECIALITY");
    }

    #[tokio::test]
    async fn validation_errors_are_listed_per_field() {
        let app = router(test_state().await);
        let token = login(&app, "dr.luis").await;
        let (status, body) = send(
            &app,
            request(Method::POST, "/pacientes", Some(&token), Some(json!({ "nombre": "" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ERR_VALIDATION_FAILED");
        assert!(body["errors"]["nombre"].is_string());
        assert!(body["errors"]["direccion"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_once_authenticated() {
        let app = router(test_state().await);
        let token = login(&app, "paty").await;
        let (status, body) = send(&app, request(Method::GET, "/consultas", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ERR_RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn custom_policy_replaces_the_clinic_rules() {
        let policy = AccessPolicy::new(vec![
            AccessRule::new(Method::POST, &["/login"], Requirement::Public),
            AccessRule::any_method(&["/medicos/**"], Requirement::Public),
        ]);
        let app = router(test_state().await.with_policy(policy));

        let (status, _) = send(&app, request(Method::GET, "/medicos", None, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, request(Method::GET, "/pacientes", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for expected in ["/login", "/medicos", "/medicos/{id}", "/pacientes", "/pacientes/{id}"] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
        assert!(doc
            .components
            .unwrap()
            .security_schemes
            .contains_key("bearer_auth"));
    }
}
