//! # API REST
//!
//! REST API implementation for the cathlab wizard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (JSON serialization, CORS, session storage)
//!
//! Uses `api-shared` for request/response types.

#![warn(rust_2018_idioms)]

pub mod store;

use api_shared::{
    CostSummaryRes, EquipmentReq, HealthRes, HealthService, ListCatalogRes, ListOperationsRes,
    ListSchemesRes, OperationReq, OperationRes, PatientReq, QuoteReq, SchemeRes, SessionRes,
};
use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use cathlab_core::{
    calculate, CathlabError, CathlabResult, CoreConfig, EquipmentSelection, NonEmptyText,
    OperationChoice, PatientInfo, ReceiptFont, ReferenceData, Scheme, Session, RECEIPT_FILENAME,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use uuid::Uuid;

pub use store::SessionStore;

type ApiError = (StatusCode, String);

/// Application state for the REST API server
///
/// Shared by every request handler. Reference data and the receipt font are
/// loaded once; sessions live in the in-memory store.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    reference: Arc<ReferenceData>,
    font: Arc<ReceiptFont>,
    sessions: SessionStore,
}

impl AppState {
    /// Loads the catalog, procedure book and receipt font named by `cfg`.
    ///
    /// # Errors
    /// Returns a `CathlabError` if any of them cannot be read.
    pub fn load(cfg: Arc<CoreConfig>) -> CathlabResult<Self> {
        let reference = Arc::new(ReferenceData::load(&cfg)?);
        let font = Arc::new(ReceiptFont::load(cfg.receipt_font())?);
        Ok(Self::new(cfg, reference, font))
    }

    pub fn new(cfg: Arc<CoreConfig>, reference: Arc<ReferenceData>, font: Arc<ReceiptFont>) -> Self {
        let sessions = SessionStore::new(cfg.session_ttl_minutes());
        Self {
            cfg,
            reference,
            font,
            sessions,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_schemes,
        list_catalog,
        list_operations,
        quote,
        create_session,
        get_session,
        delete_session,
        submit_patient,
        choose_operation,
        set_equipment,
        next_step,
        previous_step,
        session_summary,
        session_receipt,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::SchemeRes,
        api_shared::ListSchemesRes,
        api_shared::SchemeRateRes,
        api_shared::CatalogItemRes,
        api_shared::ListCatalogRes,
        api_shared::QuantityDto,
        api_shared::OperationRes,
        api_shared::ListOperationsRes,
        api_shared::QuoteReq,
        api_shared::CostLineRes,
        api_shared::CostSummaryRes,
        api_shared::PatientReq,
        api_shared::PatientRes,
        api_shared::OperationReq,
        api_shared::EquipmentReq,
        api_shared::EquipmentRowRes,
        api_shared::SessionRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with CORS and the OpenAPI document mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schemes", get(list_schemes))
        .route("/catalog", get(list_catalog))
        .route("/operations", get(list_operations))
        .route("/quote", post(quote))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/patient", put(submit_patient))
        .route("/sessions/:id/operation", put(choose_operation))
        .route("/sessions/:id/equipment", put(set_equipment))
        .route("/sessions/:id/next", post(next_step))
        .route("/sessions/:id/previous", post(previous_step))
        .route("/sessions/:id/summary", get(session_summary))
        .route("/sessions/:id/receipt", get(session_receipt))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a domain error to a status code and logs it.
fn reject(context: &str, e: CathlabError) -> ApiError {
    tracing::error!("{} error: {:?}", context, e);
    let status = match &e {
        CathlabError::WrongStep { .. }
        | CathlabError::NoPreviousStep(_)
        | CathlabError::NoNextStep(_) => StatusCode::CONFLICT,
        CathlabError::InvalidInput(_)
        | CathlabError::Text(_)
        | CathlabError::UnknownOperation(_)
        | CathlabError::UnknownEquipment(_)
        | CathlabError::LimitedQuantity { .. }
        | CathlabError::UnknownScheme(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Internal error".to_string()
    } else {
        e.to_string()
    };
    (status, message)
}

fn session_not_found(id: &str) -> ApiError {
    tracing::error!("Unknown session: {}", id);
    (StatusCode::NOT_FOUND, format!("no session with id '{id}'"))
}

/// Runs `f` against the session named in the path.
fn with_session<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut Session) -> T,
) -> Result<T, ApiError> {
    let uuid = Uuid::parse_str(id).map_err(|_| session_not_found(id))?;
    state
        .sessions
        .with_session(&uuid, f)
        .ok_or_else(|| session_not_found(id))
}

fn session_res(state: &AppState, id: &str, session: &Session) -> SessionRes {
    SessionRes::from_session(id, session, state.cfg.currency())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/schemes",
    responses(
        (status = 200, description = "Healthcare schemes in form order", body = ListSchemesRes)
    )
)]
#[axum::debug_handler]
async fn list_schemes() -> Json<ListSchemesRes> {
    Json(ListSchemesRes {
        schemes: Scheme::ALL.into_iter().map(SchemeRes::from).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Equipment catalog in file order", body = ListCatalogRes)
    )
)]
#[axum::debug_handler]
async fn list_catalog(State(state): State<AppState>) -> Json<ListCatalogRes> {
    Json(ListCatalogRes::from(state.reference.as_ref()))
}

#[utoipa::path(
    get,
    path = "/operations",
    responses(
        (status = 200, description = "Operation presets", body = ListOperationsRes)
    )
)]
#[axum::debug_handler]
async fn list_operations(State(state): State<AppState>) -> Json<ListOperationsRes> {
    Json(ListOperationsRes {
        operations: state
            .reference
            .procedures
            .operations()
            .iter()
            .map(OperationRes::from)
            .collect(),
    })
}

#[utoipa::path(
    post,
    path = "/quote",
    request_body = QuoteReq,
    responses(
        (status = 200, description = "Totals for the given quantities", body = CostSummaryRes),
        (status = 422, description = "Unknown scheme or invalid quantity")
    )
)]
/// Prices a selection without creating a session
///
/// # Errors
/// Returns `422 Unprocessable Entity` if:
/// - the scheme is neither a known code nor a known label,
/// - a limited item is given a quantity above 1.
#[axum::debug_handler]
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteReq>,
) -> Result<Json<CostSummaryRes>, ApiError> {
    let scheme = Scheme::parse(&req.scheme).map_err(|e| reject("Quote", e))?;
    for q in &req.quantities {
        state
            .reference
            .procedures
            .check_quantity(&q.name, q.quantity)
            .map_err(|e| reject("Quote", e))?;
    }

    let selection =
        EquipmentSelection::from_quantities(req.quantities.into_iter().map(|q| (q.name, q.quantity)));
    let summary = calculate(&state.reference.catalog, &selection, scheme);
    Ok(Json(CostSummaryRes::from_summary(
        &summary,
        state.cfg.currency(),
    )))
}

#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created on the patient step", body = SessionRes)
    )
)]
#[axum::debug_handler]
async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionRes>) {
    let (id, session) = state.sessions.create(state.reference.clone());
    let id = id.to_string();
    tracing::info!("Created session {}", id);
    (StatusCode::CREATED, Json(session_res(&state, &id, &session)))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Current session state", body = SessionRes),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
async fn get_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SessionRes>, ApiError> {
    let res = with_session(&state, &id, |session| session_res(&state, &id, session))?;
    Ok(Json(res))
}

#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
async fn delete_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    let uuid = Uuid::parse_str(&id).map_err(|_| session_not_found(&id))?;
    if !state.sessions.remove(&uuid) {
        return Err(session_not_found(&id));
    }
    tracing::info!("Discarded session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/patient",
    params(("id" = String, Path, description = "Session id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient recorded", body = SessionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not on the patient step"),
        (status = 422, description = "Unknown scheme")
    )
)]
/// Records the patient form
///
/// Blank fields are accepted as-is. A missing scheme means "A".
///
/// # Errors
/// Returns:
/// - `404 Not Found` if the session does not exist,
/// - `409 Conflict` if the session is on another step,
/// - `422 Unprocessable Entity` if the scheme is not recognised.
#[axum::debug_handler]
async fn submit_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<PatientReq>,
) -> Result<Json<SessionRes>, ApiError> {
    let scheme = match req.scheme.as_deref() {
        Some(value) => Scheme::parse(value).map_err(|e| reject("Submit patient", e))?,
        None => Scheme::default(),
    };
    let patient = PatientInfo {
        first_name: req.first_name,
        last_name: req.last_name,
        record_id: req.record_id,
        diagnosis: req.diagnosis,
        scheme,
    };

    let res = with_session(&state, &id, |session| {
        session
            .submit_patient(patient)
            .map(|()| session_res(&state, &id, session))
    })?
    .map_err(|e| reject("Submit patient", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/operation",
    params(("id" = String, Path, description = "Session id")),
    request_body = OperationReq,
    responses(
        (status = 200, description = "Operation recorded", body = SessionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not on the operation step"),
        (status = 422, description = "Unknown preset")
    )
)]
/// Records the operation choice
///
/// With `custom` set the name is free text and may be blank; otherwise it must
/// name a preset exactly.
#[axum::debug_handler]
async fn choose_operation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<OperationReq>,
) -> Result<Json<SessionRes>, ApiError> {
    let choice = if req.custom {
        OperationChoice::Custom { name: req.name }
    } else {
        let name = NonEmptyText::new(&req.name)
            .map_err(|e| reject("Choose operation", CathlabError::from(e)))?;
        OperationChoice::Preset { name }
    };

    let res = with_session(&state, &id, |session| {
        session
            .choose_operation(choice)
            .map(|()| session_res(&state, &id, session))
    })?
    .map_err(|e| reject("Choose operation", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/equipment",
    params(("id" = String, Path, description = "Session id")),
    request_body = EquipmentReq,
    responses(
        (status = 200, description = "Quantities applied", body = SessionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not on the equipment step"),
        (status = 422, description = "Unknown item or limited item above 1")
    )
)]
/// Applies equipment quantities
///
/// The batch is all-or-nothing: one rejected entry leaves the selection untouched.
#[axum::debug_handler]
async fn set_equipment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<EquipmentReq>,
) -> Result<Json<SessionRes>, ApiError> {
    let res = with_session(&state, &id, |session| {
        session
            .set_quantities(req.quantities.iter().map(|q| (q.name.as_str(), q.quantity)))
            .map(|()| session_res(&state, &id, session))
    })?
    .map_err(|e| reject("Set equipment", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/next",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Moved to the next step", body = SessionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Already on the last step")
    )
)]
#[axum::debug_handler]
async fn next_step(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SessionRes>, ApiError> {
    let res = with_session(&state, &id, |session| {
        session.next().map(|_| session_res(&state, &id, session))
    })?
    .map_err(|e| reject("Next step", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/previous",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Moved to the previous step", body = SessionRes),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Already on the first step")
    )
)]
#[axum::debug_handler]
async fn previous_step(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SessionRes>, ApiError> {
    let res = with_session(&state, &id, |session| {
        session.previous().map(|_| session_res(&state, &id, session))
    })?
    .map_err(|e| reject("Previous step", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/summary",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Totals for the current selection", body = CostSummaryRes),
        (status = 404, description = "Unknown session")
    )
)]
/// Totals for the session's current selection and scheme, on any step
#[axum::debug_handler]
async fn session_summary(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<CostSummaryRes>, ApiError> {
    let summary = with_session(&state, &id, |session| session.compute_summary())?;
    Ok(Json(CostSummaryRes::from_summary(
        &summary,
        state.cfg.currency(),
    )))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/receipt",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Receipt PDF", body = [u8], content_type = "application/pdf"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not on the receipt step"),
        (status = 500, description = "Rendering failed")
    )
)]
/// Downloads the receipt as `summary.pdf`
///
/// The session is copied out of the store before rendering so the store lock is
/// not held while the PDF is built.
#[axum::debug_handler]
async fn session_receipt(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = with_session(&state, &id, |session| session.clone())?;
    let pdf = session
        .render_receipt(state.cfg.currency(), &state.font)
        .map_err(|e| reject("Render receipt", e))?;

    tracing::info!("Rendered receipt for session {} ({} bytes)", id, pdf.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{RECEIPT_FILENAME}\""),
            ),
        ],
        pdf,
    ))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
