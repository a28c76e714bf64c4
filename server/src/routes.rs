use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use chrono::Local;
use intake_ledger_core::{Credential, FieldValues, RecordSummary, Submission, matches_query};
use intake_ledger_store::TabularSource;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{error::AppError, state::AppState};

type SharedState<S> = State<Arc<AppState<S>>>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub view: Option<String>,
}

pub async fn submit_handler<S: TabularSource + 'static>(
    State(state): SharedState<S>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let credential = credential(&state, &headers)?;
    let Json(payload) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;
    let raw = field_values(payload)?;

    let today = Local::now().date_naive();
    let submission =
        Submission::prepare(state.store.schema(), raw, today).map_err(AppError::Validation)?;

    state
        .store
        .append_record(&credential, submission.fields())
        .await?;
    info!("Recorded submission");

    Ok(Json(json!({ "success": true })))
}

pub async fn list_handler<S: TabularSource + 'static>(
    State(state): SharedState<S>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let credential = credential(&state, &headers)?;
    let summary = match params.view.as_deref() {
        None | Some("full") => false,
        Some("summary") => true,
        Some(other) => {
            return Err(AppError::MalformedPayload(format!("unknown view '{other}'")));
        }
    };

    let query = params.q.unwrap_or_default();
    let records: Vec<_> = state
        .store
        .list_records(&credential)
        .await?
        .into_iter()
        .filter(|record| matches_query(record, &query))
        .collect();

    if summary {
        let summaries: Vec<RecordSummary> =
            records.iter().map(RecordSummary::from_record).collect();
        return Ok(Json(summaries).into_response());
    }
    Ok(Json(records).into_response())
}

pub async fn get_handler<S: TabularSource + 'static>(
    State(state): SharedState<S>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id: i64 = id.trim().parse().map_err(|_| AppError::MalformedId(id.clone()))?;
    let credential = credential(&state, &headers)?;

    let record = state.store.get_record(&credential, id).await?;
    Ok(Json(record).into_response())
}

pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// A bearer header wins; otherwise the configured credential is used.
fn credential<S>(state: &AppState<S>, headers: &HeaderMap) -> Result<Credential, AppError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("authorization header is not valid text"))?;
        return Credential::from_authorization_header(value)
            .ok_or(AppError::Unauthorized("only bearer tokens are accepted"));
    }
    state
        .default_credential
        .clone()
        .ok_or(AppError::Unauthorized("no credential configured"))
}

/// Accepts a flat JSON object. Strings are taken as-is, numbers and booleans
/// in their JSON text, and nulls are dropped.
fn field_values(payload: Value) -> Result<FieldValues, AppError> {
    let Value::Object(map) = payload else {
        return Err(AppError::MalformedPayload(
            "expected a JSON object of fields".to_string(),
        ));
    };

    let mut fields = FieldValues::new();
    for (key, value) in map {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(AppError::MalformedPayload(format!(
                    "field '{key}' must be a string"
                )));
            }
        };
        fields.insert(key, value);
    }
    Ok(fields)
}
