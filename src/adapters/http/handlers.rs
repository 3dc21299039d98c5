//! API Handlers
//!
//! Thin async wrappers: extract, lock the session, delegate to the
//! dashboard use case, persist snapshots after mutations, map errors.
//! No business logic lives here.

use std::str::FromStr;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::adapters::csv;
use crate::config::UserSettings;
use crate::domain::fee_table::{FeeTable, ShopVariant};
use crate::domain::fees::FeeBreakdown;
use crate::domain::product::SourceKind;
use crate::usecases::analytics::{self, CategoryProfit, DashboardStats, ProfitPoint};
use crate::usecases::view::{SortField, SortOrder, StatusFilter, TableQuery, TableRow};

/// Bars on each side of the profit-extremes chart.
const PROFIT_EXTREMES_N: usize = 5;

// ── Probes and metrics ──────────────────────────────────────

pub async fn live() -> StatusCode {
    StatusCode::OK
}

pub async fn ready(State(state): State<AppState>) -> StatusCode {
    if *state.health_rx.borrow() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

// ── Source uploads ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub source: SourceKind,
    pub rows: usize,
    pub products: usize,
}

pub async fn upload_source(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<Json<UploadSummary>, ApiError> {
    let source = SourceKind::from_str(&kind).map_err(|()| ApiError::BadParam {
        what: "source kind",
        value: kind,
    })?;

    let started = Instant::now();
    let mut dashboard = state.dashboard.write().await;
    let rows = match source {
        SourceKind::Info => {
            let rows = csv::parse_info(&body)?;
            let n = rows.len();
            dashboard.load_info(rows);
            n
        }
        SourceKind::Inventory => {
            let rows = csv::parse_inventory(&body)?;
            let n = rows.len();
            dashboard.load_inventory(rows);
            n
        }
        SourceKind::Pricing => {
            let rows = csv::parse_pricing(&body)?;
            let n = rows.len();
            dashboard.load_pricing(rows);
            n
        }
    };

    let products = dashboard.products().len();
    drop(dashboard);

    let source_label = source.to_string();
    state
        .metrics
        .source_rows
        .with_label_values(&[source_label.as_str()])
        .set(rows as i64);
    observe_merge(&state, started, products);

    Ok(Json(UploadSummary {
        source,
        rows,
        products,
    }))
}

// ── Table, stats, charts ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TableParams {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub group: bool,
}

pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Json<Vec<TableRow>> {
    let dashboard = state.dashboard.read().await;
    let query = TableQuery {
        search: params.search,
        category: params.category,
        status: params.status,
        sort_field: params.sort.unwrap_or(SortField::Profit),
        sort_order: params.order.unwrap_or(SortOrder::Asc),
        group_variants: params.group,
        low_stock_threshold: dashboard.settings().low_stock_threshold,
        best_seller_limit: state.best_seller_limit,
    };
    Json(dashboard.rows(&query))
}

pub async fn stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let dashboard = state.dashboard.read().await;
    Json(analytics::stats(
        dashboard.products(),
        dashboard.settings().low_stock_threshold,
    ))
}

#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    pub profit_extremes: Vec<ProfitPoint>,
    pub profit_by_category: Vec<CategoryProfit>,
}

pub async fn charts(State(state): State<AppState>) -> Json<ChartsResponse> {
    let dashboard = state.dashboard.read().await;
    Json(ChartsResponse {
        profit_extremes: analytics::profit_extremes(dashboard.products(), PROFIT_EXTREMES_N),
        profit_by_category: analytics::profit_by_category(
            dashboard.products(),
            dashboard.active_table(),
        ),
    })
}

// ── Settings ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SettingsPatch {
    pub shop_variant: Option<ShopVariant>,
    pub service_fee_enabled: Option<bool>,
    pub low_stock_threshold: Option<i64>,
}

pub async fn get_settings(State(state): State<AppState>) -> Json<UserSettings> {
    let dashboard = state.dashboard.read().await;
    Json(*dashboard.settings())
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<UserSettings>, ApiError> {
    if let Some(threshold) = patch.low_stock_threshold {
        if threshold < 0 {
            return Err(ApiError::BadRequest(
                "low_stock_threshold must be >= 0".to_string(),
            ));
        }
    }

    let remerges = patch.shop_variant.is_some() || patch.service_fee_enabled.is_some();
    let started = Instant::now();
    let mut dashboard = state.dashboard.write().await;

    if let Some(variant) = patch.shop_variant {
        dashboard.set_shop_variant(variant);
    }
    if let Some(enabled) = patch.service_fee_enabled {
        dashboard.set_service_fee_enabled(enabled);
    }
    if let Some(threshold) = patch.low_stock_threshold {
        dashboard.set_low_stock_threshold(threshold);
    }

    let settings = *dashboard.settings();
    let products = dashboard.products().len();
    drop(dashboard);

    if remerges {
        observe_merge(&state, started, products);
    }
    state.settings_store.save(&settings).await?;

    Ok(Json(settings))
}

// ── Overrides and fee detail ────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
    pub category_id: String,
}

pub async fn set_override(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Json(body): Json<OverrideBody>,
) -> Result<StatusCode, ApiError> {
    if body.category_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "category_id must not be empty".to_string(),
        ));
    }

    let started = Instant::now();
    let mut dashboard = state.dashboard.write().await;
    if !dashboard.set_override(&sku, &body.category_id) {
        return Err(ApiError::BadRequest("sku must not be blank".to_string()));
    }

    let products = dashboard.products().len();
    let entries = dashboard.override_entries();
    drop(dashboard);

    observe_merge(&state, started, products);
    state.overrides_store.save(&entries).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn fee_detail(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<FeeBreakdown>, ApiError> {
    let dashboard = state.dashboard.read().await;
    dashboard
        .fee_detail(&sku)
        .map(Json)
        .ok_or(ApiError::NotFound(sku))
}

// ── Fee tables ──────────────────────────────────────────────

pub async fn get_fee_table(
    State(state): State<AppState>,
    Path(variant): Path<String>,
) -> Result<Json<FeeTable>, ApiError> {
    let variant = parse_variant(variant)?;
    let dashboard = state.dashboard.read().await;
    Ok(Json(dashboard.table(variant).clone()))
}

pub async fn update_fee_table(
    State(state): State<AppState>,
    Path(variant): Path<String>,
    Json(table): Json<FeeTable>,
) -> Result<StatusCode, ApiError> {
    let variant = parse_variant(variant)?;

    let started = Instant::now();
    let mut dashboard = state.dashboard.write().await;
    dashboard.update_fee_table(variant, table)?;
    let products = dashboard.products().len();
    drop(dashboard);

    observe_merge(&state, started, products);
    Ok(StatusCode::NO_CONTENT)
}

fn parse_variant(raw: String) -> Result<ShopVariant, ApiError> {
    ShopVariant::from_str(&raw).map_err(|()| ApiError::BadParam {
        what: "shop variant",
        value: raw,
    })
}

// ── Export and chat ─────────────────────────────────────────

pub async fn export(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dashboard = state.dashboard.read().await;
    let bytes = csv::export_report(dashboard.products(), dashboard.active_table())?;
    let filename = csv::report_filename(
        dashboard.settings().shop_variant,
        chrono::Utc::now().date_naive(),
    );
    drop(dashboard);

    state.metrics.exports_total.inc();

    let headers = [
        (
            header::CONTENT_TYPE,
            "text/csv; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let Some(analyst) = state.analyst.clone() else {
        state
            .metrics
            .chat_requests
            .with_label_values(&["unavailable"])
            .inc();
        return Err(ApiError::ChatUnavailable);
    };

    // Serialize the context under the read lock, call upstream after
    // releasing it; a slow model must not block uploads.
    let context = {
        let dashboard = state.dashboard.read().await;
        let settings = dashboard.settings();
        analytics::chat_context(
            dashboard.products(),
            settings.shop_variant,
            settings.service_fee_enabled,
            settings.low_stock_threshold,
            state.summary_limit,
        )
        .to_json()
    };

    match analyst.analyze(&context, question).await {
        Ok(answer) => {
            state
                .metrics
                .chat_requests
                .with_label_values(&["ok"])
                .inc();
            Ok(Json(ChatResponse { answer }))
        }
        Err(e) => {
            state
                .metrics
                .chat_requests
                .with_label_values(&["error"])
                .inc();
            Err(ApiError::Upstream(e))
        }
    }
}

fn observe_merge(state: &AppState, started: Instant, products: usize) {
    state.metrics.merges_total.inc();
    state
        .metrics
        .merge_duration_seconds
        .observe(started.elapsed().as_secs_f64());
    state.metrics.products_merged.set(products as i64);
}
