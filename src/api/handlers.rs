//! Endpoint handlers. Each one runs a single store query and reshapes the
//! rows; the analytical endpoints pass them through `crate::analytics`.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;

use crate::analytics::{
    self, flare_ratio_pct, gas_oil_ratio, metrics::GAS_UNIT_M3, Observation, TypeCurvePoint,
    DEFAULT_HORIZON, DEFAULT_MAX_MONTH,
};
use crate::api::dto::{
    EfficiencyRow, FlaringRow, ForecastQuery, ForecastResponse, HealthResponse, KpiQuery,
    OperatorsResponse, ProductionRow, RankingQuery, ScenarioQuery, ScenarioResponse, SeriesQuery,
    StatusResponse, UncompletedWellsRow,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{split_list, ApiQuery};
use crate::api::state::AppState;
use crate::db::models::{OperatorKpis, OperatorRevenue};
use crate::db::ProductionFilter;
use crate::etl::canonical_operator;

const DEFAULT_RANKING_LIMIT: i64 = 10;
const MAX_RANKING_LIMIT: i64 = 100;

fn production_filter(since: Option<NaiveDate>, formations: Option<&str>) -> ProductionFilter {
    let formations = split_list(formations)
        .into_iter()
        .map(str::to_string)
        .collect();
    ProductionFilter::new(since, formations)
}

pub async fn home() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        message: "Production analytics API".to_string(),
    })
}

/// Verifies the store answers a trivial query.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.store.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
    }))
}

pub async fn list_operators(State(state): State<AppState>) -> ApiResult<Json<OperatorsResponse>> {
    let data = state.store.operators().await?;

    Ok(Json(OperatorsResponse {
        total: data.len(),
        data,
    }))
}

pub async fn production(
    State(state): State<AppState>,
    Path(operator): Path<String>,
    ApiQuery(query): ApiQuery<SeriesQuery>,
) -> ApiResult<Json<Vec<ProductionRow>>> {
    let operator = canonical_operator(&operator);
    let filter = production_filter(query.desde, query.formacion.as_deref());
    let months = state.store.monthly_production(&operator, &filter).await?;

    Ok(Json(
        months
            .into_iter()
            .map(|m| ProductionRow {
                date: m.date,
                oil: m.oil,
                gas: m.gas,
                revenue_usd: m.revenue_usd,
            })
            .collect(),
    ))
}

pub async fn efficiency(
    State(state): State<AppState>,
    Path(operator): Path<String>,
    ApiQuery(query): ApiQuery<SeriesQuery>,
) -> ApiResult<Json<Vec<EfficiencyRow>>> {
    let operator = canonical_operator(&operator);
    let filter = production_filter(query.desde, query.formacion.as_deref());
    let months = state.store.monthly_fluids(&operator, &filter).await?;

    Ok(Json(
        months
            .into_iter()
            .map(|m| EfficiencyRow {
                date: m.date,
                water_m3: m.water,
                gas_m3: m.gas * GAS_UNIT_M3,
                oil_m3: m.oil,
                gor: gas_oil_ratio(m.gas, m.oil),
            })
            .collect(),
    ))
}

pub async fn type_curve(
    State(state): State<AppState>,
    Path(operator): Path<String>,
) -> ApiResult<Json<Vec<TypeCurvePoint>>> {
    let operator = canonical_operator(&operator);
    let rows = state.store.well_months(&operator).await?;

    Ok(Json(analytics::type_curve::build(&rows, DEFAULT_MAX_MONTH)))
}

pub async fn uncompleted_wells(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UncompletedWellsRow>>> {
    let counts = state.store.uncompleted_wells().await?;

    Ok(Json(
        counts
            .into_iter()
            .map(|c| UncompletedWellsRow {
                operator: c.operator,
                uncompleted_well_count: c.count,
            })
            .collect(),
    ))
}

/// Flaring ratio per operator, worst first.
pub async fn flaring(State(state): State<AppState>) -> ApiResult<Json<Vec<FlaringRow>>> {
    let totals = state.store.flaring_totals().await?;

    let mut rows: Vec<FlaringRow> = totals
        .into_iter()
        .map(|t| FlaringRow {
            flare_ratio_pct: flare_ratio_pct(t.flared, t.gas),
            flared_volume: t.flared,
            operator: t.operator,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.flare_ratio_pct
            .total_cmp(&a.flare_ratio_pct)
            .then_with(|| a.operator.cmp(&b.operator))
    });

    Ok(Json(rows))
}

pub async fn forecast(
    State(state): State<AppState>,
    Path(operator): Path<String>,
    ApiQuery(query): ApiQuery<ForecastQuery>,
) -> ApiResult<Json<ForecastResponse>> {
    let horizon = query.horizonte.unwrap_or(DEFAULT_HORIZON);
    if horizon == 0 || horizon > state.max_forecast_horizon {
        return Err(ApiError::BadRequest(format!(
            "horizonte must be between 1 and {}",
            state.max_forecast_horizon
        )));
    }

    let operator = canonical_operator(&operator);
    let filter = production_filter(None, query.formacion.as_deref());
    let months = state.store.monthly_production(&operator, &filter).await?;
    let history: Vec<Observation> = months
        .iter()
        .map(|m| Observation::new(m.date, m.oil))
        .collect();

    let forecast = analytics::forecast(&history, horizon);
    let trend_pct = match (history.last(), forecast.last()) {
        (Some(observed), Some(predicted)) => {
            analytics::trend_pct(observed.volume, predicted.volume)
        },
        _ => None,
    };

    Ok(Json(ForecastResponse {
        operator,
        history,
        forecast,
        trend_pct,
    }))
}

pub async fn revenue_scenario(
    State(state): State<AppState>,
    Path(operator): Path<String>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResult<Json<ScenarioResponse>> {
    let price = query
        .precio
        .ok_or_else(|| ApiError::BadRequest("precio is required".to_string()))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::BadRequest(
            "precio must be a non-negative number".to_string(),
        ));
    }

    let operator = canonical_operator(&operator);
    let filter = production_filter(None, query.formacion.as_deref());
    let months = state.store.monthly_production(&operator, &filter).await?;

    Ok(Json(ScenarioResponse {
        operator,
        scenario: analytics::simulate_revenue(&months, price),
    }))
}

pub async fn kpis(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<KpiQuery>,
) -> ApiResult<Json<OperatorKpis>> {
    let operators: Vec<String> = split_list(query.empresas.as_deref())
        .into_iter()
        .map(canonical_operator)
        .collect();
    let filter = production_filter(query.desde, query.formacion.as_deref());

    Ok(Json(state.store.operator_kpis(&operators, &filter).await?))
}

pub async fn revenue_ranking(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RankingQuery>,
) -> ApiResult<Json<Vec<OperatorRevenue>>> {
    let limit = query.limite.unwrap_or(DEFAULT_RANKING_LIMIT);
    if !(1..=MAX_RANKING_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limite must be between 1 and {}",
            MAX_RANKING_LIMIT
        )));
    }

    let filter = production_filter(query.desde, query.formacion.as_deref());

    Ok(Json(state.store.revenue_ranking(limit, &filter).await?))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("no such endpoint".to_string())
}
