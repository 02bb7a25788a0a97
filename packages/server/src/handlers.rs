//! HTTP handler functions for the crime dashboard API.

use actix_web::{HttpResponse, web};
use crime_dashboard_analytics::{dashboard, filter, metrics};
use crime_dashboard_analytics_models::{DateRange, FilterSelection};
use crime_dashboard_loader::Dataset;
use crime_dashboard_server_models::{
    ApiBounds, ApiError, ApiHealth, ApiMetrics, DashboardQueryParams,
};

use crate::AppState;

const EMPTY_DATASET: &str = "The dataset is empty";

fn full_range(dataset: &Dataset) -> Option<DateRange> {
    dataset.bounds().map(|b| DateRange::new(b.min, b.max))
}

/// `503 Service Unavailable` when there is no data to compute from.
fn unavailable(state: &AppState) -> Option<HttpResponse> {
    if !state.dataset.is_empty() {
        return None;
    }
    let message = state.load_error.as_deref().unwrap_or(EMPTY_DATASET);
    Some(HttpResponse::ServiceUnavailable().json(ApiError::new(message)))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/bounds`
///
/// Returns the dataset's date extent and size, plus the load error when
/// the dataset could not be read.
pub async fn bounds(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiBounds {
        min_date: state.dataset.min_date(),
        max_date: state.dataset.max_date(),
        record_count: state.dataset.len() as u64,
        load_error: state.load_error.clone(),
    })
}

/// `GET /api/options`
///
/// Returns the multi-select options for the requested date range. The
/// categorical parameters are ignored.
pub async fn options(
    state: web::Data<AppState>,
    params: web::Query<DashboardQueryParams>,
) -> HttpResponse {
    if let Some(response) = unavailable(&state) {
        return response;
    }

    let range = params.range(full_range(&state.dataset));
    let outcome = filter::apply(&state.dataset, range, &FilterSelection::default());
    HttpResponse::Ok().json(outcome.options)
}

/// `GET /api/metrics`
///
/// Returns the headline metrics and metric cards for the requested
/// filters.
pub async fn metrics(
    state: web::Data<AppState>,
    params: web::Query<DashboardQueryParams>,
) -> HttpResponse {
    if let Some(response) = unavailable(&state) {
        return response;
    }

    let range = params.range(full_range(&state.dataset));
    let outcome = filter::apply(&state.dataset, range, &params.selection());
    let values = metrics::compute(
        &outcome.primary,
        outcome.comparison.as_ref(),
        outcome.duration_days,
    );

    HttpResponse::Ok().json(ApiMetrics {
        range: outcome.range,
        range_error: outcome.range_error,
        cards: metrics::cards(&values),
        metrics: values,
    })
}

/// `GET /api/dashboard`
///
/// Returns the full dashboard view model for the requested filters.
pub async fn dashboard(
    state: web::Data<AppState>,
    params: web::Query<DashboardQueryParams>,
) -> HttpResponse {
    if let Some(response) = unavailable(&state) {
        return response;
    }

    let dashboard_state = params.to_state(full_range(&state.dataset));
    let view = dashboard::render(&state.dataset, &dashboard_state, &mut rand::thread_rng());

    if let Some(error) = &view.range_error {
        log::debug!("Dashboard request with invalid range: {error}");
    }

    HttpResponse::Ok().json(view)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use chrono::NaiveDate;
    use crime_dashboard_incident_models::IncidentRecord;
    use serde_json::Value;

    use super::*;
    use crate::configure;

    fn record(day: &str, area: &str, gender: &str) -> IncidentRecord {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap();
        IncidentRecord::new(date, 9, 34.05, -118.24)
            .with_area(area)
            .with_crime_category("Theft")
            .with_crime("SHOPLIFTING")
            .with_victim_gender(gender)
    }

    fn loaded() -> AppState {
        AppState::ready(Arc::new(Dataset::from_records(vec![
            record("2021-01-01", "Central", "F"),
            record("2021-01-02", "Newton", "M"),
            record("2021-01-03", "Central", "M"),
            record("2021-01-04", "Newton", "F"),
        ])))
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;
        let request = test::TestRequest::get().uri(uri).to_request();
        let response = test::call_service(&app, request).await;
        let status = response.status();
        let body = test::read_body(response).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let (status, body) = get(loaded(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn bounds_cover_dataset() {
        let (status, body) = get(loaded(), "/api/bounds").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["minDate"], "2021-01-01");
        assert_eq!(body["maxDate"], "2021-01-04");
        assert_eq!(body["recordCount"], 4);
        assert!(body["loadError"].is_null());
    }

    #[actix_web::test]
    async fn bounds_surface_load_error() {
        let (status, body) = get(AppState::failed("Parse error on line 3"), "/api/bounds").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recordCount"], 0);
        assert_eq!(body["loadError"], "Parse error on line 3");
    }

    #[actix_web::test]
    async fn options_are_date_filtered() {
        let (status, body) = get(loaded(), "/api/options?from=2021-01-01&to=2021-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["areas"], serde_json::json!(["Central"]));
        assert_eq!(body["genders"], serde_json::json!(["F"]));
    }

    #[actix_web::test]
    async fn metrics_apply_list_filters() {
        let (status, body) = get(
            loaded(),
            "/api/metrics?from=2021-01-03&to=2021-01-04&areas=Newton,Central&genders=F",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["totalCount"], 1);
        assert_eq!(body["metrics"]["topArea"], "Newton");
        assert_eq!(body["metrics"]["delta"]["status"], "available");
        assert_eq!(body["cards"][0]["label"], "Total Crimes");
    }

    #[actix_web::test]
    async fn dashboard_reports_invalid_range() {
        let (status, body) = get(loaded(), "/api/dashboard?from=2021-01-04&to=2021-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rangeError"]["kind"], "startAfterEnd");
        assert_eq!(body["metrics"]["totalCount"], 4);
        assert_eq!(body["comparisonValid"], false);
    }

    #[actix_web::test]
    async fn dashboard_defaults_to_full_range() {
        let (status, body) = get(loaded(), "/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["durationDays"], 4);
        assert_eq!(body["charts"]["byDayOfWeek"]["bars"].as_array().map(Vec::len), Some(7));
    }

    #[actix_web::test]
    async fn far_future_range_end_is_answered() {
        let uri = "/api/metrics?from=2021-01-01&to=%2B262142-12-31";
        let (status, body) = get(loaded(), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["totalCount"], 4);
        assert_eq!(body["metrics"]["delta"]["status"], "notApplicable");
    }

    #[actix_web::test]
    async fn empty_dataset_is_unavailable() {
        let (status, body) = get(AppState::failed("boom"), "/api/dashboard").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "boom");

        let (status, body) =
            get(AppState::ready(Arc::new(Dataset::empty())), "/api/metrics").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], EMPTY_DATASET);
    }

    #[actix_web::test]
    async fn malformed_date_is_a_bad_request() {
        let (status, _) = get(loaded(), "/api/dashboard?from=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
