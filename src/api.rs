use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::activity::ActivityView;
use crate::analytics::{self, AnalyticsSummary, ChartPoint, ErrorBucket, TimeRange};
use crate::config::monitor::MonitorConfig;
use crate::dashboard::{Dashboard, DashboardSnapshot};
use crate::feed::catalog::{self, FeedKind};
use crate::preferences::{PreferenceStore, Preferences};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub preferences: Arc<PreferenceStore>,
    pub config: Arc<MonitorConfig>,
}

impl AppState {
    pub fn new(
        dashboard: Arc<Dashboard>,
        preferences: Arc<PreferenceStore>,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            dashboard,
            preferences,
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let mut router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/dashboard", get(dashboard))
        .route("/api/activity", get(activity))
        .route("/api/analytics", get(analytics_view))
        .route("/api/preferences", get(get_preferences).put(put_preferences))
        .route("/api/preferences/toggle-dark-mode", post(toggle_dark_mode))
        .route("/api/feeds/{name}/refresh", post(refresh_feed));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot())
}

#[derive(Deserialize)]
struct ActivityQuery {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    /// Search term the client's `page` refers to; a different `search`
    /// starts over at page 1.
    #[serde(default)]
    previous_search: Option<String>,
}

#[derive(Serialize)]
struct ActivityItemOut {
    filename: String,
    display_time: String,
    image_url: String,
}

#[derive(Serialize)]
struct ActivityOut {
    status: &'static str,
    error: Option<String>,
    search: String,
    items: Vec<ActivityItemOut>,
    page: usize,
    total_pages: usize,
    total: usize,
}

async fn activity(
    State(state): State<AppState>,
    Query(q): Query<ActivityQuery>,
) -> Json<ActivityOut> {
    let feed = state.dashboard.activity.state();

    let mut view = ActivityView::new(state.config.page_size, state.config.display_format.clone());
    view.set_records(state.dashboard.activity.display_records());
    let search = q.search.unwrap_or_default();
    view.set_search(q.previous_search.as_deref().unwrap_or(&search));
    view.set_page(q.page.unwrap_or(1));
    view.set_search(&search);
    let page = view.current_page();

    let base = state.dashboard.backend_url();
    let items = page
        .items
        .into_iter()
        .map(|it| ActivityItemOut {
            image_url: catalog::activity_image_url(base, &it.filename),
            filename: it.filename,
            display_time: it.display_time,
        })
        .collect();

    Json(ActivityOut {
        status: feed.status(),
        error: feed.error_message().map(str::to_string),
        search: view.search().to_string(),
        items,
        page: page.page,
        total_pages: page.total_pages,
        total: page.total,
    })
}

#[derive(Deserialize)]
struct AnalyticsQuery {
    #[serde(default)]
    range: Option<String>,
}

#[derive(Serialize)]
struct AnalyticsOut {
    range: Option<TimeRange>,
    stats: AnalyticsSummary,
    chart: Vec<ChartPoint>,
    distribution: Vec<ErrorBucket>,
    summary_error: Option<String>,
    errors_error: Option<String>,
}

async fn analytics_view(
    State(state): State<AppState>,
    Query(q): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsOut>, (StatusCode, String)> {
    let range = match q.range.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(r) => Some(
            r.parse::<TimeRange>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        ),
        None => None,
    };

    let summary = state.dashboard.summary.state();
    let errors = state.dashboard.errors.state();
    let summary_records = state.dashboard.summary.display_records();
    let error_records = state.dashboard.errors.display_records();
    let now = chrono::Local::now().naive_local();
    let points = analytics::filter_range(&summary_records, range, now);

    Ok(Json(AnalyticsOut {
        range,
        stats: analytics::summarize(&points, &error_records),
        chart: analytics::chart_series(&points),
        distribution: analytics::error_distribution(&error_records),
        summary_error: summary.error_message().map(str::to_string),
        errors_error: errors.error_message().map(str::to_string),
    }))
}

async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences.get())
}

async fn put_preferences(
    State(state): State<AppState>,
    Json(body): Json<Preferences>,
) -> Json<Preferences> {
    Json(state.preferences.set_dark_mode(body.dark_mode))
}

async fn toggle_dark_mode(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences.toggle_dark_mode())
}

#[derive(Serialize)]
struct RefreshOut {
    feed: &'static str,
    status: &'static str,
}

async fn refresh_feed(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RefreshOut>, (StatusCode, String)> {
    let kind: FeedKind = name
        .parse()
        .map_err(|e: catalog::UnknownFeed| (StatusCode::NOT_FOUND, e.to_string()))?;
    let status = state.dashboard.refresh(kind).await;
    tracing::info!(target: "api", feed = kind.as_str(), status, "manual refresh");
    Ok(Json(RefreshOut {
        feed: kind.as_str(),
        status,
    }))
}
