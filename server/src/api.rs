//! HTTP routes.

use axum::extract::{Query, State};
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use ratewise_common::Currency;
use ratewise_fx::announce::currency_name;
use ratewise_fx::{announce_bill, Announcement, RateQuery, ResolverStats, SharedRateResolver};
use serde::Deserialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::require_bearer;
use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: SharedRateResolver,
}

/// Build the application router.
pub fn app_router(state: AppState, config: &ServerConfig) -> Router {
    let mut api = Router::new()
        .route("/exchange-rate", get(exchange_rate))
        .route("/announcement", get(announcement))
        .route("/stats", get(stats));

    if config.require_auth {
        api = api.route_layer(middleware::from_fn(require_bearer));
    }

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters for `/api/exchange-rate`.
#[derive(Debug, Default, Deserialize)]
pub struct ExchangeRateParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<String>,
}

impl ExchangeRateParams {
    /// Rate query with empty or missing codes replaced by the defaults.
    pub fn query(&self) -> RateQuery {
        let defaults = RateQuery::default();
        RateQuery {
            from: currency_or(self.from.as_deref(), defaults.from),
            to: currency_or(self.to.as_deref(), defaults.to),
        }
    }

    /// Amount to convert; 1 when missing or empty.
    pub fn amount(&self) -> Result<f64, ApiError> {
        match non_empty(self.amount.as_deref()) {
            None => Ok(1.0),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ApiError::InvalidAmount(raw.to_string())),
        }
    }
}

async fn exchange_rate(
    State(state): State<AppState>,
    Query(params): Query<ExchangeRateParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params.query();
    let amount = params.amount()?;

    let conversion = state.resolver.quote(query, amount).await;
    if !conversion.converted.is_finite() {
        return Err(ApiError::Internal(format!(
            "converted amount is not finite for {} {}",
            amount, conversion.from
        )));
    }

    info!(
        from = %conversion.from,
        to = %conversion.to,
        rate = conversion.rate,
        "Served exchange rate"
    );

    serde_json::to_value(&conversion)
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Query parameters for `/api/announcement`.
#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementParams {
    pub amount: Option<String>,
    pub currency: Option<String>,
    /// Also announce the amount converted into this currency.
    pub to: Option<String>,
    pub extra: Option<String>,
    pub lang: Option<String>,
}

async fn announcement(
    State(state): State<AppState>,
    Query(params): Query<AnnouncementParams>,
) -> Json<Announcement> {
    let currency = currency_or(params.currency.as_deref(), Currency::php());
    let amount = non_empty(params.amount.as_deref());

    let mut extras = Vec::new();
    if let (Some(target), Some(value)) = (
        non_empty(params.to.as_deref()).map(Currency::new),
        amount.and_then(|a| a.parse::<f64>().ok()).filter(|v| v.is_finite()),
    ) {
        let query = RateQuery::new(currency.clone(), target.clone());
        let converted = state.resolver.convert(value, &query).await;
        extras.push(format!(
            "That is about {:.2} {}.",
            converted,
            currency_name(&target)
        ));
    }
    if let Some(extra) = non_empty(params.extra.as_deref()) {
        extras.push(extra.to_string());
    }

    let extra = (!extras.is_empty()).then(|| extras.join(" "));
    let mut announcement = announce_bill(amount, &currency, extra.as_deref());
    if let Some(lang) = non_empty(params.lang.as_deref()) {
        announcement.settings.lang = lang.to_string();
    }

    Json(announcement)
}

async fn stats(State(state): State<AppState>) -> Json<ResolverStats> {
    Json(state.resolver.stats())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn currency_or(value: Option<&str>, default: Currency) -> Currency {
    non_empty(value).map(Currency::new).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use ratewise_common::CurrencyPair;
    use ratewise_fx::{MockRateSource, RateResolver, RateResolverConfig, RateSource};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn build_test_router(config: &ServerConfig) -> (Router, Arc<MockRateSource>) {
        let pair_source = Arc::new(MockRateSource::new("pair"));
        let latest_source = Arc::new(MockRateSource::new("latest"));
        let sources: Vec<Arc<dyn RateSource>> = vec![pair_source.clone(), latest_source];
        let resolver = Arc::new(RateResolver::new(sources, RateResolverConfig::default()));
        (app_router(AppState { resolver }, config), pair_source)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_exchange_rate_with_pair_lookup() {
        let (app, pair_source) = build_test_router(&ServerConfig::default());
        pair_source.set_rate(CurrencyPair::new("USD", "EUR"), 0.92);

        let (status, json) = get_json(app, "/api/exchange-rate?from=USD&to=EUR&amount=50").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["from"], "USD");
        assert_eq!(json["to"], "EUR");
        assert_eq!(json["amount"], 50.0);
        assert_eq!(json["rate"], 0.92);
        assert_eq!(json["converted"].as_f64().unwrap(), 50.0 * 0.92);
        assert!((json["converted"].as_f64().unwrap() - 46.0).abs() < 1e-9);
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_exchange_rate_defaults() {
        let (app, _) = build_test_router(&ServerConfig::default());

        let (status, json) = get_json(app, "/api/exchange-rate?from=&amount=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["from"], "PHP");
        assert_eq!(json["to"], "USD");
        assert_eq!(json["amount"], 1.0);
        assert_eq!(json["rate"], 0.0177);
        assert_eq!(json["converted"], 0.0177);
    }

    #[tokio::test]
    async fn test_exchange_rate_invalid_amount() {
        let (app, _) = build_test_router(&ServerConfig::default());

        let (status, body) = get_text(app, "/api/exchange-rate?amount=lots").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid amount");
    }

    #[tokio::test]
    async fn test_exchange_rate_overflow_is_internal_error() {
        let (app, _) = build_test_router(&ServerConfig::default());

        let (status, body) = get_text(app, "/api/exchange-rate?from=USD&to=PHP&amount=1e308").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error getting exchange rate");
    }

    #[tokio::test]
    async fn test_announcement_with_conversion() {
        let (app, pair_source) = build_test_router(&ServerConfig::default());
        pair_source.set_rate(CurrencyPair::new("PHP", "USD"), 0.018);

        let (status, json) = get_json(
            app,
            "/api/announcement?amount=500&currency=php&to=USD&extra=Thank%20you",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["text"],
            "Detected 500 Philippine Peso. That is about 9.00 US Dollar. Thank you"
        );
        assert_eq!(json["settings"]["lang"], "en-US");
        assert_eq!(json["settings"]["pitch"], 2.0);
    }

    #[tokio::test]
    async fn test_announcement_without_amount() {
        let (app, _) = build_test_router(&ServerConfig::default());

        let (_, json) = get_json(app, "/api/announcement?lang=fil-PH").await;

        assert_eq!(json["text"], "Detected unknown amount Philippine Peso.");
        assert_eq!(json["settings"]["lang"], "fil-PH");
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (app, pair_source) = build_test_router(&ServerConfig::default());
        pair_source.set_rate(CurrencyPair::new("USD", "EUR"), 0.92);

        let _ = get_json(app.clone(), "/api/exchange-rate?from=USD&to=EUR").await;
        let _ = get_json(app.clone(), "/api/exchange-rate?from=USD&to=EUR").await;
        let (status, json) = get_json(app, "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["metrics"]["requests_total"], 2);
        assert_eq!(json["metrics"]["cache_hits"], 1);
        assert_eq!(json["cache"]["total_entries"], 1);
        assert_eq!(pair_source.calls(), 1);
    }

    #[tokio::test]
    async fn test_auth_required_when_enabled() {
        let config = ServerConfig {
            require_auth: true,
            ..Default::default()
        };
        let (app, _) = build_test_router(&config);

        let (status, _) = get_text(app.clone(), "/api/exchange-rate").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/exchange-rate")
                    .header(header::AUTHORIZATION, "Bearer anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_params_normalize_codes() {
        let params = ExchangeRateParams {
            from: Some(" eur ".into()),
            to: None,
            amount: Some("12.5".into()),
        };

        assert_eq!(params.query(), RateQuery::new("EUR", "USD"));
        assert_eq!(params.amount().unwrap(), 12.5);
        assert_eq!(ExchangeRateParams::default().amount().unwrap(), 1.0);
    }
}
