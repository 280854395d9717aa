//! Integration tests for the HTTP market data provider

use serde_json::json;
use sigmatch::error::UpstreamError;
use sigmatch::services::http_provider::HttpMarketDataProvider;
use sigmatch::services::market_data::MarketDataProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn provider_for(server: &MockServer) -> HttpMarketDataProvider {
    HttpMarketDataProvider::with_client(&format!("{}/", server.uri()), reqwest::Client::new())
        .unwrap()
}

#[tokio::test]
async fn fetches_and_decodes_observation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ticker": "AAPL",
            "timestamp": "2024-05-01T13:30:00Z",
            "open": 100.0,
            "close": 105.0,
            "volume": 600000.0,
            "low": 99.5,
            "indicators": { "ema_20": 100.2, "vwap": 101.0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let observation = provider.latest_observation("AAPL").await.unwrap();
    assert_eq!(observation.close, 105.0);
    assert_eq!(observation.low, Some(99.5));
    assert_eq!(observation.high, None);
    assert_eq!(observation.field("ema_20"), Some(100.2));
}

#[tokio::test]
async fn not_found_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/ZZZZ"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    assert!(matches!(
        provider.latest_observation("ZZZZ").await,
        Err(UpstreamError::NoData(_))
    ));
}

#[tokio::test]
async fn server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/AAPL"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    assert!(matches!(
        provider.latest_observation("AAPL").await,
        Err(UpstreamError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    assert!(matches!(
        provider.latest_observation("AAPL").await,
        Err(UpstreamError::Decode { .. })
    ));
}

#[tokio::test]
async fn ticker_mismatch_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/observations/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ticker": "TSLA",
            "timestamp": "2024-05-01T13:30:00Z",
            "open": 1.0,
            "close": 1.0,
            "volume": 1.0
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    assert!(matches!(
        provider.latest_observation("AAPL").await,
        Err(UpstreamError::Decode { .. })
    ));
}

#[tokio::test]
async fn ticker_is_sent_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    for ticker in ["BRK/B", "../../ADMIN/FLUSH", "A?X=1"] {
        assert!(provider.latest_observation(ticker).await.is_err());
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert!(request.url.path().starts_with("/observations/"), "{}", request.url);
        assert_eq!(request.url.path_segments().unwrap().count(), 2, "{}", request.url);
        assert_eq!(request.url.query(), None);
    }
}

#[test]
fn observation_url_keeps_base_path() {
    let provider =
        HttpMarketDataProvider::with_client("http://md.local/api/", reqwest::Client::new())
            .unwrap();
    assert_eq!(
        provider.observation_url("BRK.B").unwrap().as_str(),
        "http://md.local/api/observations/BRK.B"
    );
    assert_eq!(
        provider.observation_url("BRK/B").unwrap().as_str(),
        "http://md.local/api/observations/BRK%2FB"
    );
}

#[test]
fn invalid_base_url_rejected() {
    assert!(matches!(
        HttpMarketDataProvider::with_client("not a url", reqwest::Client::new()),
        Err(UpstreamError::InvalidUrl { .. })
    ));
    assert!(matches!(
        HttpMarketDataProvider::with_client("mailto:ops@example.com", reqwest::Client::new()),
        Err(UpstreamError::InvalidUrl { .. })
    ));
}
