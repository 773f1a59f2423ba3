use std::time::Duration;

use encwatch_engine::{
    Endpoints, FailureKind, FetchSettings, ReqwestStatusFetcher, StatusFetcher,
};
use encwatch_core::Progress;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer, settings: FetchSettings) -> ReqwestStatusFetcher {
    let endpoints = Endpoints::new(&server.uri(), "/ready", "/upload").expect("endpoints");
    ReqwestStatusFetcher::new(endpoints, settings).expect("fetcher")
}

#[tokio::test]
async fn fetcher_parses_status_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"a.mp4": "100", "b.mp4": "42", "c.mkv": 0}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let map = fetcher.fetch_status().await.expect("fetch ok");

    assert_eq!(map.len(), 3);
    assert_eq!(map["a.mp4"], Progress::Complete);
    assert_eq!(map["b.mp4"], Progress::Percent(42));
    assert_eq!(map["c.mkv"], Progress::Percent(0));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher.fetch_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_reports_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher.fetch_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedJson);
}

#[tokio::test]
async fn fetcher_rejects_json_that_is_not_an_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"["a.mp4"]"#))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher.fetch_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedJson);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = fetcher_for(&server, settings);
    let err = fetcher.fetch_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .set_body_string(r#"{"a.mp4":"1"}"#),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_status_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = fetcher_for(&server, settings);
    let err = fetcher.fetch_status().await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(13)
        }
    );
}

#[tokio::test]
async fn fetcher_reports_connection_failure_as_network() {
    // Bind and drop a server so the port is very likely closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let endpoints = Endpoints::new(&uri, "/ready", "/upload").unwrap();
    let fetcher = ReqwestStatusFetcher::new(endpoints, FetchSettings::default()).unwrap();
    let err = fetcher.fetch_status().await.unwrap_err();
    assert!(
        matches!(err.kind, FailureKind::Network | FailureKind::Timeout),
        "{err}"
    );
}
