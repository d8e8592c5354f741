//! Provider client tests against a local fake API.

mod support;

use serde_json::json;

use farewatch::adapter::outbound::provider::alpha::AlphaClient;
use farewatch::adapter::outbound::provider::beta::BetaClient;
use farewatch::adapter::outbound::provider::router::ProviderRouter;
use farewatch::adapter::outbound::provider::settings::ProviderConfig;
use farewatch::domain::{
    BookableRef, Itinerary, Leg, Provider, ReservationCode, ReservationRequest, ReservationStatus,
    Watch,
};
use farewatch::error::{FetchError, ReservationError};
use farewatch::port::outbound::fetch::PriceFetcher;
use farewatch::port::outbound::reservation::ReservationGateway;
use farewatch::testkit::domain::{adult_manifest, beta_watch, leg, one_way_watch, round_trip_watch, time};
use support::http::FakeProvider;

fn provider_config(server: &FakeProvider, key: &str) -> ProviderConfig {
    let mut config = ProviderConfig::new(server.url("/api"));
    config.api_key = Some(key.to_string());
    config.retry_backoff_ms = 0;
    config
}

fn hold_request(provider: Provider, refs: &[&str]) -> ReservationRequest {
    ReservationRequest {
        provider,
        bookable_refs: refs.iter().map(|r| BookableRef::new(*r)).collect(),
        round_trip: false,
        manifest: adult_manifest(),
    }
}

fn alpha_flights(fares: serde_json::Value) -> serde_json::Value {
    json!({ "flights": fares })
}

// ---------------------------------------------------------------------------
// Alpha
// ---------------------------------------------------------------------------

#[tokio::test]
async fn alpha_sends_authenticated_availability_request() {
    let server = FakeProvider::start().await;
    server.respond(
        200,
        alpha_flights(json!([
            { "departureTime": "07:00", "fares": [{ "fareClass": "Y", "totalPrice": 420, "fareKey": "fk-a" }] }
        ])),
    );
    let client = AlphaClient::new(&provider_config(&server, "alpha-secret")).unwrap();

    let quote = client.check_price(&one_way_watch()).await.unwrap();

    assert!(quote.matched);
    assert_eq!(quote.price, 420);
    assert_eq!(quote.bookable_refs, vec![Some(BookableRef::new("fk-a"))]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/availability");
    assert_eq!(request.header("authorization"), Some("Bearer alpha-secret"));

    let body = request.json();
    assert_eq!(body["origin"], "GRU");
    assert_eq!(body["destination"], "JFK");
    assert_eq!(body["departureDate"], "2030-06-15");
    assert_eq!(body["adults"], 1);
    assert_eq!(body["infants"], 0);
}

#[tokio::test]
async fn alpha_round_trip_sums_leg_prices() {
    let server = FakeProvider::start().await;
    for (price, key) in [(400, "fk-1"), (300, "fk-2")] {
        server.respond(
            200,
            alpha_flights(json!([
                { "departureTime": "10:00", "fares": [{ "fareClass": "Y", "totalPrice": price, "fareKey": key }] }
            ])),
        );
    }
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let quote = client.check_price(&round_trip_watch()).await.unwrap();

    assert!(quote.matched);
    assert_eq!(quote.price, 700);
    assert_eq!(quote.bookable_refs.len(), 2);

    let mut origins: Vec<String> = server
        .requests()
        .iter()
        .map(|r| r.json()["origin"].as_str().unwrap_or_default().to_string())
        .collect();
    origins.sort();
    assert_eq!(origins, vec!["GRU".to_string(), "JFK".to_string()]);
}

#[tokio::test]
async fn alpha_honours_requested_departure_time() {
    let server = FakeProvider::start().await;
    server.respond(
        200,
        alpha_flights(json!([
            { "departureTime": "07:00", "fares": [{ "fareClass": "Y", "totalPrice": 200, "fareKey": "fk-early" }] },
            { "departureTime": "08:30", "fares": [{ "fareClass": "Y", "totalPrice": 350, "fareKey": "fk-late" }] }
        ])),
    );
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();
    let watch = Watch::new(
        "owner-1",
        Itinerary::one_way(Provider::Alpha, leg("GRU", "JFK").at(time("08:30"))),
        300,
    )
    .with_manifest(adult_manifest());

    let quote = client.check_price(&watch).await.unwrap();

    assert_eq!(quote.price, 350);
    assert_eq!(quote.bookable_refs, vec![Some(BookableRef::new("fk-late"))]);
}

#[tokio::test]
async fn alpha_reports_missing_time_match() {
    let server = FakeProvider::start().await;
    server.respond(
        200,
        alpha_flights(json!([
            { "departureTime": "07:00", "fares": [{ "fareClass": "Y", "totalPrice": 200, "fareKey": "fk" }] }
        ])),
    );
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();
    let watch = Watch::new(
        "owner-1",
        Itinerary::one_way(Provider::Alpha, leg("GRU", "JFK").at(time("21:15"))),
        300,
    );

    let err = client.check_price(&watch).await.unwrap_err();
    assert_eq!(err, FetchError::NoTimeMatch);
}

#[tokio::test]
async fn alpha_quote_outside_fare_class_is_unmatched() {
    let server = FakeProvider::start().await;
    server.respond(
        200,
        alpha_flights(json!([
            { "departureTime": "07:00", "fares": [{ "fareClass": "Y", "totalPrice": 200, "fareKey": "fk" }] }
        ])),
    );
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();
    let watch = Watch::new(
        "owner-1",
        Itinerary::one_way(Provider::Alpha, leg("GRU", "JFK").in_class("J")),
        300,
    );

    let quote = client.check_price(&watch).await.unwrap();
    assert!(!quote.matched);
}

#[tokio::test]
async fn alpha_empty_availability_is_an_empty_result() {
    let server = FakeProvider::start().await;
    server.respond(200, alpha_flights(json!([])));
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let err = client.check_price(&one_way_watch()).await.unwrap_err();
    assert_eq!(err, FetchError::EmptyResult);
}

#[tokio::test]
async fn alpha_server_error_is_unreachable() {
    let server = FakeProvider::start().await;
    server.respond(503, json!({ "message": "maintenance" }));
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let err = client.check_price(&one_way_watch()).await.unwrap_err();
    match err {
        FetchError::Unreachable(reason) => assert!(reason.contains("maintenance"), "{reason}"),
        other => panic!("expected unreachable, got {other:?}"),
    }
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn incomplete_itinerary_sends_no_request() {
    let server = FakeProvider::start().await;
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();
    let watch = Watch::new(
        "owner-1",
        Itinerary::one_way(Provider::Alpha, Leg::new(" ", "JFK", farewatch::testkit::domain::travel_date())),
        300,
    );

    let err = client.check_price(&watch).await.unwrap_err();
    assert_eq!(err, FetchError::IncompleteItinerary { field: "origin" });
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn alpha_hold_posts_booking() {
    let server = FakeProvider::start().await;
    server.respond(
        201,
        json!({ "pnr": "ABC123", "holdExpiresAt": "2030-01-02T12:00:00Z" }),
    );
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let confirmation = client
        .create_hold(&hold_request(Provider::Alpha, &["fk-1"]))
        .await
        .unwrap();

    assert_eq!(confirmation.code.as_str(), "ABC123");
    assert!(confirmation.expires_at.is_some());

    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/bookings");
    let body = requests[0].json();
    assert_eq!(body["tripType"], "ONE_WAY");
    assert_eq!(body["fareKeys"], json!(["fk-1"]));
    assert_eq!(body["passengers"][0]["category"], "adult");
}

#[tokio::test]
async fn alpha_hold_client_error_is_a_rejection() {
    let server = FakeProvider::start().await;
    server.respond(422, json!({ "message": "fare sold out" }));
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let err = client
        .create_hold(&hold_request(Provider::Alpha, &["fk-1"]))
        .await
        .unwrap_err();
    assert_eq!(err, ReservationError::Rejected("fare sold out".into()));
}

#[tokio::test]
async fn alpha_hold_with_blank_code_is_rejected() {
    let server = FakeProvider::start().await;
    server.respond(200, json!({ "pnr": "  " }));
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let err = client
        .create_hold(&hold_request(Provider::Alpha, &["fk-1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Rejected(_)));
}

fn impatient_config(server: &FakeProvider) -> ProviderConfig {
    let mut config = provider_config(server, "k");
    config.timeout_ms = 200;
    config.retry_max_attempts = 3;
    config
}

#[tokio::test]
async fn alpha_hold_timeout_posts_booking_once() {
    let server = FakeProvider::start().await;
    for _ in 0..3 {
        server.stall();
    }
    let client = AlphaClient::new(&impatient_config(&server)).unwrap();

    let err = client
        .create_hold(&hold_request(Provider::Alpha, &["fk-1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::Unreachable(_)), "{err:?}");
    let bookings = server
        .requests()
        .iter()
        .filter(|r| r.path == "/api/bookings")
        .count();
    assert_eq!(bookings, 1);
}

#[tokio::test]
async fn beta_hold_timeout_posts_hold_once() {
    let server = FakeProvider::start().await;
    for _ in 0..3 {
        server.stall();
    }
    let client = BetaClient::new(&impatient_config(&server)).unwrap();

    let err = client
        .create_hold(&hold_request(Provider::Beta, &["sk-1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::Unreachable(_)), "{err:?}");
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn alpha_availability_timeout_is_retried() {
    let server = FakeProvider::start().await;
    server.stall();
    server.respond(
        200,
        alpha_flights(json!([
            { "departureTime": "07:00", "fares": [{ "fareClass": "Y", "totalPrice": 420, "fareKey": "fk-a" }] }
        ])),
    );
    let client = AlphaClient::new(&impatient_config(&server)).unwrap();

    let quote = client.check_price(&one_way_watch()).await.unwrap();

    assert_eq!(quote.price, 420);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn alpha_reservation_status_maps_ticketed_to_issued() {
    let server = FakeProvider::start().await;
    server.respond(200, json!({ "pnr": "ABC123", "status": "TICKETED" }));
    let client = AlphaClient::new(&provider_config(&server, "k")).unwrap();

    let status = client
        .reservation_status(Provider::Alpha, &ReservationCode::new("ABC123"))
        .await
        .unwrap();

    assert_eq!(status, ReservationStatus::Issued);
    let requests = server.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/bookings/ABC123");
}

// ---------------------------------------------------------------------------
// Beta
// ---------------------------------------------------------------------------

#[tokio::test]
async fn beta_searches_whole_itinerary_with_api_key() {
    let server = FakeProvider::start().await;
    server.respond(
        200,
        json!({
            "journeys": [
                { "total": 910, "segments": [{ "departure": "2030-06-15T09:10", "fareBasis": "Y", "sellKey": "sk-2" }] },
                { "total": 780, "segments": [{ "departure": "2030-06-15T13:40:00", "fareBasis": "Y", "sellKey": "sk-1" }] }
            ]
        }),
    );
    let client = BetaClient::new(&provider_config(&server, "beta-secret")).unwrap();

    let quote = client.check_price(&beta_watch("b1")).await.unwrap();

    assert_eq!(quote.price, 780);
    assert_eq!(quote.bookable_refs, vec![Some(BookableRef::new("sk-1"))]);

    let request = &server.requests()[0];
    assert_eq!(request.path, "/api/search");
    assert_eq!(request.header("x-api-key"), Some("beta-secret"));
    assert!(request.header("authorization").is_none());
    let body = request.json();
    assert_eq!(body["legs"][0]["from"], "GIG");
    assert_eq!(body["legs"][0]["to"], "LIS");
    assert_eq!(body["pax"]["adt"], 1);
}

#[tokio::test]
async fn beta_hold_and_status() {
    let server = FakeProvider::start().await;
    server.respond(200, json!({ "recordLocator": "XYZ789" }));
    server.respond(200, json!({ "state": "held", "ticketed": true }));
    server.respond(200, json!({ "state": "released" }));
    let client = BetaClient::new(&provider_config(&server, "k")).unwrap();

    let confirmation = client
        .create_hold(&hold_request(Provider::Beta, &["sk-1"]))
        .await
        .unwrap();
    assert_eq!(confirmation.code.as_str(), "XYZ789");
    assert!(confirmation.expires_at.is_none());

    let code = ReservationCode::new("XYZ789");
    assert_eq!(
        client.reservation_status(Provider::Beta, &code).await.unwrap(),
        ReservationStatus::Issued
    );
    assert_eq!(
        client.reservation_status(Provider::Beta, &code).await.unwrap(),
        ReservationStatus::Expired
    );

    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/holds");
    assert_eq!(requests[0].json()["sellKeys"], json!(["sk-1"]));
    assert_eq!(requests[1].path, "/api/holds/XYZ789");
}

#[tokio::test]
async fn beta_refuses_requests_for_other_providers() {
    let server = FakeProvider::start().await;
    let client = BetaClient::new(&provider_config(&server, "k")).unwrap();

    let err = client
        .create_hold(&hold_request(Provider::Alpha, &["fk-1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidRequest(_)));
    assert!(server.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[tokio::test]
async fn router_dispatches_by_watch_provider() {
    let alpha = FakeProvider::start().await;
    let beta = FakeProvider::start().await;
    beta.respond(
        200,
        json!({ "journeys": [{ "total": 500, "segments": [{ "departure": "2030-06-15T09:10", "sellKey": "sk" }] }] }),
    );
    let router = ProviderRouter::new()
        .with_provider(
            Provider::Alpha,
            std::sync::Arc::new(AlphaClient::new(&provider_config(&alpha, "a")).unwrap()),
        )
        .with_provider(
            Provider::Beta,
            std::sync::Arc::new(BetaClient::new(&provider_config(&beta, "b")).unwrap()),
        );

    let quote = router.check_price(&beta_watch("b1")).await.unwrap();

    assert_eq!(quote.price, 500);
    assert!(alpha.requests().is_empty());
    assert_eq!(beta.requests().len(), 1);
}

#[tokio::test]
async fn router_without_client_reports_unreachable() {
    let router = ProviderRouter::new();

    let err = router.check_price(&beta_watch("b1")).await.unwrap_err();
    assert!(matches!(err, FetchError::Unreachable(_)));

    let err = router
        .create_hold(&hold_request(Provider::Alpha, &["fk"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Unreachable(_)));
}
