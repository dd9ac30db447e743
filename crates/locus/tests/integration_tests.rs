//! Integration tests for Locus location resolution and search
//!
//! These tests run against the public API only. Async tests use tokio's paused
//! clock so debounce windows and provider latency cost no wall time.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use locus::{
    CancelToken, Coordinate, LocationLookup, LocationRecord, SearchController,
    SearchControllerConfig, SearchError, SearchState, StaticLookup, Venue, geo,
};
use parking_lot::Mutex;
use tokio::time::sleep;

fn setup_test_env() {
    let _ = locus::init_logging(tracing::Level::WARN);
}

fn lagos_records() -> Vec<LocationRecord> {
    vec![
        LocationRecord::new(
            "Ikeja City Mall",
            "194 Obafemi Awolowo Way, Ikeja, Lagos",
            Coordinate::new(6.6142, 3.3580),
        )
        .with_place_id("ChIJ-ikeja"),
        LocationRecord::new(
            "Palms Mall",
            "1 Bisway St, Lekki, Lagos",
            Coordinate::new(6.4352, 3.4498),
        ),
        LocationRecord::new(
            "Circle Mall",
            "Lekki-Epe Expressway, Lekki, Lagos",
            Coordinate::new(6.4361, 3.5247),
        ),
    ]
}

/// Ignores its cancel token entirely and answers each query after a per-query delay.
///
/// Used to show that stale responses are dropped even when the transport
/// never honours cancellation.
struct StubbornLookup {
    delays: Vec<(&'static str, Duration)>,
    calls: Mutex<Vec<String>>,
}

impl LocationLookup for StubbornLookup {
    fn search(
        &self,
        query: String,
        _cancel: CancelToken,
    ) -> BoxFuture<'_, Result<Vec<LocationRecord>, SearchError>> {
        Box::pin(async move {
            self.calls.lock().push(query.clone());
            let delay = self
                .delays
                .iter()
                .find(|(q, _)| *q == query)
                .map_or(Duration::from_millis(50), |(_, d)| *d);
            sleep(delay).await;
            Ok(vec![LocationRecord::new(
                query.clone(),
                format!("{query} result"),
                Coordinate::new(0.0, 0.0),
            )])
        })
    }

    fn reverse_geocode(
        &self,
        _coordinate: Coordinate,
        _cancel: CancelToken,
    ) -> BoxFuture<'_, Result<Vec<LocationRecord>, SearchError>> {
        Box::pin(async { Err(SearchError::Remote("not supported".into())) })
    }
}

#[test]
fn test_nearest_cinema_workflow() {
    let cinemas = vec![
        Venue::new("fs-ikeja", "Filmhouse Ikeja", Coordinate::new(6.6142, 3.3580)),
        Venue::new("fs-lekki", "Filmhouse Lekki", Coordinate::new(6.4361, 3.5247)),
        Venue::new("gn-maryland", "Genesis Maryland", Coordinate::new(6.5710, 3.3670)),
    ];
    let gps_fix = Coordinate::new(6.5800, 3.3650);

    let (idx, cinema) = geo::nearest(gps_fix, &cinemas).expect("non-empty");
    assert_eq!(idx, 2);
    assert_eq!(cinema.id, "gn-maryland");

    let ranked: Vec<&str> = geo::by_distance(gps_fix, &cinemas)
        .into_iter()
        .map(|(i, _)| cinemas[i].id.as_str())
        .collect();
    assert_eq!(ranked, vec!["gn-maryland", "fs-ikeja", "fs-lekki"]);

    let coords: Vec<Coordinate> = cinemas.iter().map(|c| c.coordinate).collect();
    assert_eq!(geo::nearest_index(gps_fix, &coords), Some(2));
    assert_eq!(geo::nearest_index(gps_fix, &[]), None);
}

#[tokio::test(start_paused = true)]
async fn test_full_search_workflow() {
    setup_test_env();

    let lookup = StaticLookup::new(lagos_records()).with_latency(Duration::from_millis(250));
    let controller = SearchController::new(lookup);
    let mut states = controller.subscribe();

    // 1. typing debounces
    for query in ["l", "le", "lek", "lekki"] {
        controller.set_query(query);
        sleep(Duration::from_millis(100)).await;
    }
    assert!(controller.state().is_loading());

    // 2. results arrive for the final query only
    let settled = states
        .wait_for(|s| matches!(s, SearchState::Settled { .. }))
        .await
        .expect("controller alive")
        .clone();
    let SearchState::Settled { query, results } = settled else {
        unreachable!()
    };
    assert_eq!(query, "lekki");
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Palms Mall", "Circle Mall"]);

    // 3. picking a result closes the search
    let picked = controller.select(1).expect("index in range");
    assert_eq!(picked.name, "Circle Mall");
    assert_eq!(controller.state(), SearchState::Idle);
    assert_eq!(controller.selected().map(|r| r.name), Some("Circle Mall".into()));
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_never_overwrites_fresh_one() {
    setup_test_env();

    let lookup = Arc::new(StubbornLookup {
        delays: vec![
            ("abc", Duration::from_secs(3)),
            ("abcd", Duration::from_millis(100)),
        ],
        calls: Mutex::new(Vec::new()),
    });
    let controller = SearchController::new(Arc::clone(&lookup));

    controller.set_query("abc");
    sleep(Duration::from_millis(900)).await;
    controller.set_query("abcd");

    // "abcd" dispatches at 1.7s and answers at 1.8s, "abc" would land at 3.8s
    sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.state().results()[0].name, "abcd");

    sleep(Duration::from_secs(5)).await;
    assert_eq!(controller.state().results()[0].name, "abcd");
    assert_eq!(*lookup.calls.lock(), vec!["abc", "abcd"]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_is_never_dispatched() {
    let lookup = Arc::new(StubbornLookup {
        delays: Vec::new(),
        calls: Mutex::new(Vec::new()),
    });
    let controller = SearchController::new(Arc::clone(&lookup));

    controller.set_query(" \t ");
    sleep(Duration::from_secs(10)).await;

    assert!(lookup.calls.lock().is_empty());
    assert_eq!(controller.state(), SearchState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_searching_is_silent() {
    let lookup = StaticLookup::new(lagos_records()).with_latency(Duration::from_secs(5));
    let controller = SearchController::new(lookup);

    controller.set_query("mall");
    sleep(Duration::from_secs(1)).await;
    assert!(matches!(controller.state(), SearchState::Searching { .. }));

    controller.cancel();
    sleep(Duration::from_secs(10)).await;
    assert_eq!(controller.state(), SearchState::Idle);
    assert!(controller.state().error().is_none());
    assert!(!controller.retry());
}

#[tokio::test(start_paused = true)]
async fn test_locate_device_fix() {
    let lookup = StaticLookup::new(lagos_records());
    let controller = SearchController::new(lookup);

    controller.locate(Coordinate::new(6.60, 3.36));
    sleep(Duration::from_millis(10)).await;

    let state = controller.state();
    assert_eq!(state.results()[0].name, "Ikeja City Mall");
    assert_eq!(state.results()[0].place_id.as_deref(), Some("ChIJ-ikeja"));
}

#[tokio::test(start_paused = true)]
async fn test_configured_debounce_is_honoured() {
    let lookup = Arc::new(StubbornLookup {
        delays: Vec::new(),
        calls: Mutex::new(Vec::new()),
    });
    let config = SearchControllerConfig::builder()
        .debounce(Duration::from_secs(2))
        .build();
    let controller = SearchController::with_config(Arc::clone(&lookup), config).unwrap();

    controller.set_query("yaba");
    sleep(Duration::from_millis(1500)).await;
    assert!(lookup.calls.lock().is_empty());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(*lookup.calls.lock(), vec!["yaba"]);
}
