//! Nearest cinema and debounced place search
//!
//! This example demonstrates the two halves of the crate:
//! - Ranking venues by distance from a device fix
//! - Driving a search box through a `SearchController` with an in-memory provider

use std::time::Duration;

use locus::{
    Coordinate, LocationRecord, SearchController, SearchControllerConfigBuilder, SearchState,
    StaticLookup, Venue, geo,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    locus::init_logging(tracing::Level::INFO)?;

    let cinemas = vec![
        Venue::new("fh-ikeja", "Filmhouse Ikeja", Coordinate::new(6.6142, 3.3580)),
        Venue::new("fh-lekki", "Filmhouse Lekki", Coordinate::new(6.4361, 3.5247)),
        Venue::new("gn-maryland", "Genesis Maryland", Coordinate::new(6.5710, 3.3670)),
    ];
    let gps_fix = Coordinate::new(6.5800, 3.3650);

    println!("Cinemas by distance from {:.4},{:.4}:", gps_fix.lat, gps_fix.lng);
    for (idx, metres) in geo::by_distance(gps_fix, &cinemas) {
        println!("  {} ({:.1} km)", cinemas[idx].name, metres / 1000.0);
    }

    let lookup = StaticLookup::new(
        cinemas
            .iter()
            .map(|c| LocationRecord::new(&c.name, format!("{}, Lagos", c.name), c.coordinate))
            .collect(),
    )
    .with_latency(Duration::from_millis(150));

    let config = SearchControllerConfigBuilder::responsive().build();
    let controller = SearchController::with_config(lookup, config)?;
    let mut states = controller.subscribe();

    // Simulate someone typing "film" one key at a time
    for query in ["f", "fi", "fil", "film"] {
        controller.set_query(query);
        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    let state = states
        .wait_for(|s| !s.is_loading())
        .await?
        .clone();
    match state {
        SearchState::Settled { query, results } => {
            println!("\nResults for '{query}':");
            for (i, record) in results.iter().enumerate() {
                println!("  {}. {} - {}", i + 1, record.name, record.formatted_address);
            }
        }
        SearchState::Errored { message } => println!("\nSearch failed: {message}"),
        other => println!("\nSearch ended in {other:?}"),
    }

    Ok(())
}
