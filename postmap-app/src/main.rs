use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use postmap::prelude::*;

/// A short walk from Union Square heading north-west
fn walk() -> Vec<LatLng> {
    vec![
        LatLng::new(37.7880, -122.4075),
        LatLng::new(37.7925, -122.4120),
        LatLng::new(37.7990, -122.4180),
    ]
}

/// Headless demo: drives the nearby map through a scripted location provider
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    postmap::init_logging();
    postmap::runtime::init_runtime(Box::new(
        postmap::runtime::spawners::tokio_impl::TokioSpawner,
    ));

    let options = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading options from {}", path))?;
            NearbyMapOptions::from_json(&json)?
        }
        None => GeofenceProfile::Standard.resolve(),
    };

    let provider = Arc::new(
        ScriptedLocationProvider::new(AuthorizationStatus::NotDetermined)
            .answering(AuthorizationStatus::AuthorizedWhenInUse)
            .with_route(walk()),
    );
    let source = Arc::new(RandomNearbySource::seeded(options.refresh.clone(), 2024));

    let controller = NearbyMapController::new(options, provider.clone(), source)?;
    let handle = controller.handle();
    provider.attach(handle.clone());

    let events = handle.subscribe();
    let printer = std::thread::spawn(move || {
        for event in events.iter() {
            match event {
                StateEvent::RegionChanged(region) => println!(
                    "region   center=({:.4}, {:.4}) span=({:.3}, {:.3})",
                    region.center.lat, region.center.lng, region.span.lat_delta, region.span.lng_delta
                ),
                StateEvent::UserLocationChanged(fix) => {
                    println!("location ({:.4}, {:.4})", fix.lat, fix.lng)
                }
                StateEvent::NearbyChanged(items) => println!("nearby   {} postcards", items.len()),
                StateEvent::MessageChanged(Some(message)) => println!("message  {}", message),
                StateEvent::MessageChanged(None) => {}
                StateEvent::TrackingChanged(state) => println!("tracking {:?}", state),
            }
        }
    });

    let running = tokio::spawn(controller.run());

    handle.start_location_updates()?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The user drags the map towards Oakland; the fence pulls it back
    handle.propose_region(Region::new(LatLng::new(37.8044, -122.2712), Span::new(0.5, 0.5)))?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = handle.snapshot();
    if let Some(user) = state.user_location {
        println!(
            "final    {:.0} m from user, {} postcards nearby",
            user.distance_to(&state.region.center),
            state.nearby.len()
        );
    }

    handle.shutdown()?;
    running.await?;
    drop(handle);
    drop(provider);
    if printer.join().is_err() {
        log::warn!("event printer panicked");
    }
    Ok(())
}
