use std::sync::{Arc, Mutex};

use besmart::{Event, GatewayClient, RefreshOutcome, Thermostat};

fn live_target() -> (String, String, String) {
    let var = |name: &str| std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    (var("BESMART_URL"), var("BESMART_DEVICE"), var("BESMART_ROOM"))
}

/// Run with: cargo test --test integration -- --ignored
/// Requires a reachable gateway:
///   BESMART_URL=http://gateway.local/api/v1.0/ BESMART_DEVICE=<id> BESMART_ROOM=<room id>
#[tokio::test]
#[ignore]
async fn refresh_and_project_live_room() {
    let (url, device, room) = live_target();
    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(vec![]));
    let events_clone = events.clone();

    let client = GatewayClient::builder(url, device)
        .on_event(move |event| {
            events_clone.lock().unwrap().push(event.clone());
        })
        .build()
        .expect("client should build");

    assert_eq!(client.refresh().await, RefreshOutcome::Success);
    assert!(
        !events.lock().unwrap().is_empty(),
        "first refresh should report room fields"
    );

    let mut thermostat = Thermostat::new("live", room, Arc::new(client));
    thermostat.update().await;
    let view = thermostat.view().expect("configured room should be present");
    println!("{view:#?}");
    assert_eq!(thermostat.current_temperature(), Some(view.current_temp));
}
