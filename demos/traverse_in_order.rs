use ordered_map::OrderedMap;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    let log_level = if std::env::var_os("VERBOSE").is_some() {
        Level::TRACE
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut map = OrderedMap::new();
    for key in 1..=6 {
        map.insert(key, key.to_string());
        debug!(key, height = map.height(), "inserted");
    }

    println!("In-order traversal:");
    map.traverse_in_order(|k, v| {
        println!("Key: {}, Value: {}", k, v);
    });

    Ok(())
}
