use ordered_map::{KeyNotFound, OrderedMap, OrderedSet};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn translate<'a>(
    words: &'a OrderedMap<String, String>,
    word: &str,
) -> Result<&'a str, KeyNotFound> {
    let translation = words.get(word)?;
    Ok(translation.as_str())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    let log_level = if std::env::var_os("VERBOSE").is_some() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut words = OrderedMap::new();
    for (english, russian) in [
        ("sky", "небо"),
        ("star", "звезда"),
        ("moon", "луна"),
        ("planet", "планета"),
        ("comet", "комета"),
    ] {
        words.insert(english.to_string(), russian.to_string());
    }
    if !words.insert("star".to_string(), "светило".to_string()) {
        info!("\"star\" is already present, keeping the first translation");
    }

    if let Ok(translation) = words.get_mut("moon") {
        translation.push_str(" (спутник)");
    }
    words.remove("comet");

    let mut counter = 0;
    words.traverse_in_order(|english, russian| {
        counter += 1;
        println!("{counter}. {english} - {russian}");
    });

    for word in ["planet", "asteroid"] {
        match translate(&words, word) {
            Ok(translation) => info!(word, translation, "translated"),
            Err(err) => warn!(word, %err, "no translation"),
        }
    }

    let mut set = OrderedSet::new();
    for x in 0..5 {
        set.insert(x);
    }
    assert!(set.contains(&1));
    set.remove(&1);
    assert!(!set.contains(&1));

    print!("{{ ");
    for x in &set {
        print!("{x}, ");
    }
    println!("}}");

    Ok(())
}
