//! Example replaying an explicit receiver with each deferred call.
//!
//! Two documents share one autosave throttle. Whichever document was edited
//! last before the window closes is the one that gets saved.

use call_throttle::ThrottleBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Document {
    name: &'static str,
}

fn save(document: Arc<Document>, revision: u32) -> Result<u32, String> {
    if revision == 0 {
        return Err(format!("{}: nothing to save", document.name));
    }
    println!("  saved {} at revision {}", document.name, revision);
    Ok(revision)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Invocation Context Example ===\n");

    let autosave = ThrottleBuilder::new_with_context(save)
        .with_pause(200.0)
        .with_trailing_handler(|result| {
            if let Err(e) = result {
                eprintln!("  trailing save failed: {}", e);
            }
        })
        .build()
        .expect("valid pause inside a tokio runtime");

    let notes = Arc::new(Document { name: "notes.txt" });
    let todo = Arc::new(Document { name: "todo.txt" });

    // Leading edge: the error comes straight back
    if let Some(Err(e)) = autosave.call_with(Arc::clone(&notes), 0).into_immediate() {
        println!("  immediate save failed: {}", e);
    }

    // Inside the window: only the last edit survives
    autosave.call_with(Arc::clone(&notes), 1);
    autosave.call_with(Arc::clone(&todo), 1);
    autosave.call_with(Arc::clone(&notes), 2);

    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("\n=== Example Complete ===");
}
