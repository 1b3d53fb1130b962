//! Example showing conflict spans merging, splitting, and dissolving as busy
//! times come and go.
//!
//! Run with: `cargo run --example merge_split`

use overlane::busytime::BusyTime;
use overlane::conflict::ConflictTracker;
use overlane::layout::StyledElement;
use overlane::timespan::Timespan;
use qtty::Minute;

fn main() {
    println!("=== Conflict Span Merge and Split Example ===\n");

    let mut tracker = ConflictTracker::<Minute>::new();

    // Two clusters with a quiet stretch between them
    println!("--- Two Separate Conflicts ---");
    book(&mut tracker, "a", 0.0, 30.0);
    book(&mut tracker, "b", 20.0, 50.0);
    book(&mut tracker, "x", 90.0, 120.0);
    book(&mut tracker, "y", 110.0, 140.0);
    print_spans(&tracker);

    let morning = tracker.span_id_of("a").unwrap();
    let afternoon = tracker.span_id_of("x").unwrap();

    // One long booking overlaps members of both spans
    println!("\n--- Bridging Both Conflicts ---");
    book(&mut tracker, "bridge", 40.0, 115.0);
    print_spans(&tracker);
    println!(
        "Morning handle still valid? {}",
        tracker.conflict_span(morning).is_some()
    );
    println!(
        "Afternoon handle still valid? {}",
        tracker.conflict_span(afternoon).is_some()
    );

    // Removing the bridge breaks the cluster back apart
    println!("\n--- Removing the Bridge ---");
    match tracker.remove("bridge") {
        Ok((busy, _element)) => println!("✓ Removed {}", busy),
        Err(e) => println!("✗ Failed: {}", e),
    }
    print_spans(&tracker);

    // A span with a single survivor dissolves entirely
    println!("\n--- Shrinking to Nothing ---");
    match tracker.remove("a") {
        Ok(_) => println!("✓ Removed a"),
        Err(e) => println!("✗ Failed: {}", e),
    }
    print_spans(&tracker);
    println!(
        "b conflicts with anything? {}",
        tracker.span_id_of("b").is_some()
    );
    println!(
        "b lane style: {:?}",
        tracker.element("b").and_then(StyledElement::style)
    );

    println!("\n=== Example Complete ===");
}

fn book(tracker: &mut ConflictTracker<Minute>, id: &str, start: f64, end: f64) {
    let span = Timespan::from_f64(start, end).unwrap();
    match tracker.add(BusyTime::new(id, span), StyledElement::new()) {
        Ok(_) => println!("✓ Added {} {}", id, span),
        Err(e) => println!("✗ Failed to add {}: {}", id, e),
    }
}

fn print_spans(tracker: &ConflictTracker<Minute>) {
    if tracker.span_count() == 0 {
        println!("  (no conflicts)");
        return;
    }
    for (span_id, span) in tracker.spans() {
        println!("  span {}: {}", span_id, span);
        for (index, column) in span.columns().iter().enumerate() {
            println!("    column {}: {:?}", index, column.members());
        }
    }
}
