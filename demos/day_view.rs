//! Example walking through the column layout of a calendar day view.
//!
//! Run with: `cargo run --example day_view`

use overlane::busytime::BusyTime;
use overlane::conflict::ConflictTracker;
use overlane::layout::StyledElement;
use overlane::timespan::Timespan;
use qtty::Hour;

fn main() {
    println!("=== Day View Layout Example ===\n");

    let mut tracker = ConflictTracker::<Hour>::new();
    println!("Created empty tracker");

    // Book the morning
    println!("\n--- Booking Busy Times ---");
    book(&mut tracker, "standup", 9.0, 9.5);
    book(&mut tracker, "design-review", 9.25, 10.5);
    book(&mut tracker, "one-on-one", 10.0, 10.75);
    book(&mut tracker, "lunch", 12.0, 13.0);

    println!("\nTracked busy times: {}", tracker.len());
    println!("Conflict spans: {}", tracker.span_count());
    for (span_id, span) in tracker.spans() {
        println!("  span {}: {}", span_id, span);
    }

    // Show the lane each element was assigned
    println!("\n--- Lane Assignment ---");
    print_lanes(&tracker);

    // Query the underlying interval tree directly
    println!("\n--- Who Is Busy Between 9:00 and 10:00? ---");
    let window = Timespan::<Hour>::from_f64(9.0, 10.0).unwrap();
    for busy in tracker.tree().query(window) {
        println!("  - {}", busy);
    }

    // Duplicate ids are rejected without disturbing the layout
    println!("\n--- Attempting a Duplicate Booking ---");
    let retry = BusyTime::new("standup", Timespan::from_f64(15.0, 15.5).unwrap());
    match tracker.add(retry, StyledElement::new()) {
        Ok(_) => println!("✓ Booked standup again"),
        Err(e) => println!("✗ Rejected: {}", e),
    }

    // Cancelling the shared meeting frees both neighbours
    println!("\n--- Cancelling the Design Review ---");
    match tracker.remove("design-review") {
        Ok((busy, _element)) => println!("✓ Cancelled {}", busy),
        Err(e) => println!("✗ Failed: {}", e),
    }
    println!("Conflict spans left: {}", tracker.span_count());
    print_lanes(&tracker);

    // Start the day over
    println!("\n--- Clearing the Day ---");
    tracker.reset();
    println!(
        "Tracked busy times: {}, conflict spans: {}",
        tracker.len(),
        tracker.span_count()
    );

    println!("\n=== Example Complete ===");
}

fn book(tracker: &mut ConflictTracker<Hour>, id: &str, start: f64, end: f64) {
    let span = Timespan::from_f64(start, end).unwrap();
    match tracker.add(BusyTime::new(id, span), StyledElement::new()) {
        Ok(_) => println!("✓ Booked {} {}", id, span),
        Err(e) => println!("✗ Failed to book {}: {}", id, e),
    }
}

fn print_lanes(tracker: &ConflictTracker<Hour>) {
    for busy in tracker.tree().iter() {
        match tracker.element(busy.id()).and_then(StyledElement::style) {
            Some(style) => println!(
                "  {:<14} left {:>8}, width {:>8}",
                busy.id(),
                style.left,
                style.width
            ),
            None => println!("  {:<14} full width", busy.id()),
        }
    }
}
