//! Demonstration of formtrap on a simulated form.
//!
//! This example shows how to:
//! 1. Mount a guard on a document event source
//! 2. Feed pointer, key and focus events
//! 3. Submit a human-looking session and a scripted one
//! 4. Inspect the detection log
//!
//! Run with: cargo run --example form_demo

use std::sync::Arc;

use formtrap::{
    Clock, DocumentEvents, FormFields, FormGuard, GuardConfig, HostSignals, InteractionEvent,
    ManualClock, SubmitOutcome, DISCLOSURE,
};

fn fields() -> FormFields {
    FormFields::from([
        ("name".to_string(), "Ada Lovelace".to_string()),
        ("email".to_string(), "ada@example.com".to_string()),
        ("hp_website_url".to_string(), String::new()),
    ])
}

fn print_outcome(label: &str, outcome: &SubmitOutcome) {
    println!("=== {label} ===");
    match outcome.result() {
        Some(result) => {
            println!("  Outcome: {}", if outcome.is_bot() { "withheld" } else { "submitted" });
            println!("{}", result.summary());
        }
        None => println!("  Outcome: submission already pending"),
    }
    println!();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("formtrap=debug")
        .init();

    println!("formtrap - Form Demo");
    println!("====================");
    println!("{DISCLOSURE}");

    // A person: moves the pointer, focuses two fields, types unevenly.
    let clock = Arc::new(ManualClock::new(0));
    let events = DocumentEvents::new();
    let guard = FormGuard::with_clock(GuardConfig::default(), clock.clone())
        .with_environment(Arc::new(HostSignals::human()))
        .on_bot_detected(|result| println!("  [callback] bot detected, score {}", result.score));
    guard.mount(&events);

    println!("Honeypot markup:");
    println!("{}", guard.honeypot_markup());
    println!();

    for i in 0..30u64 {
        clock.set(150 + i * 33);
        events.dispatch(InteractionEvent::pointer_move(
            (20 + i * 14) as f64,
            (200 + (i * 37) % 60) as f64,
            clock.now_ms(),
        ));
    }
    guard.on_focus();
    let gaps = [180u64, 95, 240, 130, 310, 88, 175, 205, 140, 260, 120, 190];
    let mut at = 1_400;
    for (gap, key) in gaps.iter().zip("ada lovelace".chars()) {
        at += gap;
        clock.set(at);
        events.dispatch(InteractionEvent::key_down(key.to_string(), at));
    }
    guard.on_focus();
    clock.set(6_500);

    let outcome = guard
        .submit(fields(), |payload, _| async move {
            println!("  [handler] sending {} fields", payload.len());
            anyhow::Ok(())
        })
        .await;
    print_outcome("Human session", &outcome);
    guard.unmount();

    // A script: no pointer, a filled trap, submitted at once.
    let script = FormGuard::with_clock(GuardConfig::default(), clock.clone())
        .with_environment(Arc::new(HostSignals::headless()))
        .on_honeypot_trip(|field| println!("  [callback] honeypot {field} filled"))
        .on_bot_detected(|result| println!("  [callback] bot detected, score {}", result.score));
    script.on_honeypot_change("hp_website_url", "http://spam.example");

    let outcome = script
        .submit(fields(), |_, _| async { anyhow::Ok(()) })
        .await;
    print_outcome("Scripted session", &outcome);

    println!("Detection log (scripted guard):");
    println!("{}", script.log().summary());
}
