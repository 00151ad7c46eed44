//! Composite States with History
//!
//! This example demonstrates a media player whose `On` state remembers
//! where it was when the power was cut.
//!
//! Key concepts:
//! - Composite states with their own region and initial pseudo-state
//! - Shallow history restoring the last active child
//! - Entry and exit behaviours running innermost-first on exit
//! - Triggers bubbling from the active leaf up to its ancestors
//!
//! Run with: cargo run --example history_walkthrough

use statechart::{MapTransaction, ModelBuilder, PseudoStateKind, StateMachine, TransitionBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Power,
    Play,
    Pause,
}

fn on(button: Button) -> impl Fn(&Button) -> bool + Send + Sync + 'static {
    move |b| *b == button
}

fn player() -> StateMachine<Button> {
    let mut builder = ModelBuilder::new("player");
    let top = builder.default_region(builder.root()).unwrap();
    let off = builder.state("Off", top).unwrap();
    let powered = builder.state("On", top).unwrap();
    let start = builder
        .pseudo_state("initial", top, PseudoStateKind::Initial)
        .unwrap();
    builder
        .transition(TransitionBuilder::new().from(start).to(off))
        .unwrap();

    // On remembers its last child through a shallow history pseudo-state.
    let inner = builder.default_region(powered).unwrap();
    let stopped = builder.state("Stopped", inner).unwrap();
    let playing = builder.state("Playing", inner).unwrap();
    let paused = builder.state("Paused", inner).unwrap();
    let first = builder
        .pseudo_state("initial", inner, PseudoStateKind::Initial)
        .unwrap();
    let history = builder
        .pseudo_state("history", inner, PseudoStateKind::ShallowHistory)
        .unwrap();
    builder
        .transition(TransitionBuilder::new().from(first).to(stopped))
        .unwrap();

    for (from, to, button) in [
        (stopped, playing, Button::Play),
        (paused, playing, Button::Play),
        (playing, paused, Button::Pause),
    ] {
        builder
            .transition(TransitionBuilder::new().from(from).to(to).when(on(button)))
            .unwrap();
    }
    builder
        .transition(TransitionBuilder::new().from(off).to(history).when(on(Button::Power)))
        .unwrap();
    builder
        .transition(TransitionBuilder::new().from(powered).to(off).when(on(Button::Power)))
        .unwrap();

    for state in [off, powered, stopped, playing, paused] {
        let name = builder.model().vertex(state).name().to_string();
        let exit_name = name.clone();
        builder
            .on_entry(state, move |_, _| println!("    enter {name}"))
            .unwrap();
        builder
            .on_exit(state, move |_, _| println!("    exit  {exit_name}"))
            .unwrap();
    }

    builder.build().unwrap()
}

fn show(machine: &StateMachine<Button>, tx: &MapTransaction) {
    let leaves: Vec<&str> = machine
        .active_leaves(tx)
        .into_iter()
        .map(|v| machine.model().vertex(v).qualified_name())
        .collect();
    println!("  Active: {}\n", leaves.join(", "));
}

fn main() {
    println!("=== Composite States with History ===\n");

    let machine = player();
    let mut tx = MapTransaction::new();

    println!("Initialise:");
    machine.initialise(&mut tx).unwrap();
    show(&machine, &tx);

    for button in [
        Button::Power,
        Button::Play,
        Button::Pause,
        Button::Power,
        Button::Power,
        Button::Play,
    ] {
        println!("Press {button:?}:");
        let outcome = machine.evaluate(&mut tx, &button).unwrap();
        if !outcome.is_handled() {
            println!("    (ignored)");
        }
        show(&machine, &tx);
    }

    println!("Key Takeaways:");
    println!("- The first Power enters On through history with nothing recorded, so the initial is used");
    println!("- Power while Paused exits Paused before On, innermost first");
    println!("- The next Power restores Paused instead of Stopped");
    println!("- Power is declared on On, so it works from every child state");

    println!("\n=== Example Complete ===");
}
