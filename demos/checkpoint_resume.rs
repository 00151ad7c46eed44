//! Checkpoint and Resume
//!
//! This example demonstrates saving a running instance to disk and
//! resuming it later against a freshly built machine.
//!
//! Key concepts:
//! - Machines are read-only; an instance lives in its transaction
//! - Checkpoints record active states and history by qualified name
//! - JSON for readability, binary for compactness
//! - Atomic writes to prevent corruption
//!
//! Run with: cargo run --example checkpoint_resume

use statechart::{
    Checkpoint, MapTransaction, ModelBuilder, PseudoStateKind, StateMachine, TransitionBuilder,
};
use std::fs;
use std::path::{Path, PathBuf};

fn pipeline() -> StateMachine<&'static str> {
    let mut builder = ModelBuilder::new("pipeline");
    let top = builder.default_region(builder.root()).unwrap();
    let start = builder
        .pseudo_state("initial", top, PseudoStateKind::Initial)
        .unwrap();
    let mut previous = start;
    for phase in ["Fetch", "Map", "Reduce", "Done"] {
        let state = builder.state(phase, top).unwrap();
        let transition = TransitionBuilder::new().from(previous).to(state);
        let transition = if previous == start {
            transition
        } else {
            transition.when(|e: &&str| *e == "next")
        };
        builder.transition(transition).unwrap();
        previous = state;
    }
    builder.build().unwrap()
}

fn active(machine: &StateMachine<&'static str>, tx: &MapTransaction) -> String {
    machine
        .active_leaves(tx)
        .into_iter()
        .map(|v| machine.model().vertex(v).name().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn save(dir: &Path, checkpoint: &Checkpoint) -> PathBuf {
    let path = dir.join(format!("{}.json", checkpoint.id));

    // Atomic write: write to temp file, then rename
    let temp = path.with_extension("json.tmp");
    fs::write(&temp, checkpoint.to_json().unwrap()).unwrap();
    fs::rename(&temp, &path).unwrap();

    println!("  [Checkpoint] Saved to {}", path.display());
    path
}

fn main() {
    println!("=== Checkpoint and Resume ===\n");

    let dir = std::env::temp_dir().join("statechart-checkpoints");
    fs::create_dir_all(&dir).unwrap();

    println!("Run 1: Starting new instance");
    println!("----------------------------------------");
    let machine = pipeline();
    let mut tx = MapTransaction::new();
    machine.initialise(&mut tx).unwrap();
    println!("  Active: {}", active(&machine, &tx));
    machine.evaluate(&mut tx, &"next").unwrap();
    println!("  Active: {}", active(&machine, &tx));

    let checkpoint = Checkpoint::capture(&machine, &tx).unwrap();
    let path = save(&dir, &checkpoint);
    println!(
        "  JSON is {} bytes, binary is {} bytes",
        checkpoint.to_json().unwrap().len(),
        checkpoint.to_bytes().unwrap().len()
    );
    println!("  (process stops here)\n");
    drop(machine);

    println!("Run 2: Resuming from checkpoint");
    println!("----------------------------------------");
    let machine = pipeline();
    let json = fs::read_to_string(&path).unwrap();
    let mut tx = Checkpoint::from_json(&json)
        .unwrap()
        .restore(&machine)
        .unwrap();
    println!("  Resumed at: {}", active(&machine, &tx));
    while !machine.is_complete(&tx) {
        machine.evaluate(&mut tx, &"next").unwrap();
        println!("  Active: {}", active(&machine, &tx));
    }

    // Cleanup
    fs::remove_dir_all(&dir).ok();

    println!("\nKey Takeaways:");
    println!("- A checkpoint holds names, so it survives rebuilding the machine");
    println!("- Restoring into a machine with another name is rejected");
    println!("- Atomic writes prevent checkpoint corruption");

    println!("\n=== Example Complete ===");
}
