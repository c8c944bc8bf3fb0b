//! Project validation command: load, compile, print the plan.

use std::path::PathBuf;

use clap::Args;
use patchbay_core::{InputSource, NodeKind, compile};
use patchbay_project::Project;

#[derive(Args)]
pub struct CheckArgs {
    /// Project file (JSON)
    project: PathBuf,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let project = Project::load(&args.project)?;
    let model = &project.model;
    let plan = compile(model, &[], 1).map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("{} is valid", args.project.display());
    println!(
        "  {} modules, {} connections, {} plan steps",
        model.node_count(),
        model.edge_count(),
        plan.step_count()
    );
    match plan.sink_slot() {
        Some(slot) => println!("  sink at plan slot {slot}"),
        None => println!("  no sink: the patch renders silence"),
    }

    println!("\nEvaluation order:");
    for (slot, step) in plan.steps().iter().enumerate() {
        let kind = model.kind(step.node).map_or("?", NodeKind::name);
        let inputs: Vec<String> = step
            .inputs
            .iter()
            .take(usize::from(
                model.kind(step.node).map_or(0, NodeKind::input_arity),
            ))
            .map(|input| match input {
                InputSource::Literal(v) => format!("{v}"),
                InputSource::Slot(p) => format!("slot {p}"),
            })
            .collect();
        println!("  [{slot:3}] {} {} <- ({})", step.node, kind, inputs.join(", "));
    }

    Ok(())
}
