use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use journey_api::assemble_document_str;
use journey_core::{JourneyConfig, JourneySnapshot, TimelineItem};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "journey-cli",
    about = "Assemble a care-journey timeline from a portal API JSON document."
)]
struct Args {
    /// Path to the JSON document (patient, visits, milestones).
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file whose `rules` replace the built-in visibility rules.
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Print the full snapshot as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;

    let config = match &args.rules {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read rules file {path:?}"))?;
            JourneyConfig::from_json_str(&raw)
                .with_context(|| format!("Invalid rules file {path:?}"))?
        }
        None => JourneyConfig::default(),
    };
    tracing::debug!(rules = config.rules.len(), "loaded visibility rules");

    let snapshot = assemble_document_str(&data, &config)?;
    tracing::info!(
        patient_id = %snapshot.patient.id,
        items = snapshot.items.len(),
        "journey assembled"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

fn print_summary(snapshot: &JourneySnapshot) {
    let visits = snapshot.items.iter().filter(|item| item.is_visit()).count();
    println!(
        "Generated at: {}\nVisits: {}\nMilestones: {}\nProgress: {}% complete",
        snapshot.generated_at,
        visits,
        snapshot.items.len() - visits,
        snapshot.progress.percent_complete
    );

    for item in snapshot.timeline() {
        let date = item
            .effective_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        match item {
            TimelineItem::Visit { payload, .. } => println!(
                "{date:>10}  visit      {} ({}, {})",
                payload.title.as_deref().unwrap_or(&payload.id),
                payload.visit_type,
                payload.status
            ),
            TimelineItem::Milestone { payload, .. } => {
                println!("{date:>10}  milestone  {}", payload.title)
            }
        }
    }
}
