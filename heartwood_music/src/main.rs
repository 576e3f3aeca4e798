// Heartwood CLI entry point.
//
// Takes a phrase, classifies its affect, plans a harmony track, and renders
// it to a humanized MIDI file in the output directory.
//
// Usage:
//   cargo run -p heartwood_music -- "I can't stop thinking about what we lost"
//     [--motivation N] [--chaos X] [--vulnerability X] [--seed N]
//     [--output DIR] [--config FILE] [--plan-json]
//
// Logging is controlled with RUST_LOG (e.g. RUST_LOG=heartwood_music=debug).

use clap::Parser;
use heartwood_music::affect::kit_for_mood;
use heartwood_music::config::GeneratorConfig;
use heartwood_music::render::{PhraseRequest, RenderBridge, RenderStatus};
use heartwood_music::rng::rng_for;
use heartwood_music::session::{Session, strategy_prompt};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "generate", about = "Render a phrase into a humanized harmony track")]
struct Args {
    /// The phrase to interpret.
    text: String,

    /// Motivation, 1 (sketch) to 10 (full structure).
    #[arg(long, default_value_t = 5)]
    motivation: i64,

    /// Chaos tolerance, 0.0 to 1.0. Drives tempo offset and timing looseness.
    #[arg(long, default_value_t = 0.5)]
    chaos: f64,

    /// Vulnerability, 0.0 to 1.0. Softer and less even velocities.
    #[arg(long, default_value_t = 0.5)]
    vulnerability: f64,

    /// Seed for reproducible output. Omit for a random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the MIDI file is written into.
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// JSON config overriding the generator defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the harmony plan as JSON and exit without rendering.
    #[arg(long)]
    plan_json: bool,
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    if args.plan_json {
        let mut session = Session::new();
        session.set_scales(args.motivation, args.chaos);
        session.process_input(&args.text);
        println!("{}", serde_json::to_string_pretty(&session.generate_plan())?);
        return Ok(());
    }

    let request = PhraseRequest {
        motivation: args.motivation,
        chaos: args.chaos,
        vulnerability: args.vulnerability,
        seed: args.seed,
        output_dir: args.output.clone(),
    };
    let bridge = RenderBridge::probe(config);
    let result = bridge.render_phrase(&args.text, &request);
    let plan = &result.plan;
    let strategy = strategy_prompt(args.chaos, &mut rng_for(args.seed));

    println!("=== Heartwood ===");
    println!("Input:    {}", result.input.tag());
    println!("Key:      {}", plan.key_name());
    println!("Tempo:    {} BPM", plan.tempo_bpm);
    println!("Length:   {} bars ({})", plan.length_bars, plan.structure);
    println!("Chords:   {}", plan.progression());
    println!("Kit:      {}", kit_for_mood(result.input.tag()));
    if let Some(card) = strategy {
        println!("Strategy: {card}");
    }
    match &result.outcome.status {
        RenderStatus::Written { notes } => {
            println!("Wrote {notes} notes to {}", result.outcome.path.display())
        }
        RenderStatus::Degraded(reason) => println!(
            "Nothing written ({reason}); intended path {}",
            result.outcome.path.display()
        ),
    }
    Ok(())
}
