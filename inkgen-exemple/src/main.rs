use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use inkgen_core::io::{read_lines, save_run};
use inkgen_core::model::batch::generate_batch;
use inkgen_core::model::synthetic::SyntheticModel;
use inkgen_core::{Engine, GenerationConfig, RunOutput, Vocabulary};
use log::info;

#[derive(Parser)]
#[command(name = "inkgen", about = "Sample handwriting for a text")]
struct Args {
    /// Text to write. Prompts for a new text after every run when absent.
    #[arg(short, long)]
    text: Option<String>,

    /// Sampling bias: higher is cleaner and less varied
    #[arg(short, long, default_value_t = 1.0)]
    bias: f32,

    /// Ignore the model's finish signal and use the whole step budget
    #[arg(short, long)]
    force: bool,

    /// Step budget per character
    #[arg(long, default_value_t = 60)]
    max_steps_per_char: usize,

    /// Random seed (a fresh one per run when absent)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Save each run next to this path (extension replaced by `.run`)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Generate every line of this file in parallel, then exit
    #[arg(long, conflicts_with = "text")]
    batch: Option<PathBuf>,

    /// Print attention and density details for each run
    #[arg(long)]
    info: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Bias, budget and force flag are validated by the config setters
    let mut config = GenerationConfig::default().with_force_run(args.force);
    config.set_bias(args.bias)?;
    config.set_max_steps_per_char(args.max_steps_per_char)?;
    config.seed = args.seed;

    // The synthetic model stands in for a restored network
    let vocabulary = Vocabulary::default_english();

    if let Some(path) = &args.batch {
        let texts = read_lines(path)?;
        let seed = batch_seed(args.seed);
        let results = generate_batch(|| SyntheticModel::new(&vocabulary), &vocabulary, &texts, &config, seed);
        for (text, result) in texts.iter().zip(results) {
            match result {
                Ok(run) => report(&run, args.info),
                Err(e) => eprintln!("{text:?}: {e}"),
            }
        }
        return Ok(());
    }

    let mut engine = Engine::new(SyntheticModel::new(&vocabulary), vocabulary.clone());
    let stdin = io::stdin();

    loop {
        let text = match &args.text {
            Some(text) => text.clone(),
            None => {
                print!("What to generate: ");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                line.trim_end_matches(['\r', '\n']).to_owned()
            }
        };

        let mut rng = inkgen_core::model::engine::seeded_rng(config.seed);
        let result = engine.generate_with_cancel(&text, &config, &mut rng, |step| {
            eprint!("\r[{step:5}] sampling...");
            true
        });
        eprintln!();

        match result {
            Ok(run) => {
                report(&run, args.info);
                if let Some(path) = &args.save {
                    let written = save_run(path, &run)?;
                    println!("Saved to {}", written.display());
                }
            }
            // A failed run only costs this text; ask for the next one
            Err(e) if args.text.is_none() => eprintln!("Generation failed: {e}"),
            Err(e) => return Err(e.into()),
        }

        if args.text.is_some() {
            break;
        }
    }

    Ok(())
}

/// Base seed of a batch: the given one, or a fresh one logged so the batch
/// can be replayed.
fn batch_seed(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    info!("batch seed {seed}");
    seed
}

/// Prints the strokes of a run (y flipped, as plotted) and optional details.
fn report(run: &RunOutput, info: bool) {
    let strokes = run.strokes();
    println!("{:?}: {} ({} steps, {} strokes)", run.text, run.stop_reason, run.steps(), strokes.len());
    for warning in &run.warnings {
        println!("  unknown character {:?} at {}", warning.character, warning.position);
    }

    if let Some(bounds) = run.bounds() {
        println!(
            "  extent x [{:.2}, {:.2}] y [{:.2}, {:.2}]",
            bounds.min_x, bounds.max_x, -bounds.max_y, -bounds.min_y
        );
    }

    for (i, stroke) in strokes.iter().enumerate() {
        let path: Vec<String> = stroke
            .points()
            .iter()
            .map(|[x, y]| format!("({x:.2},{:.2})", -y))
            .collect();
        println!("  stroke {i}: {}", path.join(" "));
    }

    if info {
        for step in &run.trace {
            // Which character the model is attending to
            let focus = step
                .phi
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(u, _)| u)
                .unwrap_or(0);
            println!(
                "  [{:5}] focus {focus:3} component {} finish {:.3}",
                step.step, step.component, step.finish
            );
        }
        for center in run.density_centers() {
            println!(
                "  density ({:.2},{:.2}) std ({:.3},{:.3}) rho {:.2}",
                center.x, -center.y, center.std1, center.std2, center.rho
            );
        }
    }
}
