use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use dialoguer::{Input, Select};
use rand::SeedableRng;
use rand::rngs::StdRng;

use storyreel::{
    Pipeline, Review, RunOutcome, StoryConfig, StoryGroup, StoryHost, StoryPackage, StoryPreview,
};

#[derive(Parser, Debug)]
#[command(name = "storyreel", version, about = "Turn a community story into a narrated vertical video")]
struct Cli {
    /// JSON config file (defaults to ./storyreel.json when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Terminal prompts for group choice and story approval.
struct TerminalHost;

impl StoryHost for TerminalHost {
    fn choose_group(&mut self, groups: &[StoryGroup]) -> Option<usize> {
        let labels: Vec<String> = groups
            .iter()
            .map(|g| {
                let subs: Vec<String> = g.subreddits.iter().map(|s| format!("r/{s}")).collect();
                format!("{} ({}) - {}", g.name, subs.join(", "), g.blurb)
            })
            .collect();
        Select::new()
            .with_prompt("Which kind of story?")
            .items(&labels)
            .default(0)
            .interact_opt()
            .unwrap_or(None)
    }

    fn review(&mut self, _story: &StoryPackage, preview: &StoryPreview) -> Review {
        println!();
        println!("Title: {}", preview.title);
        println!(
            "Score: {} | Comments: {}",
            preview.score, preview.comment_count
        );
        println!("URL: {}", preview.url);
        println!();
        println!("{}", preview.body_preview);
        println!();
        let fit = if preview.fits_ceiling {
            "within limit"
        } else {
            "over limit"
        };
        println!(
            "Estimated duration: {:.1}s ({fit})",
            preview.estimated_duration_seconds
        );

        loop {
            let answer: String = match Input::new()
                .with_prompt("Use this story? [y]es / [n]o (blacklist) / [q]uit")
                .interact_text()
            {
                Ok(answer) => answer,
                Err(_) => return Review::Quit,
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Review::Approve,
                "n" | "no" => return Review::Reject,
                "q" | "quit" => return Review::Quit,
                _ => println!("Please answer y, n or q."),
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = StoryConfig::load(cli.config.as_deref()).context("load config")?;
    let mut pipeline = Pipeline::from_config(config).context("set up pipeline")?;
    let mut rng = StdRng::from_entropy();

    match pipeline.run(&mut TerminalHost, &mut rng)? {
        RunOutcome::Rendered(video) => {
            eprintln!("wrote {}", video.path.display());
        }
        RunOutcome::Quit => {
            tracing::info!("stopped by user");
        }
        RunOutcome::NoStory => {
            eprintln!("no suitable stories found");
        }
    }
    Ok(())
}
