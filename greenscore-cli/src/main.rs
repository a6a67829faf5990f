use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use greenscore_classify::HfClassifier;
use greenscore_core::{estimate, percentage, Category};
use greenscore_engine::{format_summary, Engine};

mod auth;
mod config;
mod logging;
mod state;

use state::JsonFileStore;

#[derive(Parser, Debug)]
#[command(
    name = "greenscore",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GREENSCORE_BUILD_SHA"), ")"),
    about = "Turn daily activities into water, energy, transport and waste footprints"
)]
struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify an activity, estimate its impact and record it
    Log {
        /// Free-text description, e.g. "drove 5km by car"
        text: Vec<String>,
    },

    /// Record an activity under a category you choose (no classifier call)
    Record {
        #[arg(long, short)]
        category: Category,
        text: Vec<String>,
    },

    /// Show the estimate for an activity without recording it
    Estimate {
        #[arg(long, short)]
        category: Category,
        text: Vec<String>,
    },

    /// Running totals and progress against daily budgets
    Progress {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recent activity log, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Zero all totals and clear history
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Streak counter
    Streak {
        #[command(subcommand)]
        command: StreakCommand,
    },

    /// Challenges and points
    Challenges {
        #[command(subcommand)]
        command: ChallengeCommand,
    },

    /// Configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Classifier credential
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StreakCommand {
    /// Add one day to the streak
    Bump,
}

#[derive(Subcommand, Debug)]
enum ChallengeCommand {
    List,
    Start { id: String },
    Complete { id: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.greenscore/config.toml with defaults
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store a Hugging Face API token in ~/.greenscore/auth.json
    PasteToken,
}

type CliEngine = Engine<HfClassifier, JsonFileStore>;

fn open_engine(cfg: &config::Config) -> Result<CliEngine> {
    let token = auth::resolve_token()?;
    if token.is_empty() {
        tracing::warn!(
            "no classifier token; set {} or run: greenscore auth paste-token",
            auth::TOKEN_ENV
        );
    }
    let classifier = HfClassifier::new(&cfg.classifier.endpoint, token);
    tracing::debug!(endpoint = classifier.endpoint(), "using zero-shot classifier");
    let store = JsonFileStore::open(state::store_path()?)?;
    Engine::open(classifier, store, cfg.engine_config()).context("open footprint store")
}

fn join_text(words: &[String]) -> String {
    words.join(" ")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    logging::init(&cfg.log.level, cli.verbose);

    match cli.command {
        Command::Log { text } => {
            let engine = open_engine(&cfg)?;
            println!("{}", engine.submit(&join_text(&text)).await);
        }

        Command::Record { category, text } => {
            let engine = open_engine(&cfg)?;
            match engine.record(&join_text(&text), category).await {
                Ok(r) => println!("{}", r.summary),
                Err(e) => println!("{}", e.user_message()),
            }
        }

        Command::Estimate { category, text } => {
            let text = join_text(&text);
            if text.trim().is_empty() {
                bail!("nothing to estimate");
            }
            let est = estimate(&text, category);
            let pct = percentage(category, est.as_ref().map(|e| e.raw_value).unwrap_or(0.0));
            println!("{}", format_summary(category, est.as_ref(), pct));
        }

        Command::Progress { json } => {
            let engine = open_engine(&cfg)?;
            let p = engine.progress().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&p)?);
            } else {
                println!("Streak: {} days | Points: {}\n", p.streak_days, p.points);
                for (c, pct) in &p.percentages {
                    println!(
                        "{:<10} {:>14}  {:>5.1}%",
                        c.display_name(),
                        c.format_magnitude(p.totals.get(*c)),
                        pct
                    );
                }
                println!("\nWeighted total: {:.2} | Overall: {:.1}%", p.totals.total, p.overall);
            }
        }

        Command::History { limit } => {
            let engine = open_engine(&cfg)?;
            let entries = engine.history(limit).await;
            if entries.is_empty() {
                println!("(no history yet)");
            }
            for e in entries {
                println!(
                    "{}: {} → {}",
                    e.timestamp.format("%Y-%m-%d %H:%M"),
                    e.input,
                    e.summary.replace('\n', " | ")
                );
            }
        }

        Command::Reset { yes } => {
            if !yes && !confirm("Reset all totals and history?")? {
                println!("Aborted.");
                return Ok(());
            }
            let engine = open_engine(&cfg)?;
            engine.reset().await?;
            println!("Footprint reset.");
        }

        Command::Streak { command } => match command {
            StreakCommand::Bump => {
                let engine = open_engine(&cfg)?;
                let days = engine.increment_streak().await?;
                println!("Streak: {days} days");
            }
        },

        Command::Challenges { command } => {
            let engine = open_engine(&cfg)?;
            match command {
                ChallengeCommand::List => {
                    for (c, st) in engine.challenges().await {
                        let status = if st.completed {
                            "done"
                        } else if st.active {
                            "active"
                        } else {
                            "-"
                        };
                        println!("[{status:>6}] {:<20} {} ({} pts, {})", c.id, c.title, c.points, c.duration);
                        println!("         {} | {}", c.description, c.impact);
                    }
                    println!("\nPoints: {}", engine.progress().await.points);
                }
                ChallengeCommand::Start { id } => {
                    engine.start_challenge(&id).await?;
                    println!("Challenge accepted: {id}");
                }
                ChallengeCommand::Complete { id } => {
                    let awarded = engine.complete_challenge(&id).await?;
                    if awarded == 0 {
                        println!("{id} was already completed.");
                    } else {
                        println!("Completed {id}: +{awarded} points");
                    }
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => match config::init_config()? {
                (p, true) => println!("Wrote {}", p.display()),
                (p, false) => println!("Config already exists: {}", p.display()),
            },
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteToken => auth::paste_token()?,
        },
    }

    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    use std::io::Write;
    print!("{question} [y/N]: ");
    std::io::stdout().flush().ok();
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(matches!(s.trim().to_lowercase().as_str(), "y" | "yes"))
}
