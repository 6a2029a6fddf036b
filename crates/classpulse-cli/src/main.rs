//! classpulse CLI: at-risk student dashboards and practice quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use classpulse_core::risk::RiskLevel;

mod commands;

const DEFAULT_LOG_FILTER: &str = "classpulse_core=info,classpulse_providers=info";

#[derive(Parser)]
#[command(
    name = "classpulse",
    version,
    about = "Flag at-risk students and generate practice quizzes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List students with their risk scores
    Students {
        /// Roster JSON file (default: synthesized demo roster)
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Show one student's risk profile and assignments
    Student {
        /// Student id (e.g. "student-001")
        #[arg(long)]
        id: String,

        /// Roster JSON file
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Course-wide risk analytics
    Analytics {
        /// Roster JSON file
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save a JSON course report to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate a practice quiz for one student
    Quiz {
        /// Student id
        #[arg(long)]
        student: String,

        /// Topic tag (e.g. "linear_equations")
        #[arg(long)]
        topic: String,

        /// Number of questions
        #[arg(long, default_value = "5")]
        count: usize,

        /// Roster JSON file
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate quizzes for every student, optionally filtered by risk level
    QuizAll {
        /// Topic tag
        #[arg(long)]
        topic: String,

        /// Number of questions per quiz
        #[arg(long, default_value = "5")]
        count: usize,

        /// Only students at this risk level: high, medium, low
        #[arg(long)]
        level: Option<RiskLevel>,

        /// Max concurrent generations (default: from config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Roster JSON file
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a synthesized demo roster
    Demo {
        /// Output JSON file
        #[arg(long)]
        output: PathBuf,

        /// Number of students
        #[arg(long, default_value = "30")]
        count: usize,

        /// RNG seed
        #[arg(long, default_value_t = commands::DEMO_SEED)]
        seed: u64,
    },

    /// Create a starter classpulse.toml
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Students { roster } => commands::students::execute(roster),
        Commands::Student { id, roster } => commands::student::execute(id, roster),
        Commands::Analytics {
            roster,
            format,
            output,
        } => commands::analytics::execute(roster, format, output),
        Commands::Quiz {
            student,
            topic,
            count,
            roster,
            config,
        } => commands::quiz::execute(student, topic, count, roster, config).await,
        Commands::QuizAll {
            topic,
            count,
            level,
            parallelism,
            roster,
            config,
        } => commands::quiz_all::execute(topic, count, level, parallelism, roster, config).await,
        Commands::Demo {
            output,
            count,
            seed,
        } => commands::demo::execute(output, count, seed),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
