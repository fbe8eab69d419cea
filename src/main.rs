use anyhow::Result;
use breach_evidence_tools::commands;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "evidence-audit")]
#[command(about = "Account breach evidence extraction and correlation tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an evidence directory and write the investigative report
    Analyze {
        /// Directory containing the exported account data
        evidence_dir: String,

        /// Incident date the window is centered on (e.g. "2024-12-24")
        #[arg(long)]
        incident_date: String,

        /// Days before the incident date to include
        #[arg(long, default_value = "14")]
        days_before: i64,

        /// Days after the incident date to include
        #[arg(long, default_value = "14")]
        days_after: i64,

        /// Report output path
        #[arg(short, long, default_value = "BREACH_REPORT.txt")]
        output: String,

        /// Also write a plain-text list of unique IP addresses
        #[arg(long)]
        ips_file: Option<String>,

        /// Also write a one-line-per-event timeline file
        #[arg(long)]
        timeline_file: Option<String>,

        /// Also export all events to CSV
        #[arg(long)]
        export_csv: Option<String>,

        /// Process documents on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Decode a single document and print its extraction summary
    Inspect {
        /// Document to inspect
        file: String,

        /// Incident date for epoch-token matching (defaults to a wide window)
        #[arg(long)]
        incident_date: Option<String>,
    },

    /// Verify an evidence directory before running an analysis
    Check {
        /// Directory containing the exported account data
        evidence_dir: String,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            evidence_dir,
            incident_date,
            days_before,
            days_after,
            output,
            ips_file,
            timeline_file,
            export_csv,
            sequential,
        } => commands::analyze::run(
            &evidence_dir,
            &incident_date,
            days_before,
            days_after,
            &output,
            ips_file.as_deref(),
            timeline_file.as_deref(),
            export_csv.as_deref(),
            sequential,
        ),
        Commands::Inspect {
            file,
            incident_date,
        } => commands::inspect::run(&file, incident_date.as_deref()),
        Commands::Check { evidence_dir } => commands::check::run(&evidence_dir),
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "evidence-audit", &mut std::io::stdout());
            Ok(())
        }
    }
}
