use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitwrapped::{Config, GitHubClient, Identity, ReportAssembler, ReportConfig, WrappedReport};

#[derive(Parser, Debug)]
#[command(name = "gitwrapped")]
#[command(version)]
#[command(about = "Your year on GitHub, wrapped")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a wrapped report for one user and print it
    Report {
        /// GitHub username to analyze
        #[arg(short, long)]
        username: String,

        /// Output format (json, text, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Number of most recently updated repositories to analyze
        #[arg(long)]
        max_repos: Option<usize>,
    },
    /// Serve the wrapped API over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gitwrapped=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    if config.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; using unauthenticated GitHub API limits");
    }

    match args.command {
        Command::Report {
            username,
            format,
            output,
            max_repos,
        } => {
            if let Some(max_repos) = max_repos {
                config.max_analyzed_repos = max_repos;
            }
            let identity = Identity::parse(&username)?;
            let assembler = build_assembler(&config)?;

            let report = assembler.build_report(&identity).await?;
            output_report(&report, &format, output.as_deref())?;
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let assembler = build_assembler(&config)?;
            gitwrapped::server::serve(&config, assembler).await?;
        }
    }

    Ok(())
}

fn build_assembler(config: &Config) -> anyhow::Result<ReportAssembler> {
    let github = GitHubClient::from_config(config)?;
    Ok(ReportAssembler::new(github, ReportConfig::from(config)))
}

fn output_report(report: &WrappedReport, format: &str, path: Option<&str>) -> anyhow::Result<()> {
    let output = match format {
        "json" => serde_json::to_string_pretty(report)?,
        "markdown" => format_markdown(report),
        _ => format_text(report),
    };

    if let Some(path) = path {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(report: &WrappedReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;
    let commits = &report.commits;

    output.push_str(&format!("\n=== GitHub Wrapped: {} ===\n\n", report.user.login));

    if let Some(ref name) = report.user.name {
        output.push_str(&format!("Name: {}\n", name));
    }
    output.push_str(&format!(
        "{} - {}\n\n",
        report.personality.title, report.personality.description
    ));

    output.push_str(&format!("Commits: {}\n", summary.total_commits));
    output.push_str(&format!("Repositories: {}\n", summary.total_repos));
    output.push_str(&format!("Stars: {}\n", summary.total_stars));
    output.push_str(&format!("Forks: {}\n", summary.total_forks));
    output.push_str(&format!("Years on GitHub: {}\n", summary.years_on_platform));

    if let Some(ref streak) = commits.longest_streak {
        output.push_str(&format!(
            "Longest streak: {} days ({} to {})\n",
            streak.length, streak.start, streak.end
        ));
    }
    if let Some(day) = commits.most_active_day {
        output.push_str(&format!(
            "Most active day: {} ({} commits)\n",
            day, commits.most_active_day_count
        ));
    }
    if let Some(hour) = commits.most_active_hour {
        output.push_str(&format!("Most active hour: {:02}:00 UTC\n", hour));
    }
    output.push_str(&format!(
        "Schedule: {}, {}\n",
        report.personality.coding_schedule, report.personality.activity_type
    ));

    if !report.repositories.languages.is_empty() {
        output.push_str("\nTop Languages:\n");
        for lang in report.repositories.languages.iter().take(5) {
            output.push_str(&format!("  - {}: {:.2}%\n", lang.language, lang.percentage));
        }
    }

    if !report.repositories.top_by_stars.is_empty() {
        output.push_str("\nTop Repositories:\n");
        for repo in &report.repositories.top_by_stars {
            output.push_str(&format!(
                "  - {} ({} stars, {} forks)\n",
                repo.name, repo.stargazers_count, repo.forks_count
            ));
        }
    }

    output.push_str(&format!("\nBadges: {}\n", report.personality.badges.join(", ")));

    if report.partial_failures > 0 {
        output.push_str(&format!(
            "\n({} repositories could not be analyzed)\n",
            report.partial_failures
        ));
    }

    output
}

fn format_markdown(report: &WrappedReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    output.push_str(&format!("# GitHub Wrapped: {}\n\n", report.user.login));
    output.push_str(&format!(
        "**{}**: {}\n\n",
        report.personality.title, report.personality.description
    ));

    output.push_str("## Summary\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Commits | {} |\n", summary.total_commits));
    output.push_str(&format!("| Repositories | {} |\n", summary.total_repos));
    output.push_str(&format!("| Stars | {} |\n", summary.total_stars));
    output.push_str(&format!("| Forks | {} |\n", summary.total_forks));
    output.push_str(&format!("| Open Issues | {} |\n", summary.total_issues));
    if let Some(ref streak) = report.commits.longest_streak {
        output.push_str(&format!("| Longest Streak | {} days |\n", streak.length));
    }

    if !report.repositories.languages.is_empty() {
        output.push_str("\n## Languages\n\n");
        output.push_str("| Language | Share |\n|----------|-------|\n");
        for lang in &report.repositories.languages {
            output.push_str(&format!("| {} | {:.2}% |\n", lang.language, lang.percentage));
        }
    }

    output.push_str("\n## Badges\n\n");
    for badge in &report.personality.badges {
        output.push_str(&format!("- {}\n", badge));
    }

    output.push_str(&format!(
        "\n---\n*Generated on {}*\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}
