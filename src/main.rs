// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use book_crew::utils::logging::{format_error, format_info, format_step, format_success, format_warning};
use book_crew::{
    ChapterValidator, Config, Crew, CrewDefinition, HealthReport, LlmClient, Manuscript,
    ManuscriptWriter, OperationTimer, PromptVars, RunSettings, RunSummary, SerperSearch,
    SplitMode, Validator, Verdict,
};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "book_crew")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "Multi-agent LLM pipeline that writes a Markdown book from a topic", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all crew tasks in order and write the formatted manuscript
    Run {
        /// Book topic the idea curator starts from
        #[arg(short, long)]
        topic: Option<String>,

        /// Idea the outline should expand (defaults to the curator's best idea)
        #[arg(long)]
        idea: Option<String>,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// YAML file overriding the built-in agents and tasks
        #[arg(long, value_name = "FILE")]
        crew: Option<PathBuf>,

        #[arg(long)]
        no_search: bool,

        /// Also write a JSON run summary next to the manuscript
        #[arg(long)]
        summary: bool,
    },

    /// Check a chapter draft against chapter and word count bounds
    Validate {
        /// Draft file, or `-` to read stdin
        input: PathBuf,

        #[arg(long)]
        min_chapters: Option<usize>,

        #[arg(long)]
        max_chapters: Option<usize>,

        #[arg(long)]
        min_words: Option<usize>,

        #[arg(long)]
        max_words: Option<usize>,

        /// Only count `Chapter <N>` at the start of a line as a chapter break
        #[arg(long)]
        line_anchored: bool,
    },

    /// Print the resolved agents and tasks
    Crew {
        #[arg(long, value_name = "FILE")]
        crew: Option<PathBuf>,
    },

    /// Report whether the configuration is ready for a run
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    book_crew::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Book Crew");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using defaults and environment",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        Commands::Run {
            topic,
            idea,
            output,
            crew,
            no_search,
            summary,
        } => {
            let options = RunOptions {
                topic,
                idea,
                output,
                crew,
                no_search,
                summary,
            };
            cmd_run(config, options, cli.color).await?;
        }
        Commands::Validate {
            input,
            min_chapters,
            max_chapters,
            min_words,
            max_words,
            line_anchored,
        } => {
            let mut validation = config.validation.clone();
            validation.min_chapters = min_chapters.unwrap_or(validation.min_chapters);
            validation.max_chapters = max_chapters.unwrap_or(validation.max_chapters);
            validation.min_words = min_words.unwrap_or(validation.min_words);
            validation.max_words = max_words.unwrap_or(validation.max_words);
            if line_anchored {
                validation.split_mode = SplitMode::LineAnchored;
            }
            cmd_validate(&input, &validation)?;
        }
        Commands::Crew { crew } => {
            cmd_crew(&config, crew.as_deref())?;
        }
        Commands::Check => {
            cmd_check(&config)?;
        }
    }

    Ok(())
}

struct RunOptions {
    topic: Option<String>,
    idea: Option<String>,
    output: Option<PathBuf>,
    crew: Option<PathBuf>,
    no_search: bool,
    summary: bool,
}

async fn cmd_run(mut config: Config, options: RunOptions, colored: bool) -> Result<()> {
    // A topic given on the command line does not inherit the configured idea.
    if let Some(topic) = options.topic {
        config.pipeline.topic = topic;
        config.pipeline.idea = options.idea;
    } else if options.idea.is_some() {
        config.pipeline.idea = options.idea;
    }
    if let Some(output) = options.output {
        config.output.path = output;
    }
    if options.crew.is_some() {
        config.pipeline.crew_file = options.crew;
    }
    config.output.summary |= options.summary;

    config.validate().context("Invalid configuration")?;
    Validator::validate_run(&config)?;

    let bounds = config.validation.bounds();
    let definition = load_definition(&config, None)?;
    let client = LlmClient::from_config(&config.model).context("Failed to create LLM client")?;
    let vars = PromptVars::new(
        &config.pipeline.topic,
        config.pipeline.idea.as_deref(),
        &bounds,
    );

    let mut settings = RunSettings::from_config(&config);
    settings.colored = colored;

    let mut crew = Crew::new(definition, client, vars, settings)?;

    if config.search.enabled && !options.no_search {
        match &config.search.api_key {
            Some(key) => {
                let search = SerperSearch::new(
                    key.clone(),
                    config.search.results,
                    Duration::from_secs(config.model.timeout_secs),
                )?;
                crew = crew.with_search(search);
            }
            None => warn!("SERPER_API_KEY not set, generating ideas without web search"),
        }
    }

    info!("Writing a book on: {}", config.pipeline.topic);
    let started_at = Utc::now();
    let timer = OperationTimer::new("crew run");

    let output = crew.kickoff().await.context("Crew run failed")?;
    let final_output = output
        .final_output()
        .context("Crew finished without any task output")?;

    let manuscript = Manuscript::from_formatter_output(&config.pipeline.topic, &final_output.raw);
    if let Some(title) = &manuscript.title {
        info!("Manuscript title: {}", title);
    }
    if manuscript.chapter_count() == 0 {
        println!(
            "{}",
            format_warning("Manuscript has no `# Chapter N: Title` headings")
        );
    }

    let writer = ManuscriptWriter::new(&config.output.path);
    writer
        .write_manuscript(&manuscript)
        .context("Failed to write manuscript")?;

    let chapters = manuscript.chapter_count();
    let words = manuscript.word_count;

    if config.output.summary {
        let summary = RunSummary::new(crew.model(), started_at, writer.path(), manuscript, &output);
        let path = writer.write_summary(&summary, config.output.pretty)?;
        println!("{}", format_info(&format!("Summary: {}", path.display())));
    }

    timer.finish();
    println!(
        "{}",
        format_success(&format!(
            "Wrote {} chapters ({} words) to {}",
            chapters,
            words,
            config.output.path.display()
        ))
    );

    Ok(())
}

fn cmd_validate(input: &Path, validation: &book_crew::ValidationConfig) -> Result<()> {
    let bounds = validation.bounds();
    bounds.check()?;

    let text = if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read draft from stdin")?;
        buffer
    } else {
        Validator::validate_input_file(input)?;
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };
    Validator::validate_content_not_empty(&text)?;

    let validator = ChapterValidator::new(bounds).with_mode(validation.split_mode);
    let fragments = validator.fragments(&text).len();

    match validator.validate(&text) {
        Verdict::Accepted(_) => {
            println!(
                "{}",
                format_success(&format!(
                    "Draft accepted: {} chapters within {}-{} words each",
                    fragments, bounds.min_words, bounds.max_words
                ))
            );
            Ok(())
        }
        Verdict::Rejected(rejection) => {
            println!("{}", format_error(&rejection.to_string()));
            Err(anyhow::anyhow!("Draft rejected"))
        }
    }
}

fn cmd_crew(config: &Config, crew_file: Option<&Path>) -> Result<()> {
    let definition = load_definition(config, crew_file)?;
    let bounds = config.validation.bounds();
    let vars = PromptVars::new(
        &config.pipeline.topic,
        config.pipeline.idea.as_deref(),
        &bounds,
    );

    println!("\nAgents:\n");
    for agent in &definition.agents {
        let tools: Vec<&str> = agent.tools.iter().map(|t| t.name()).collect();
        println!("  {} ({})", agent.role, agent.key);
        println!("    goal: {}", agent.goal);
        if !tools.is_empty() {
            println!("    tools: {}", tools.join(", "));
        }
    }

    println!("\nTasks:\n");
    let total = definition.tasks.len();
    for (index, task) in definition.tasks.iter().enumerate() {
        println!(
            "{}",
            format_step(index + 1, total, &format!("{} -> {}", task.key, task.agent))
        );
        println!(
            "    {}",
            Validator::truncate_text(&vars.render(&task.description), 160)
        );
        if !task.context.is_empty() {
            println!("    context: {}", task.context.join(", "));
        }
        if let Some(bounds) = &task.validator {
            println!(
                "    validated: {}-{} chapters, {}-{} words ({:?})",
                bounds.min_chapters,
                bounds.max_chapters,
                bounds.min_words,
                bounds.max_words,
                config.validation.split_mode
            );
        }
    }
    println!();

    Ok(())
}

fn cmd_check(config: &Config) -> Result<()> {
    let report = HealthReport::preflight(config);
    println!("{}", report.format());

    if !report.is_healthy() {
        return Err(anyhow::anyhow!("Configuration is not ready for a run"));
    }

    Ok(())
}

fn load_definition(config: &Config, crew_file: Option<&Path>) -> Result<CrewDefinition> {
    let bounds = config.validation.bounds();
    let path = crew_file.or(config.pipeline.crew_file.as_deref());

    match path {
        Some(path) => {
            info!("Loading crew definition from {}", path.display());
            CrewDefinition::load(path, bounds).context("Failed to load crew definition")
        }
        None => Ok(CrewDefinition::builtin(bounds)),
    }
}
