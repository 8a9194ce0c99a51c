use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use diffspell_lib::config::{self, FileConfig, Settings};
use diffspell_lib::diff_parser::DiffPage;
use diffspell_lib::dictionary::{AcceptAll, Classifier, Dictionary, WordListDictionary};
use diffspell_lib::engine::{SpellContext, Trigger};
use diffspell_lib::exit_codes::exit;
use diffspell_lib::report::BadgeMessage;
use diffspell_lib::words::decompose;
use diffspell_lib::{SectionFindings, findings_for};

#[derive(Parser)]
#[command(name = "diffspell")]
#[command(version, about = "Find misspelled identifiers in code-review diffs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a unified diff for misspelled identifiers
    Check(CheckArgs),
    /// Print the JSON schema of the settings document
    Schema,
    /// Show how tokens decompose and whether they would be flagged
    Words(WordsArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// Configuration file (diffspell.toml, or a settings .json document)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Word list or Hunspell .dic file used as the dictionary
    #[arg(long, short)]
    dictionary: Option<PathBuf>,

    /// Extra words to accept (repeatable)
    #[arg(long = "user-word", value_name = "WORD")]
    user_words: Vec<String>,

    /// File with one accepted word per line
    #[arg(long, value_name = "FILE")]
    user_dictionary: Option<PathBuf>,

    /// Scan added rows
    #[arg(long, overrides_with = "no_added")]
    added: bool,
    /// Skip added rows
    #[arg(long, overrides_with = "added")]
    no_added: bool,

    /// Scan deleted rows
    #[arg(long, overrides_with = "no_deleted")]
    deleted: bool,
    /// Skip deleted rows
    #[arg(long, overrides_with = "deleted")]
    no_deleted: bool,

    /// Scan unchanged context rows
    #[arg(long, overrides_with = "no_context")]
    context: bool,
    /// Skip unchanged context rows
    #[arg(long, overrides_with = "context")]
    no_context: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Diff file to read; stdin when omitted or "-"
    diff: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exit with 0 even when identifiers are flagged
    #[arg(long)]
    exit_zero: bool,
}

#[derive(Args, Debug)]
struct WordsArgs {
    /// Tokens to inspect
    #[arg(required = true)]
    tokens: Vec<String>,

    #[command(flatten)]
    settings: SettingsArgs,
}

/// Settings and dictionary after merging config file and flags
struct Resolved {
    settings: Settings,
    dictionary: Box<dyn Dictionary>,
}

fn flag(on: bool, off: bool, current: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        current
    }
}

/// Explicit `--config`, else `diffspell.toml` in the working directory
fn config_path(args: &SettingsArgs) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }
    let default = Path::new(config::CONFIG_FILE_NAME);
    default.exists().then(|| default.to_path_buf())
}

/// Load settings from a config file, plus the dictionary path it names.
/// A relative dictionary path is taken relative to the config file.
fn load_config(path: &Path) -> Result<(Settings, Option<PathBuf>)> {
    log::debug!("[diffspell-config] Using {}", path.display());
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let settings = Settings::load(path).with_context(|| format!("loading {}", path.display()))?;
        return Ok((settings, None));
    }

    let file = FileConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
    let dictionary = file.dictionary.as_ref().map(|dic| {
        let dic = PathBuf::from(dic);
        match path.parent() {
            Some(dir) if dic.is_relative() => dir.join(dic),
            _ => dic,
        }
    });
    Ok((file.settings(), dictionary))
}

fn resolve(args: &SettingsArgs) -> Result<Resolved> {
    let (mut settings, configured_dictionary) = match config_path(args) {
        Some(path) => load_config(&path)?,
        None => (Settings::default(), None),
    };
    let dictionary_path = args.dictionary.clone().or(configured_dictionary);

    if let Some(path) = &args.user_dictionary {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        settings.user_dictionary.extend(config::parse_user_dictionary(&text));
    }
    settings
        .user_dictionary
        .extend(args.user_words.iter().map(|w| w.trim().to_lowercase()));

    let options = &mut settings.options;
    options.check_on_added_rows = flag(args.added, args.no_added, options.check_on_added_rows);
    options.check_on_deleted_rows = flag(args.deleted, args.no_deleted, options.check_on_deleted_rows);
    options.check_on_other_rows = flag(args.context, args.no_context, options.check_on_other_rows);

    let dictionary: Box<dyn Dictionary> = match dictionary_path {
        Some(path) => Box::new(
            WordListDictionary::load(&path).with_context(|| format!("loading dictionary {}", path.display()))?,
        ),
        None => {
            log::warn!("No dictionary configured; only the exception lists apply and nothing will be flagged");
            Box::new(AcceptAll)
        }
    };

    Ok(Resolved { settings, dictionary })
}

fn read_diff(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("reading diff from stdin")?;
            Ok(buffer)
        }
    }
}

fn run_check(args: CheckArgs) -> Result<usize> {
    let Resolved { settings, dictionary } = resolve(&args.settings)?;
    let diff = read_diff(args.diff.as_deref())?;

    let mut page = DiffPage::from_diff(&diff);
    let mut ctx = SpellContext::new(dictionary, &settings);
    let mut badge: Vec<BadgeMessage> = Vec::new();

    ctx.enqueue(Trigger::Load);
    ctx.run_pending(&mut page, &mut badge);
    ctx.tick(&mut page);

    let results: Vec<SectionFindings> = page
        .sections()
        .filter_map(|section| {
            let result = ctx.result(section.id)?;
            Some(SectionFindings {
                section: section.id,
                title: section.title.clone(),
                findings: findings_for(section, result),
            })
        })
        .collect();
    let total = ctx.count();

    match args.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "sections": results,
                "badge": BadgeMessage::from_count(total),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for section in results.iter().filter(|s| !s.findings.is_empty()) {
                println!("{}", section.title.bold());
                for finding in &section.findings {
                    let lines: Vec<String> = finding.lines.iter().map(|n| n.to_string()).collect();
                    println!(
                        "  {} {} {}",
                        "typo?".red(),
                        finding.identifier.yellow().bold(),
                        format!("(line {})", lines.join(", ")).dimmed()
                    );
                }
            }
            if total == 0 {
                println!("{} {}", "Success:".green().bold(), ctx.summary());
            } else {
                println!("\n{}", ctx.summary());
            }
        }
    }

    Ok(total)
}

fn run_words(args: WordsArgs) -> Result<()> {
    let Resolved { settings, dictionary } = resolve(&args.settings)?;
    let snapshot = config::SettingsSnapshot::new(&settings);
    let classifier = Classifier::new(dictionary.as_ref(), &snapshot);

    for token in &args.tokens {
        let words: Vec<String> = decompose(token)
            .into_iter()
            .map(|word| {
                if classifier.is_misspelled(&word) {
                    word.red().to_string()
                } else {
                    word
                }
            })
            .collect();
        let verdict = if classifier.is_flagged(token) {
            "flagged".red().bold()
        } else {
            "ok".green()
        };
        println!("{token}: {} [{verdict}]", words.join(" | "));
    }
    Ok(())
}

fn print_schema() -> Result<()> {
    let schema = schemars::schema_for!(Settings);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    let outcome = match cli.command {
        Commands::Check(args) => {
            let exit_zero = args.exit_zero;
            run_check(args).map(|flagged| flagged > 0 && !exit_zero)
        }
        Commands::Schema => print_schema().map(|_| false),
        Commands::Words(args) => run_words(args).map(|_| false),
    };

    match outcome {
        Ok(false) => exit::success(),
        Ok(true) => exit::typos_found(),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}
