//! Command line front end for locale string tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use locale_strings::{I18nConfig, LocaleStrings, PluralMode};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lstr", author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root directory the string-table folder is resolved against
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// String-table folder, relative to the root
    #[arg(long, global = true)]
    folder: Option<PathBuf>,

    /// Locale to activate instead of the system locale
    #[arg(short, long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Look up one string identifier.
    Lookup {
        /// String identifier
        id: String,
        /// Text returned when the identifier has no entry
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Expand `@token:default` references in a template.
    Render {
        /// Template text
        template: String,
    },

    /// Expand every string in a JSON document.
    Translate {
        /// JSON file to translate
        input: PathBuf,
        /// Leave nested objects and arrays untouched
        #[arg(long)]
        shallow: bool,
    },

    /// Plural or ordinal form of a string identifier or word.
    Plural {
        /// String identifier (or the word itself with `--word`)
        id: String,
        /// Count selecting the form
        #[arg(allow_negative_numbers = true)]
        count: i64,
        /// `cardinal` or `ordinal`
        #[arg(short, long, default_value = "cardinal")]
        mode: String,
        /// Treat the argument as a literal word instead of an identifier
        #[arg(long)]
        word: bool,
    },

    /// Print load statistics for locales.
    Stats {
        /// Locales to load; the active locale when empty
        locales: Vec<String>,
    },

    /// List languages with string tables.
    Languages,

    /// List regions with string tables for a language.
    Regions {
        /// Language code
        language: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lstr=info,locale_strings=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let strings = LocaleStrings::from_config(&config).context("Failed to load string tables")?;
    info!(
        "Active locale {}",
        strings.active_locale().unwrap_or_default()
    );

    let stdout = io::stdout();
    run(&cli.command, &strings, &mut stdout.lock())
}

fn load_config(cli: &Cli) -> Result<I18nConfig> {
    let mut config = match &cli.config {
        Some(path) => I18nConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => I18nConfig::default(),
    };

    config.apply_env_overrides();

    if let Some(root) = &cli.root {
        config.root_path = root.clone();
    }
    if let Some(folder) = &cli.folder {
        config.folder = folder.clone();
    }
    if let Some(locale) = &cli.locale {
        config.default_locale = Some(locale.clone());
    }

    config.validate()?;
    debug!("Using configuration {:?}", config);
    Ok(config)
}

fn run<W: Write>(command: &Command, strings: &LocaleStrings, out: &mut W) -> Result<()> {
    match command {
        Command::Lookup { id, default } => {
            let text = strings.get_locale_string(id, default.as_deref(), true)?;
            writeln!(out, "{text}")?;
        }
        Command::Render { template } => {
            writeln!(out, "{}", strings.resolve_template(template)?)?;
        }
        Command::Translate { input, shallow } => {
            let text = fs::read_to_string(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", input.display()))?;
            let translated = strings.translate_object_strings(&value, *shallow)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&translated)?)?;
        }
        Command::Plural {
            id,
            count,
            mode,
            word,
        } => {
            let mode: PluralMode = mode.parse()?;
            let locale = strings.active_locale().unwrap_or_default();
            let text = if *word {
                strings.pluralize(&locale, id, *count, mode)?
            } else {
                strings.get_pluralized_string(&locale, id, *count, mode)?
            };
            writeln!(out, "{text}")?;
        }
        Command::Stats { locales } => {
            let locales = if locales.is_empty() {
                strings.active_locale().into_iter().collect()
            } else {
                locales.clone()
            };
            let mut report = Vec::with_capacity(locales.len());
            for locale in &locales {
                let stats = strings.load_for_locale(locale)?;
                let mut entry = serde_json::to_value(&stats)?;
                if let Some(fields) = entry.as_object_mut() {
                    fields.insert("total_files".to_string(), stats.total_files().into());
                }
                report.push(entry);
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Command::Languages => {
            for language in strings.available_languages() {
                writeln!(out, "{language}")?;
            }
        }
        Command::Regions { language } => {
            for region in strings.available_regions(language) {
                writeln!(out, "{region}")?;
            }
        }
    }
    Ok(())
}
