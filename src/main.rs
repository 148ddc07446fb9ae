//! formbind CLI - inspect and drive a binding over a JSON/YAML model file

use std::fs;
use std::path::Path as FsPath;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use formbind::options::DEFAULT_MAX_PROPAGATION_DEPTH;
use formbind::{BindError, Binding, BindingOptions, FixSuggestion};

#[derive(Parser)]
#[command(name = "formbind")]
#[command(about = "Path-based two-way binding playground for form models")]
#[command(version)]
struct Cli {
    /// Log binding activity (set, fieldset sync) at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a path (whole model if omitted)
    Get {
        /// Model file (.json, .yaml, .yml)
        file: String,

        /// Dotted path, e.g. address.city
        path: Option<String>,
    },

    /// Set a value and report every notification it triggers
    Set {
        /// Model file (.json, .yaml, .yml)
        file: String,

        /// Dotted path to write
        path: String,

        /// New value as JSON (plain text is taken as a string)
        value: String,

        /// Register a watcher at this path (repeatable)
        #[arg(short, long)]
        watch: Vec<String>,

        /// Derive a fieldset at this path and watch its root (repeatable)
        #[arg(short, long)]
        fieldset: Vec<String>,

        /// Save the resulting model back into the file
        #[arg(long)]
        write: bool,

        /// Maximum nested set depth
        #[arg(long, default_value_t = DEFAULT_MAX_PROPAGATION_DEPTH)]
        max_depth: usize,
    },

    /// List every addressable path of the model
    Paths {
        /// Model file (.json, .yaml, .yml)
        file: String,
    },
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn detect(file: &str) -> Self {
        match FsPath::new(file).extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Get { file, path } => get_value(&file, path.as_deref()),
        Commands::Set {
            file,
            path,
            value,
            watch,
            fieldset,
            write,
            max_depth,
        } => set_value(&file, &path, value, &watch, &fieldset, write, max_depth),
        Commands::Paths { file } => list_paths(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load_model(file: &str) -> Result<(Value, Format), BindError> {
    let text = fs::read_to_string(file)?;
    let format = Format::detect(file);
    let model = match format {
        Format::Json => serde_json::from_str(&text)?,
        Format::Yaml => serde_yaml::from_str(&text)?,
    };
    Ok((model, format))
}

fn save_model(file: &str, model: &Value, format: Format) -> Result<(), BindError> {
    let text = match format {
        Format::Json => serde_json::to_string_pretty(model)? + "\n",
        Format::Yaml => serde_yaml::to_string(model)?,
    };
    fs::write(file, text)?;
    Ok(())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn get_value(file: &str, path: Option<&str>) -> Result<(), BindError> {
    let (model, _) = load_model(file)?;
    let binding = Binding::new(model);
    let value = binding.get(path.unwrap_or(""))?;
    println!("{}", pretty(&value));
    Ok(())
}

fn set_value(
    file: &str,
    path: &str,
    raw_value: String,
    watches: &[String],
    fieldsets: &[String],
    write: bool,
    max_depth: usize,
) -> Result<(), BindError> {
    let (model, format) = load_model(file)?;
    let options = BindingOptions::default().with_max_propagation_depth(max_depth);
    let binding = Binding::with_options(model, options);

    for watched in watches {
        let label = watched.clone();
        binding.watch(watched, move |value| {
            println!("{} watch {} = {}", "↳".cyan(), label, value);
        })?;
    }

    for scoped in fieldsets {
        let fieldset = binding.fieldset(scoped)?;
        let label = scoped.clone();
        fieldset.watch("", move |value| {
            println!("{} fieldset {} = {}", "↳".magenta(), label, value);
        })?;
    }

    let value: Value = serde_json::from_str(&raw_value).unwrap_or(Value::String(raw_value));
    binding.set(path, value)?;

    println!("{}", "Model:".cyan().bold());
    println!("{}", pretty(&binding.model()));

    if write {
        save_model(file, &binding.model(), format)?;
        println!("{} Saved {}", "✓".green(), file);
    }

    Ok(())
}

fn list_paths(file: &str) -> Result<(), BindError> {
    let (model, _) = load_model(file)?;
    for path in Binding::new(model).paths() {
        println!("{}", path);
    }
    Ok(())
}
