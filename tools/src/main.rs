mod build_dictionary;
mod edit_dictionary;
mod show_entry;
mod simulate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use onehand_core::{Config, Dictionary, DictionaryStore};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "onehand-tools", about = "Dictionary tooling for one-handed typing")]
struct Args {
    /// TOML configuration (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a dictionary from plain word lists, one word per line
    Build {
        #[arg(long = "source", num_args = 1.., required = true)]
        sources: Vec<PathBuf>,

        /// Per-source flag; missing flags default to true
        #[arg(long = "keep-capitals", num_args = 1..)]
        keep_capitals: Vec<bool>,

        #[arg(long, default_value = "dictionary.json")]
        out: PathBuf,
    },
    /// Print the entry a word belongs to and what it resolves to
    Show {
        #[arg(long)]
        dict: Option<PathBuf>,

        words: Vec<String>,
    },
    /// Add, delete or promote a word and save the dictionary
    Edit {
        #[arg(long)]
        dict: Option<PathBuf>,

        #[arg(value_enum)]
        action: edit_dictionary::Action,

        word: String,
    },
    /// Replay keystrokes against an empty buffer and print the result
    Simulate {
        #[arg(long)]
        dict: Option<PathBuf>,

        /// Keys to type; `{enter}`, `{bs}`, `{C-e}` etc. name special keys
        keys: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_toml(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Build {
            sources,
            keep_capitals,
            out,
        } => {
            let dict = build_dictionary::run(&sources, &keep_capitals, &out)?;
            println!("Wrote {} entries to {}", dict.len(), out.display());
        }
        Command::Show { dict, words } => {
            let (dictionary, _) = open_dictionary(&config, dict.as_deref())?;
            for word in &words {
                println!("{}", show_entry::run(&dictionary, word)?);
            }
        }
        Command::Edit { dict, action, word } => {
            let (dictionary, store) = open_dictionary(&config, dict.as_deref())?;
            match edit_dictionary::run(dictionary, &store, &config, action, &word)? {
                Some(path) => println!("Saved {}", path.display()),
                None => println!("Dictionary unchanged"),
            }
        }
        Command::Simulate { dict, keys } => {
            let (dictionary, _) = open_dictionary(&config, dict.as_deref())?;
            let keys = simulate::parse_keys(&keys)?;
            print!("{}", simulate::run(dictionary, &config, &keys));
        }
    }
    Ok(())
}

/// Load from `--dict` when given, else through the configured store.
fn open_dictionary(config: &Config, dict: Option<&Path>) -> Result<(Dictionary, DictionaryStore)> {
    let mut store = match dict {
        Some(path) => DictionaryStore::new(Some(path.to_path_buf()), path.to_path_buf()),
        None => DictionaryStore::from_config(config),
    };
    let dictionary = store.load()?;
    Ok((dictionary, store))
}
