//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::cache::store::{CacheStore, StoreStatus};
use crate::core::model::TestInfo;
use crate::core::paths::{normalize_reference, store_path};
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::finders::CacheFinder;

/// tcache - a persisted lookup cache for test-reference resolution.
#[derive(Parser, Debug)]
#[command(name = "tcache")]
#[command(
    author,
    version,
    about,
    long_about = r#"tcache answers "which tests does this reference resolve to?" from a store
on disk, so the slow discovery-based finders only run for references that
were never resolved before.

A reference may be a file path, a directory, or a module/class-style name.
Lookups print the cached records in the selected format (default: jsonl)
and print nothing on a miss; a broken or stale store is always a miss,
never an error.

Examples:
    tcache lookup src/FooTest.java
    tcache lookup CtsFooTestCases --format json
    echo '[{"test_name":"FooTest","module_name":"foo"}]' | tcache save src/FooTest.java
    tcache info
    tcache clear
"#
)]
pub struct Cli {
    /// Root directory for all operations.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
Relative references are resolved against this root, and the store lives\n\
under <ROOT>/.tcache unless TCACHE_DIR overrides it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for cached records.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw (test names only)"
    )]
    pub format: String,

    /// Quiet mode (suppress warnings).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress non-essential stderr output, including cache-write warnings.\n\
Machine-readable results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable more detailed diagnostics on stderr, e.g. cache-miss notes and\n\
the normalized key used for a lookup."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a reference in the cache and print any records found.
    #[command(
        long_about = "Look up REFERENCE in the store and print the cached records.\n\n\
The reference is normalized (absolute-path resolution, trailing-slash\n\
stripping) before lookup, matching how entries were keyed at save time.\n\
A miss prints nothing and still exits 0: absence of a cache entry is an\n\
answer, not an error.\n\n\
Examples:\n\
  tcache lookup src/FooTest.java\n\
  tcache lookup foo/tests/ --format json\n"
    )]
    Lookup {
        /// Test reference: a path, directory, or module/class-style name.
        #[arg(value_name = "REFERENCE")]
        reference: String,
    },

    /// Save resolved records for a reference.
    #[command(
        long_about = "Save the records that a finder resolved REFERENCE to, making future\n\
lookups of the same reference cache hits.\n\n\
Records are read as a JSON array of test info objects from --file or from\n\
stdin. An empty array is valid and means \"resolved to nothing\".\n\n\
A failed save is reported as a warning and does not fail the command:\n\
caching is an optimization, never a correctness requirement.\n\n\
Examples:\n\
  echo '[{\"test_name\":\"FooTest\",\"module_name\":\"foo\"}]' | tcache save src/FooTest.java\n\
  tcache save CtsFooTestCases --file resolved.json\n"
    )]
    Save {
        /// Test reference the records were resolved from.
        #[arg(value_name = "REFERENCE")]
        reference: String,

        /// Read the JSON records from a file instead of stdin.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Remove the store, forcing full re-discovery on the next run.
    #[command(
        long_about = "Delete the store file entirely. The next lookup of any reference will\n\
miss and fall through to the discovery-based finders."
    )]
    Clear,

    /// Report the store location, version, and entry freshness.
    #[command(
        long_about = "Print the store path and condition, plus one line per entry with its\n\
record count and whether it has gone stale."
    )]
    Info,
}

pub fn run(cli: Cli) -> Result<()> {
    // Parse output format
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    let store = CacheStore::new(store_path(&root));

    match cli.command {
        Commands::Lookup { reference } => {
            run_lookup(&root, store, &reference, cli.verbose, render_config)
        }

        Commands::Save { reference, file } => {
            run_save(&root, store, &reference, file.as_deref(), cli.quiet)
        }

        Commands::Clear => store.clear(),

        Commands::Info => run_info(store),
    }
}

fn run_lookup(
    root: &std::path::Path,
    store: CacheStore,
    reference: &str,
    verbose: bool,
    render_config: RenderConfig,
) -> Result<()> {
    let finder = CacheFinder::new(root, store);
    match finder.find_test_by_cache(reference) {
        Some(records) => {
            let renderer = Renderer::with_config(render_config);
            let output = renderer.render(&records);
            if !output.is_empty() {
                println!("{}", output);
            } else if matches!(render_config.format, OutputFormat::Json) {
                // An empty hit still renders as [] so callers can tell it
                // apart from a miss
                println!("[]");
            }
        }
        None => {
            if verbose {
                eprintln!("no cache entry for '{}'", reference);
            }
        }
    }
    Ok(())
}

fn run_save(
    root: &std::path::Path,
    store: CacheStore,
    reference: &str,
    file: Option<&std::path::Path>,
    quiet: bool,
) -> Result<()> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records from {:?}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read records from stdin")?;
            buf
        }
    };

    let records: Vec<TestInfo> =
        serde_json::from_str(&content).context("Records must be a JSON array of test info objects")?;

    let key = normalize_reference(root, reference);
    if let Err(e) = store.save(&key, records) {
        // A failed save must not abort the surrounding test run
        if !quiet {
            eprintln!("Warning: failed to save cache entry for '{}': {:#}", reference, e);
        }
    }
    Ok(())
}

fn run_info(store: CacheStore) -> Result<()> {
    println!("store: {}", store.path().display());
    match store.status() {
        StoreStatus::Missing => println!("status: missing (no lookups cached yet)"),
        StoreStatus::Unreadable => println!("status: unreadable (treated as empty)"),
        StoreStatus::Corrupt => println!("status: corrupt (treated as empty)"),
        StoreStatus::Ready { meta, entry_count } => {
            println!(
                "status: ready (version {}, generated {}, {} entries)",
                meta.cache_version, meta.generated_at, entry_count
            );
            for entry in store.entries() {
                println!(
                    "  {}  records={}{}",
                    entry.reference,
                    entry.record_count,
                    if entry.stale { "  [stale]" } else { "" }
                );
            }
        }
    }
    Ok(())
}
