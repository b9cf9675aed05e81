//! Cataloger — catalog query and duplicate-verification engine.
//!
//! Thin binary entry point standing in for the HTTP service layer: open
//! the catalog named on the command line, run one engine operation, print
//! the result as JSON. All logic lives in the `cataloger-core` crate.

use std::env;
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use cataloger_core::store::SearchFilter;
use cataloger_core::{duplicates, heuristics, monitor, tree, Catalog};

const USAGE: &str = "\
Usage: cataloger <catalog_db> <command> [args]

Commands:
  stats                   overall catalog statistics
  search <term>           search filenames and paths
  tree [path]             one directory level (no path lists roots)
  duplicates              MD5 candidate duplicate groups
  verify <fingerprint>    SHA256-verify one candidate group
  suggestions             rule-based cleanup suggestions
  largest [n]             largest files (default 100)
  oldest [n]              oldest files (default 100)
  status                  scanner progress (reads scan_status.json)";

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("{USAGE}");
        process::exit(2);
    }

    let db_path = &args[1];
    let catalog = Catalog::open(db_path)
        .with_context(|| format!("failed to open catalog at {db_path}"))?;

    match args[2].as_str() {
        "stats" => print_json(&catalog.stats()?),
        "search" => {
            let term = args.get(3).context("usage: search <term>")?;
            let filter = SearchFilter {
                query: Some(term.clone()),
                ..SearchFilter::default()
            };
            print_json(&catalog.search(&filter)?)
        }
        "tree" => {
            let parent = args.get(3).map(String::as_str).unwrap_or("");
            print_json(&tree::get_tree(&catalog, parent)?)
        }
        "duplicates" => print_json(&duplicates::duplicate_candidates(&catalog)?),
        "verify" => {
            let fingerprint = args.get(3).context("usage: verify <fingerprint>")?;
            let groups = duplicates::duplicate_candidates(&catalog)?;
            let group = groups
                .iter()
                .find(|g| g.fingerprint == *fingerprint)
                .with_context(|| format!("no candidate group with fingerprint {fingerprint}"))?;
            let files: Vec<(i64, String)> = group
                .file_ids
                .iter()
                .copied()
                .zip(group.paths.iter().cloned())
                .collect();
            print_json(&duplicates::verify_candidates(&catalog, fingerprint, &files)?)
        }
        "suggestions" => print_json(&heuristics::get_suggestions(&catalog)?),
        "largest" => print_json(&catalog.largest_files(parse_limit(args.get(3))?)?),
        "oldest" => print_json(&catalog.oldest_files(parse_limit(args.get(3))?)?),
        "status" => {
            // The scanner writes its progress file next to the database.
            let status_path = Path::new(db_path)
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("scan_status.json");
            print_json(&monitor::read_progress(&status_path))
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

fn parse_limit(arg: Option<&String>) -> Result<usize> {
    match arg {
        None => Ok(100),
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid limit '{raw}'")),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
