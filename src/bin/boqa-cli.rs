// src/bin/boqa-cli.rs
//! A REPL-style demo: loads a fixture ontology and annotation file,
//! accepts a query on stdin, and prints the top-K ranked items
//! (spec.md §6 "CLI/demo surface"). Exit codes: 0 ok, 2 input error, 3
//! internal error.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;

use boqa::prelude::*;

/// Rank a disease catalogue against observed phenotype terms.
#[derive(Parser)]
#[command(name = "boqa-cli")]
#[command(about = "Query a BOQA engine built from a fixture ontology and annotation file", long_about = None)]
struct Cli {
    /// Tab-separated ontology fixture: id\tname\tparent_id,parent_id,...
    #[arg(short, long)]
    ontology: PathBuf,

    /// Tab-separated annotation fixture: itemName\ttermId\tfrequency?
    #[arg(short, long)]
    annotations: PathBuf,

    /// Number of ranked items to print.
    #[arg(short, long, default_value_t = 10)]
    top: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let ontology_text = match std::fs::read_to_string(&cli.ontology) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("could not read ontology file {}: {e}", cli.ontology.display());
            return ExitCode::from(2);
        }
    };
    let annotation_text = match std::fs::read_to_string(&cli.annotations) {
        Ok(t) => t,
        Err(e) => {
            eprintln!(
                "could not read annotation file {}: {e}",
                cli.annotations.display()
            );
            return ExitCode::from(2);
        }
    };

    let ontology_source = match InMemoryOntology::<SimpleTerm>::from_tsv(&ontology_text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("invalid ontology fixture: {e}");
            return ExitCode::from(2);
        }
    };
    let annotation_source = match InMemoryAnnotations::from_tsv(&annotation_text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("invalid annotation fixture: {e}");
            return ExitCode::from(2);
        }
    };

    let engine = match Boqa::setup(&ontology_source, &annotation_source, BoqaConfig::default()) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return ExitCode::from(3);
        }
    };

    println!(
        "loaded {} terms, {} items. Enter a comma-separated list of term IDs, or an empty line to quit.",
        engine.number_of_terms(None),
        engine.item_count()
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }

        let term_ids: std::result::Result<Vec<u32>, String> = line
            .trim()
            .split(',')
            .map(|raw| {
                TermId::from_str(raw.trim())
                    .ok()
                    .and_then(|id| engine.id_of_term(&id))
                    .ok_or_else(|| format!("unknown term '{raw}'"))
            })
            .collect();

        let term_ids = match term_ids {
            Ok(ids) => ids,
            Err(e) => {
                eprintln!("input error: {e}");
                continue;
            }
        };

        match engine.score(&term_ids) {
            Ok(ranked) => {
                for (rank, item) in ranked.iter().take(cli.top).enumerate() {
                    println!(
                        "{:>3}. {:<30} marginal={:.6}",
                        rank + 1,
                        engine.item_name(item.item_id).unwrap_or("?"),
                        item.marginal
                    );
                }
            }
            Err(e) => eprintln!("query error: {e}"),
        }
    }

    ExitCode::SUCCESS
}
