use anyhow::{Context, Result};
use serde::Serialize;

use origin_check_lib::models::{CheckResult, FixRequest, RewriteResult};
use origin_check_lib::services::config_store::load_default_config;
use origin_check_lib::services::providers::preview;
use origin_check_lib::{init_logging, OriginCheck};

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlaggedRewrite {
    sentence: String,
    suggestion: RewriteResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    file: String,
    extracted_bytes: usize,
    interpretation: &'static str,
    check: CheckResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rewrites: Vec<FlaggedRewrite>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  check_document <path> [--fix] [--out <json_path>]\n\nNotes:\n  - `.pdf` files are read with pdf-extract, anything else as UTF-8 text.\n  - `--fix` asks for a rewrite of every flagged sentence."
        );
        return Ok(());
    }

    init_logging();

    let path = args[1].clone();
    let enable_fix = has_flag(&args, "--fix");
    let out_path = parse_arg_value(&args, "--out");

    let bytes = std::fs::read(&path).with_context(|| format!("read file {}", path))?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "input.txt".to_string());

    let app = OriginCheck::from_config(&load_default_config());
    let check = app
        .check_document(&file_name, &bytes)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("File: {}", path);
    println!(
        "Score: {}% ({}/{} sentences matched)",
        check.score, check.matched_sentences, check.total_sentences
    );
    println!("{}", check.band.interpretation());
    println!();

    for (i, verdict) in check.results.iter().enumerate() {
        let marker = if verdict.matched { "MATCH" } else { "     " };
        println!("[S{:04}] {}  {}", i, marker, preview(&verdict.sentence, 120));
        for source in &verdict.evidence {
            println!("          -> {} ({})", source.title, source.link);
        }
    }

    let mut rewrites = Vec::new();
    if enable_fix {
        for verdict in check.results.iter().filter(|v| v.matched) {
            let suggestion = app
                .fix_text(FixRequest {
                    text: verdict.sentence.clone(),
                })
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            println!();
            println!("[{}] {}", suggestion.source.tag(), suggestion.fixed_text);
            rewrites.push(FlaggedRewrite {
                sentence: verdict.sentence.clone(),
                suggestion,
            });
        }
    }

    if let Some(out_path) = out_path {
        let report = Report {
            file: path.clone(),
            extracted_bytes: bytes.len(),
            interpretation: check.band.interpretation(),
            check,
            rewrites,
        };

        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&out_path, json).with_context(|| format!("write {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
