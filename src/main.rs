//! exposure-engine CLI
//!
//! Reconcile trade repositories and report floating-index exposures.
//!
//! # Usage
//!
//! ```bash
//! # Country and entity exposures for the rates listed in config.toml
//! exposure-engine run --root data/
//!
//! # Output as JSON
//! exposure-engine run --root data/ --format json
//!
//! # Ten countries with the lowest EONIA net/gross ratio
//! exposure-engine rank --root data/ --index EONIA --bottom --top 10
//!
//! # Generate a sample data directory
//! exposure-engine generate --output data/ --trades 500
//! ```

use exposure_engine::aggregation::exposure::{ExposureAggregate, ExposureRequest, ExposureTable, Granularity};
use exposure_engine::aggregation::ranking::{rank, RankBy, RankQuery};
use exposure_engine::io::config::{find_config, Config, FilesConfig, RatesConfig, ReportConfig, CONFIG_FILE_NAME};
use exposure_engine::io::error::SourceError;
use exposure_engine::io::loader::load_inputs;
use exposure_engine::io::resolver::resolve;
use exposure_engine::pipeline::{Pipeline, PipelineOutput};
use exposure_engine::io::writer::{save_registry, save_trades};
use exposure_engine::simulation::sample::{generate_market, MarketConfig};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn print_usage() {
    eprintln!(
        r#"exposure-engine: trade repository reconciliation and exposure aggregation

USAGE:
    exposure-engine <COMMAND> [OPTIONS]

COMMANDS:
    run         Reconcile repositories and print exposures for the configured rates
    rank        Top or bottom countries/entities for one index
    generate    Generate a sample data directory (for testing)
    help        Show this message

OPTIONS (run, rank):
    --root <DIR>        Directory searched for config.toml and input files (default: .)
    --config <FILE>     Use this config file instead of searching --root
    --scale <SCALE>     country (default) or entity

OPTIONS (run):
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (rank):
    --index <NAME>      Index to rank (required)
    --by <METRIC>       ratio (default), cash-flow, gross or net
    --bottom            Smallest values first
    --top <N>           Rows to show (default: report.top from config)
    --countries <LIST>  Comma-separated countries to restrict to

OPTIONS (generate):
    --output <DIR>          Directory to write into (required)
    --entities <N>          Registered entities (default: 20)
    --trades <N>            Distinct trades (default: 200)
    --repositories <N>      Trade repositories (default: 2)

EXAMPLES:
    exposure-engine run --root data/
    exposure-engine run --root data/ --scale entity --format json
    exposure-engine rank --root data/ --index LIBOR --by cash-flow --top 3
    exposure-engine generate --output data/ --entities 40 --trades 1000"#
    );
}

fn fail(err: impl Display) -> ! {
    eprintln!("Error: {}", err);
    process::exit(1);
}

fn take_value(args: &[String], i: usize, flag: &str, expected: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, expected);
        process::exit(1);
    })
}

fn take_number(args: &[String], i: usize, flag: &str) -> usize {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{} requires a number", flag);
            process::exit(1);
        })
}

fn parse_scale(value: &str) -> Granularity {
    Granularity::parse(value).unwrap_or_else(|| {
        eprintln!("--scale requires 'country' or 'entity'");
        process::exit(1);
    })
}

/// Config, then inputs, then the reconciliation stages.
fn load(root: &Path, config_path: Option<PathBuf>) -> Result<(Config, PipelineOutput), SourceError> {
    let config_path = match config_path {
        Some(path) => path,
        None => find_config(root)?.unwrap_or_else(|| {
            fail(format!("no {} found under {}", CONFIG_FILE_NAME, root.display()))
        }),
    };
    let config = Config::load(&config_path)?;
    let files = resolve(root, &config.files)?;
    let (trade_sets, registry) = load_inputs(&files)?;
    let output = Pipeline::run(trade_sets, &[registry])?;
    Ok((config, output))
}

#[derive(serde::Serialize)]
struct RunOutput<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    duplicated_transactions: usize,
    trades_reconciled: usize,
    indices: Vec<String>,
    exposures: &'a [ExposureAggregate],
}

fn print_top_bottom(table: &ExposureTable, index: &str, top: usize) {
    let highest = rank(table, &RankQuery::top(index, top));
    if highest.is_empty() {
        return;
    }
    println!("\nHighest exposure ratio for {}:", index);
    for row in highest {
        println!("  {:<32} gross {:>20}  net {:>20}  ratio {:>7.1}%", row.key, row.gross_exposure, row.net_exposure, row.ratio_percent());
    }
    println!("Lowest exposure ratio for {}:", index);
    for row in rank(table, &RankQuery::bottom(index, top)) {
        println!("  {:<32} gross {:>20}  net {:>20}  ratio {:>7.1}%", row.key, row.gross_exposure, row.net_exposure, row.ratio_percent());
    }
}

fn cmd_run(args: &[String]) {
    let mut root = PathBuf::from(".");
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut scale = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--root" => {
                i += 1;
                root = PathBuf::from(take_value(args, i, "--root", "a directory"));
            }
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(take_value(args, i, "--config", "a file path")));
            }
            "--format" => {
                i += 1;
                format = take_value(args, i, "--format", "'text' or 'json'");
            }
            "--scale" => {
                i += 1;
                scale = Some(parse_scale(&take_value(args, i, "--scale", "'country' or 'entity'")));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let (config, output) = load(&root, config_path).unwrap_or_else(|e| fail(e));
    let request = config.exposure_request().unwrap_or_else(|e| fail(e));
    let scales = match scale {
        Some(s) => vec![s],
        None => vec![Granularity::Country, Granularity::Entity],
    };
    let tables: Vec<ExposureTable> = scales
        .into_iter()
        .map(|s| {
            output
                .exposures(&request.clone().with_granularity(s))
                .unwrap_or_else(|e| fail(e))
        })
        .collect();

    if format == "json" {
        let mut exposures = Vec::new();
        for table in &tables {
            exposures.extend_from_slice(table.rows());
        }
        let out = RunOutput {
            generated_at: chrono::Utc::now(),
            duplicated_transactions: output.duplicates.duplicated_count(),
            trades_reconciled: output.reconciled.len(),
            indices: request.indices().iter().map(|i| i.to_string()).collect(),
            exposures: &exposures,
        };
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_else(|e| fail(e)));
        return;
    }

    if output.duplicates.has_duplicates() {
        println!(
            "{} transactions were registered more than once\n",
            output.duplicates.duplicated_count()
        );
    }
    println!("Trades reconciled: {}\n", output.reconciled.len());
    for table in &tables {
        println!("{}", table);
    }
    if let Some(country) = tables.iter().find(|t| t.granularity() == Granularity::Country) {
        for index in request.indices() {
            print_top_bottom(country, index.as_str(), config.report.top);
        }
    }
}

fn cmd_rank(args: &[String]) {
    let mut root = PathBuf::from(".");
    let mut config_path = None;
    let mut index = None;
    let mut by = RankBy::default();
    let mut bottom = false;
    let mut limit = None;
    let mut countries: Vec<String> = Vec::new();
    let mut scale = Granularity::Country;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--root" => {
                i += 1;
                root = PathBuf::from(take_value(args, i, "--root", "a directory"));
            }
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(take_value(args, i, "--config", "a file path")));
            }
            "--index" => {
                i += 1;
                index = Some(take_value(args, i, "--index", "an index name"));
            }
            "--by" => {
                i += 1;
                let value = take_value(args, i, "--by", "a metric");
                by = RankBy::parse(&value).unwrap_or_else(|| {
                    eprintln!("--by requires 'ratio', 'cash-flow', 'gross' or 'net'");
                    process::exit(1);
                });
            }
            "--bottom" => bottom = true,
            "--top" => {
                i += 1;
                limit = Some(take_number(args, i, "--top"));
            }
            "--countries" => {
                i += 1;
                countries = take_value(args, i, "--countries", "a comma-separated list")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "--scale" => {
                i += 1;
                scale = parse_scale(&take_value(args, i, "--scale", "'country' or 'entity'"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let index = index.unwrap_or_else(|| {
        eprintln!("Error: --index <NAME> is required");
        process::exit(1);
    });

    let (config, output) = load(&root, config_path).unwrap_or_else(|e| fail(e));
    let request = ExposureRequest::new([index.as_str()])
        .unwrap_or_else(|e| fail(e))
        .with_granularity(scale);
    let table = output.exposures(&request).unwrap_or_else(|e| fail(e));

    let limit = limit.unwrap_or(config.report.top);
    let query = if bottom {
        RankQuery::bottom(index.as_str(), limit)
    } else {
        RankQuery::top(index.as_str(), limit)
    }
    .by(by)
    .in_countries(countries);

    let rows = rank(&table, &query);
    if rows.is_empty() {
        eprintln!("No data available for {}.", index);
        process::exit(1);
    }
    for (pos, row) in rows.iter().enumerate() {
        println!(
            "{:>3}. {:<32} gross {:>20}  net {:>20}  cash flow {:>16}  ratio {:>7.1}%",
            pos + 1,
            row.key,
            row.gross_exposure,
            row.net_exposure,
            row.cash_flow,
            row.ratio_percent()
        );
    }
}

fn cmd_generate(args: &[String]) {
    let mut output_dir: Option<PathBuf> = None;
    let mut config = MarketConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                output_dir = Some(PathBuf::from(take_value(args, i, "--output", "a directory")));
            }
            "--entities" => {
                i += 1;
                config.entity_count = take_number(args, i, "--entities");
            }
            "--trades" => {
                i += 1;
                config.trade_count = take_number(args, i, "--trades");
            }
            "--repositories" => {
                i += 1;
                config.repository_count = take_number(args, i, "--repositories");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let dir = output_dir.unwrap_or_else(|| {
        eprintln!("Error: --output <DIR> is required");
        process::exit(1);
    });

    let market = generate_market(&config).unwrap_or_else(|e| fail(e));

    fs::create_dir_all(&dir).unwrap_or_else(|e| fail(e));
    let mut names = Vec::new();
    for (n, repo) in market.repositories.iter().enumerate() {
        let name = format!("TR{}.csv", n + 1);
        save_trades(repo, &dir.join(&name)).unwrap_or_else(|e| fail(e));
        names.push(name);
    }
    let reference = "GLEIF.csv".to_string();
    save_registry(&market.registry, &dir.join(&reference)).unwrap_or_else(|e| fail(e));
    names.push(reference.clone());

    let run_config = Config {
        files: FilesConfig { names, reference },
        rates: RatesConfig {
            names: config.indices.iter().map(|i| i.to_string()).collect(),
        },
        report: ReportConfig::default(),
    };
    run_config
        .save(&dir.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|e| fail(e));

    let total: usize = market.repositories.iter().map(|r| r.len()).sum();
    eprintln!(
        "Generated {} trade records in {} repositories, {} entities → {}",
        total,
        market.repositories.len(),
        market.registry.len(),
        dir.display()
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "rank" => cmd_rank(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
