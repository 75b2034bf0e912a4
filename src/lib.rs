pub mod classify;
pub mod cli;
pub mod error;
pub mod expand;
pub mod flatten;
pub mod header;
pub mod io_utils;
pub mod project;
pub mod schema;
pub mod source;
pub mod table;
pub mod value;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, InputArgs, OutputFormat},
    expand::UnrollDepth,
    flatten::LeafPath,
    project::{DisplayTable, InspectOptions},
    schema::Schema,
    source::JsonRecords,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("variant_view", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Variants(args) => handle_variants(&args),
        Commands::View(args) => handle_view(&args),
    }
}

fn load_inputs(args: &InputArgs) -> Result<(Schema, JsonRecords)> {
    ensure!(
        !(io_utils::is_dash(&args.schema) && io_utils::is_dash(&args.input)),
        "Only one of --schema and --input may read from stdin"
    );
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let schema = Schema::load(&args.schema, encoding)
        .with_context(|| format!("Loading schema from {:?}", args.schema))?;
    let records = JsonRecords::load(&args.input, encoding)
        .with_context(|| format!("Loading records from {:?}", args.input))?;
    Ok((schema, records))
}

fn handle_variants(args: &cli::VariantsArgs) -> Result<()> {
    info!(
        "Discovering variants in '{}' using up to {} record(s)",
        args.input.input.display(),
        args.input.sample_rows
    );
    let (schema, records) = load_inputs(&args.input)?;
    let depth = if args.top_level_only {
        UnrollDepth::TopLevelOnly
    } else {
        UnrollDepth::Full
    };
    let discovery = expand::discover(&schema, &records, args.input.sample_rows, depth)?;
    let order = if args.by_frequency {
        discovery.ranked_indexes()
    } else {
        (0..discovery.variants.len()).collect()
    };

    let mut rows = Vec::with_capacity(order.len());
    for idx in order {
        let Some(variant) = discovery.variants.get(idx) else {
            continue;
        };
        let paths = if variant.is_union_free() {
            flatten::flatten(variant)?.iter().map(LeafPath::dotted).join(", ")
        } else {
            "-".to_string()
        };
        rows.push(vec![
            idx.to_string(),
            discovery.candidate_counts[idx].to_string(),
            variant.signature(),
            paths,
        ]);
    }

    let columns = ["#", "records", "signature", "leaf paths"]
        .into_iter()
        .map(|label| LeafPath::new(vec![label.to_string()]))
        .collect::<Vec<_>>();
    let listing = DisplayTable {
        variant: None,
        header: header::build(&columns),
        columns,
        rows,
    };
    table::print_tables(std::slice::from_ref(&listing));
    info!(
        "Listed {} variant(s) from {} sampled record(s)",
        listing.rows.len(),
        discovery.records_scanned
    );
    Ok(())
}

fn handle_view(args: &cli::ViewArgs) -> Result<()> {
    info!(
        "Projecting '{}' using up to {} record(s) per scan",
        args.input.input.display(),
        args.input.sample_rows
    );
    let (schema, records) = load_inputs(&args.input)?;
    let options = InspectOptions {
        sample_limit: args.input.sample_rows,
    };
    let projection = project::inspect(&schema, &records, &options)
        .with_context(|| format!("Inspecting records from {}", records.origin()))?;

    match args.format {
        OutputFormat::Json => {
            let rendered = if args.mode == cli::ViewMode::All {
                serde_json::to_string_pretty(&projection)?
            } else {
                let selected = projection
                    .collections()
                    .into_iter()
                    .filter(|(name, _)| args.mode.includes(name))
                    .flat_map(|(_, tables)| tables)
                    .collect::<Vec<_>>();
                serde_json::to_string_pretty(&selected)?
            };
            println!("{rendered}");
        }
        OutputFormat::Text => {
            for (name, tables) in projection.collections() {
                if !args.mode.includes(name) {
                    continue;
                }
                println!("== {name}: {} table(s)", tables.len());
                println!();
                table::print_tables(tables);
            }
            println!(
                "Scanned {} record(s), {} dropped{}",
                projection.rows_scanned,
                projection.rows_dropped,
                if projection.has_more_rows {
                    "; more rows exist"
                } else {
                    ""
                }
            );
        }
    }
    Ok(())
}
