//! rowdoc CLI - document ids, bind parameters and XML for relational rows.

mod fixture;

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rowdoc::core::{SqlValue, VecCursor};
use rowdoc::{BoundParameters, Config, DocError, RowSerializer, UniqueKey};
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowdoc")]
#[command(about = "Composite document ids and XML rendering for relational rows")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "rowdoc.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and show the resolved key
    Check {
        /// Table fixture used to resolve untyped key columns
        #[arg(long)]
        rows: Option<PathBuf>,
    },

    /// Print the document id of every fixture row
    DocIds {
        /// Table fixture (YAML or JSON)
        #[arg(long)]
        rows: PathBuf,
    },

    /// Decode a document id into query bind parameters
    Bind {
        /// Document id to decode
        id: String,

        /// Bind the ACL query parameters instead of the content ones
        #[arg(long)]
        acl: bool,

        /// Table fixture used to resolve untyped key columns
        #[arg(long)]
        rows: Option<PathBuf>,
    },

    /// Render fixture rows as an XML document
    Xml {
        /// Table fixture (YAML or JSON)
        #[arg(long)]
        rows: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), DocError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(DocError::Config)?;

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Check { rows } => {
            let cursor = rows.map(fixture::load).transpose()?;
            let key = resolve_key(&config, cursor.as_ref())?;
            let columns: Vec<_> = key
                .columns()
                .iter()
                .map(|c| (c.name.as_str(), c.column_type.as_str()))
                .collect();
            let content: Vec<&str> = key
                .content_slots()
                .iter()
                .map(|&i| key.columns()[i].name.as_str())
                .collect();
            let acl: Vec<&str> = key
                .acl_slots()
                .iter()
                .map(|&i| key.columns()[i].name.as_str())
                .collect();

            if cli.output_json {
                let columns: Vec<_> = columns
                    .iter()
                    .map(|(name, ty)| json!({ "name": name, "type": ty }))
                    .collect();
                let result = json!({
                    "columns": columns,
                    "doc_id_is_url": key.doc_id_is_url(),
                    "content_parameters": content,
                    "acl_parameters": acl,
                    "time_zone": config.xml.temporal_format()?.zone().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Configuration OK");
                for (name, ty) in &columns {
                    println!("  key column: {}:{}", name, ty);
                }
                println!("  doc id is url: {}", key.doc_id_is_url());
                println!("  content parameters: {}", content.join(", "));
                println!("  acl parameters: {}", acl.join(", "));
            }
        }

        Commands::DocIds { rows } => {
            let mut cursor = fixture::load(&rows)?;
            let key = resolve_key(&config, Some(&cursor))?;
            let ids = doc_ids(&key, &mut cursor)?;
            info!("Generated {} document id(s) from {}", ids.len(), rows.display());

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&ids)?);
            } else {
                for id in ids {
                    println!("{}", id);
                }
            }
        }

        Commands::Bind { id, acl, rows } => {
            let cursor = rows.map(fixture::load).transpose()?;
            let key = resolve_key(&config, cursor.as_ref())?;
            let mut params = BoundParameters::new();
            if acl {
                key.set_acl_parameters(&mut params, &id)?;
            } else {
                key.set_content_parameters(&mut params, &id)?;
            }

            if cli.output_json {
                let result: Vec<_> = params
                    .iter()
                    .map(|(position, value)| {
                        let (ty, value) = describe_param(value);
                        json!({ "position": position, "type": ty, "value": value })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for (position, value) in params.iter() {
                    let (ty, value) = describe_param(value);
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    println!("{}\t{}\t{}", position, ty, value);
                }
            }
        }

        Commands::Xml { rows, output } => {
            let cursor = fixture::load(&rows)?;
            let serializer =
                RowSerializer::with_format(cursor, config.xml.temporal_format()?);
            match output {
                Some(path) => write_xml_to(serializer, std::fs::File::create(&path)?)?,
                None => write_xml_to(serializer, std::io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

/// Build the configured key, probing untyped columns from the fixture if given.
fn resolve_key(config: &Config, cursor: Option<&VecCursor>) -> Result<UniqueKey, DocError> {
    let mut builder = config.key.builder()?;
    if let Some(cursor) = cursor {
        if builder.needs_column_types() {
            builder.add_column_types_from(cursor)?;
        }
    }
    builder.build()
}

fn doc_ids(key: &UniqueKey, cursor: &mut VecCursor) -> Result<Vec<String>, DocError> {
    use rowdoc::core::RowCursor;

    let mut ids = Vec::with_capacity(cursor.remaining());
    while let Some(row) = cursor.next_row()? {
        ids.push(key.make_doc_id(&row)?);
    }
    Ok(ids)
}

fn write_xml_to<W: Write>(serializer: RowSerializer<VecCursor>, out: W) -> Result<(), DocError> {
    let mut out = rowdoc::write_xml(serializer, BufWriter::new(out))?;
    out.flush()?;
    Ok(())
}

/// Type label and JSON form of a bound parameter.
fn describe_param(value: &SqlValue<'_>) -> (&'static str, serde_json::Value) {
    match value {
        SqlValue::Null => ("null", serde_json::Value::Null),
        SqlValue::I32(v) => ("int", json!(v)),
        SqlValue::I64(v) => ("long", json!(v)),
        SqlValue::Date(d) => ("date", json!(d.format("%Y-%m-%d").to_string())),
        SqlValue::Time(t) => ("time", json!(t.format("%H:%M:%S").to_string())),
        SqlValue::Timestamp(ts) => ("timestamp", json!(ts.to_rfc3339())),
        other => ("string", json!(other.to_text().unwrap_or_default())),
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity '{}'", other)),
    };

    // RUST_LOG, when set, overrides --verbosity
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    // stdout carries ids and XML
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
