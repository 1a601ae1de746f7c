use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wdl_tables::compile_to_json;
use wdl_tables::schema::last_handle;
use wdl_tables_compiler::error::CompileError;
use wdl_tables_compiler::resource_id::{parse_resource_id, RESOURCE_ID_WIDTH};
use wdl_tables_compiler::{compile_unit, load_schema, CompileOptions, HandleTable, NodeId, Schema};

#[derive(Parser)]
#[command(name = "wdltables")]
#[command(about = "Compile WDL schema dumps into property handle tables", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON schema dump to JSON tables
    Compile {
        /// Input schema `.json` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only compile the unit with this full name
        #[arg(short, long)]
        unit: Option<String>,

        /// Width in bits resource id numbers must fit in
        #[arg(long, default_value_t = RESOURCE_ID_WIDTH)]
        resource_id_width: u32,

        /// Emit zero-filled bitfields instead of leaving unused ones absent
        #[arg(long)]
        force_bitfields: bool,
    },

    /// Print the property handle table of one unit
    Paths {
        /// Input schema `.json` file
        #[arg(short, long)]
        input: PathBuf,

        /// Full name of the trait or struct
        #[arg(short, long)]
        unit: String,
    },

    /// Encode a single resource id value, e.g. `DEVICE_18B4300000000001`
    ResourceId {
        value: String,

        #[arg(long, default_value_t = RESOURCE_ID_WIDTH)]
        width: u32,
    },
}

fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Compile {
            input,
            output,
            unit,
            resource_id_width,
            force_bitfields,
        } => {
            let text = fs::read_to_string(input).map_err(CompileError::Io)?;
            let options = CompileOptions {
                resource_id_width: *resource_id_width,
                force_bitfields:   *force_bitfields,
            };
            let json = match unit {
                Some(name) => {
                    let schema = load_schema(&text)?;
                    let id = find_unit(&schema, input, name)?;
                    let tables = compile_unit(&schema, id, &options)?;
                    serde_json::to_string_pretty(&tables)?
                }
                None => compile_to_json(&text, &options)?,
            };
            if let Some(out_path) = output {
                fs::write(out_path, &json).map_err(CompileError::Io)?;
                info!("Compiled {} → {}", input.display(), out_path.display());
            } else {
                println!("{}", json);
            }
            Ok(())
        }

        Commands::Paths { input, unit } => {
            let text = fs::read_to_string(input).map_err(CompileError::Io)?;
            let schema = load_schema(&text)?;
            let id = find_unit(&schema, input, unit)?;
            let table = HandleTable::build(&schema, id)?;
            for row in table.rows(&schema) {
                println!(
                    "{:>4}  kPropertyHandle_{:<40} parent {:<32} tag {}",
                    row.handle, row.symbol, row.parent_symbol, row.number
                );
            }
            println!("last handle {}, tree depth {}", last_handle(table.len()), table.tree_depth());
            Ok(())
        }

        Commands::ResourceId { value, width } => {
            let id = parse_resource_id("<command line>", "value", value, *width)?;
            let bytes = id
                .to_bytes()
                .iter()
                .map(|b| format!("0x{:02x}", b))
                .collect::<Vec<_>>()
                .join(", ");
            println!("bytes   {{{}}}", bytes);
            println!("integer {}ULL // {}", id.literal(), value);
            Ok(())
        }
    }
}

fn find_unit(
    schema: &Schema,
    input: &Path,
    name: &str,
) -> Result<NodeId, CompileError> {
    schema
        .roots()
        .iter()
        .copied()
        .find(|&id| schema.full_name(id) == name)
        .ok_or_else(|| CompileError::SchemaIntegrity {
            unit:    input.display().to_string(),
            element: name.to_string(),
            msg:     "no top-level unit with this name".to_string(),
        })
}
