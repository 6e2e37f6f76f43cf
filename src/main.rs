//! Command-line interface for eadexport

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use eadexport::{
    handle_linebreaks, DescriptionRecord, EadSerializer, ExportOptions, Instance, SequentialIds,
    XmlElement,
};

#[derive(Parser, Debug)]
#[command(name = "eadexport")]
#[command(author, version, about = "EAD serialization of archival description records", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Export unpublished notes and agents, marked audience="internal"
    #[arg(long, global = true)]
    include_unpublished: bool,

    /// Export options file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Additional translations file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    translations: Option<PathBuf>,

    /// Prefix for element ids
    #[arg(long, global = true)]
    id_prefix: Option<String>,

    /// Number generated ids from zero instead of using random ids
    #[arg(long, global = true)]
    sequential_ids: bool,

    /// Indent output by this many spaces
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Output file (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serialize the containers of an instance record
    Container {
        /// Path to the instance JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Serialize the notes of a description record
    Notes {
        /// Path to the record JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write DID-level notes instead of archdesc-level notes
        #[arg(long)]
        did: bool,
    },

    /// Rebuild paragraph markup from blank-line separated text
    Linebreaks {
        /// Path to the text file, or - for stdin
        #[arg(value_name = "FILE")]
        file: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Container { file } => cmd_container(&cli.global, file),
        Commands::Notes { file, did } => cmd_notes(&cli.global, file, *did),
        Commands::Linebreaks { file } => cmd_linebreaks(&cli.global, file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_serializer(global: &GlobalArgs) -> Result<EadSerializer, Box<dyn std::error::Error>> {
    let mut options = match &global.config {
        Some(path) => ExportOptions::from_json_file(path)?,
        None => ExportOptions::default(),
    };
    if global.include_unpublished {
        options.include_unpublished = true;
    }
    if let Some(prefix) = &global.id_prefix {
        options.id_prefix = prefix.clone();
    }
    if global.indent.is_some() {
        options.indent = global.indent;
    }
    if let Some(path) = &global.translations {
        options.translations = Some(path.clone());
    }

    let serializer = EadSerializer::from_options(options)?;
    if global.sequential_ids {
        Ok(serializer.with_id_generator(SequentialIds::new()))
    } else {
        Ok(serializer)
    }
}

fn cmd_container(global: &GlobalArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let serializer = build_serializer(global)?;
    let instance: Instance = serde_json::from_str(&fs::read_to_string(file)?)?;

    let mut parent = XmlElement::new("did");
    serializer.serialize_container(&instance, &mut parent)?;

    write_output(global, &serializer.render_fragment(&parent)?)
}

fn cmd_notes(global: &GlobalArgs, file: &Path, did: bool) -> Result<(), Box<dyn std::error::Error>> {
    let serializer = build_serializer(global)?;
    let record: DescriptionRecord = serde_json::from_str(&fs::read_to_string(file)?)?;

    let mut parent = XmlElement::new(if did { "did" } else { "archdesc" });
    if did {
        serializer.serialize_did_notes(&record, &mut parent);
    } else {
        serializer.serialize_nondid_notes(&record, &mut parent);
    }

    write_output(global, &serializer.render_fragment(&parent)?)
}

fn cmd_linebreaks(global: &GlobalArgs, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = if file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(file)?
    };

    write_output(global, &handle_linebreaks(&text))
}

fn write_output(global: &GlobalArgs, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(output_path) = &global.output {
        fs::write(output_path, text)?;
    } else {
        println!("{}", text);
    }
    Ok(())
}
