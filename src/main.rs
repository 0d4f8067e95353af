extern crate log;
extern crate pretty_env_logger;

use std::error::Error;
use std::fs;

use clap::Parser;
use serde::{Deserialize, Serialize};

use geomesh::observation::InputConfig;
use geomesh::sparse::SparseWriter;
use geomesh::sparsify::{sparsify, SparsifyConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    config: String,
    #[arg(short, long, default_value = "sparse_distances.csv")]
    output: String,
    #[arg(long, action)]
    write_template: bool,
    /// File path of the timestamp-sorted observations (.csv)
    files: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
struct Config {
    sparsify_config: SparsifyConfig,
    input_config: InputConfig,
}

impl Config {
    fn from_toml(path: String) -> Result<Self, Box<dyn Error>> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if args.write_template {
        let config = Config::default();
        let config_str = toml::to_string_pretty(&config)?;

        let out_path = args.config;
        if fs::metadata(out_path.clone()).is_ok() {
            panic!("File already exists: {}", out_path);
        } else {
            std::fs::write(out_path.clone(), config_str)?;
            println!("Wrote default config to {}", out_path);
            return Ok(());
        }
    }

    // Parse the config from toml
    let config = Config::from_toml(args.config)?;

    pretty_env_logger::init();

    if args.files.len() != 1 {
        panic!("Expected exactly one input file, got {:?}", args.files);
    }
    let input_path = args.files[0].clone();

    // Threshold validation happens here, before any row is read.
    let params = config.sparsify_config.validate()?;

    log::info!("Reading observations from: {}", input_path);
    let mut reader = csv::Reader::from_path(&input_path)?;
    let mut writer = SparseWriter::from_path(&args.output)?;

    let summary = sparsify(&mut reader, &mut writer, &config.input_config, &params)?;
    writer.flush()?;

    println!(
        "observations: {} entries: {} max_window: {}",
        summary.observations, summary.entries_written, summary.max_window_len
    );
    log::info!("Wrote sparse distance matrix to: {}", args.output);

    Ok(())
}
