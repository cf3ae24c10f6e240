// Licensed under the Apache-2.0 license

//! `csrgen` command line.
//!
//! Exit status: 0 on success, 2 when the register tree cannot be loaded,
//! 3 when the design is rejected, 4 for configuration errors and 1 for
//! everything else.

mod config;

use anyhow::Context;
use clap::Parser;
use config::{Config, Overrides, DEFAULT_CONFIG};
use csrgen_generator::{GenerateError, Generator};
use csrgen_model::Block;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "csrgen",
    author,
    version,
    about = "Generate a register block, headers and docs from an elaborated register tree"
)]
struct Cli {
    /// Elaborated register tree (.json or .hjson)
    #[arg(short = 'r', long = "rdl", value_name = "FILE")]
    rdl: PathBuf,

    /// Generator configuration
    #[arg(short = 'c', long = "config", visible_short_alias = 'i', value_name = "FILE", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Naming prefix for software header symbols
    #[arg(short = 'p', long = "prefix")]
    prefix: Option<String>,

    /// Root directory of the generated tree
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Increase logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// A failed run together with the exit status it maps to.
struct Failure {
    status: u8,
    error: anyhow::Error,
}

trait WithStatus<T> {
    fn status(self, status: u8) -> Result<T, Failure>;
}

impl<T> WithStatus<T> for anyhow::Result<T> {
    fn status(self, status: u8) -> Result<T, Failure> {
        self.map_err(|error| Failure { status, error })
    }
}

const EXIT_OTHER: u8 = 1;
const EXIT_LOAD: u8 = 2;
const EXIT_VALIDATION: u8 = 3;
const EXIT_CONFIG: u8 = 4;

fn run(cli: &Cli) -> Result<(), Failure> {
    let overrides = Overrides {
        prefix: cli.prefix.clone(),
        out_dir: cli.out_dir.clone(),
    };
    let config = Config::load(&cli.config)
        .and_then(|config| config.generator_config(&overrides))
        .status(EXIT_CONFIG)?;

    let top = Block::from_file(&cli.rdl)
        .with_context(|| format!("failed to load register tree {}", cli.rdl.display()))
        .status(EXIT_LOAD)?;

    match Generator::new(config).run(&top) {
        Ok(report) => {
            if let Some(backup) = &report.backup {
                info!("Previous output kept in {}", backup.display());
            }
            info!(
                "Generated {} files in {}",
                report.files.len(),
                report.module_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            let status = match e {
                GenerateError::Validation(_) => EXIT_VALIDATION,
                GenerateError::UnknownTemplates(_) => EXIT_CONFIG,
                _ => EXIT_OTHER,
            };
            Err(Failure {
                status,
                error: anyhow::Error::new(e).context(format!("failed to generate {}", top.name)),
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Only fails if a logger is already installed.
    let _ = SimpleLogger::new().with_level(level).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure { status, error }) => {
            error!("{error:#}");
            ExitCode::from(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["csrgen", "-r", "foo.json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
        assert_eq!(cli.prefix, None);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::try_parse_from([
            "csrgen", "-r", "foo.hjson", "-i", "alt.toml", "-p", "bar", "-o", "out", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert_eq!(cli.prefix.as_deref(), Some("bar"));
        assert_eq!(cli.out_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rdl_is_required() {
        assert!(Cli::try_parse_from(["csrgen"]).is_err());
    }

    fn write_inputs(dir: &std::path::Path, tree: &str) -> Cli {
        write_inputs_with(dir, tree, "sw_defines.h")
    }

    fn write_inputs_with(dir: &std::path::Path, tree: &str, sw_defines: &str) -> Cli {
        let config = format!(
            "[design]\nlanguage = \"sv\"\nbus = \"apb4\"\nbyte_addresses = false\n\n\
             [templates]\ntfolder = \"templates\"\nmodule_template = \"regblock.sv\"\n\
             package_template = \"regblock_pkg.sv\"\nrtl_offset_template = \"offsets.svh\"\n\
             sw_offset_template = \"sw_offsets.h\"\nsw_defines_template = {:?}\n\n\
             [output]\ndir = {:?}\n",
            sw_defines,
            dir.join("out").display().to_string()
        );
        std::fs::write(dir.join(DEFAULT_CONFIG), config).unwrap();
        std::fs::write(dir.join("foo.json"), tree).unwrap();
        Cli {
            rdl: dir.join("foo.json"),
            config: dir.join(DEFAULT_CONFIG),
            prefix: None,
            out_dir: None,
            verbose: 0,
        }
    }

    const FOO: &str = r#"{
        "type": "addrmap", "name": "foo",
        "children": [
            { "type": "reg", "name": "ctrl", "offset": 0,
              "fields": [ { "name": "en", "high": 0, "low": 0, "sw": "rw", "hw": "r" } ] }
        ]
    }"#;

    #[test]
    fn test_exit_statuses() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = write_inputs(tmp.path(), FOO);
        assert!(run(&cli).is_ok());
        assert!(tmp.path().join("out/FOO/rtl/FOO.sv").is_file());

        let missing_config = Cli {
            config: tmp.path().join("nope.toml"),
            ..write_inputs(tmp.path(), FOO)
        };
        assert_eq!(run(&missing_config).err().map(|f| f.status), Some(EXIT_CONFIG));

        let bad_tree = write_inputs(tmp.path(), "{ not json");
        assert_eq!(run(&bad_tree).err().map(|f| f.status), Some(EXIT_LOAD));

        let empty = write_inputs(
            tmp.path(),
            r#"{ "type": "addrmap", "name": "foo", "children": [] }"#,
        );
        assert_eq!(run(&empty).err().map(|f| f.status), Some(EXIT_VALIDATION));
    }

    #[test]
    fn test_unknown_template_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = write_inputs(tmp.path(), FOO);
        assert!(run(&cli).is_ok());

        let cli = write_inputs_with(tmp.path(), FOO, "custom_defines.h");
        assert_eq!(run(&cli).err().map(|f| f.status), Some(EXIT_CONFIG));
        // The previous run is left in place.
        assert!(tmp.path().join("out/FOO/rtl/FOO.sv").is_file());
        assert!(!tmp.path().join("out/FOO.copy").exists());
    }
}
