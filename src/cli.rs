use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::{
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name="rmafster",
          version,
          about = "Counts reads supporting the reference, alternate, or other alleles at candidate mutation sites",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Mutated Allele Frequency Counter")]
    Count(CountArgs),
}

/// A BAM file with an optional sample name attached (`BAM[:NAME]`).
///
/// When the name is omitted it is resolved later from the BAM header.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub path: PathBuf,
    pub name: Option<String>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("count")))]
#[command(arg_required_else_help(true))]
pub struct CountArgs {
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "mutations")]
    #[clap(help = "CSV file with candidate mutations (columns chr,pos,ref,alt,var,sample_id)")]
    #[clap(value_name = "MUTATIONS")]
    #[arg(value_parser = check_file_exists)]
    pub mutations_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Path for the augmented output CSV")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: String,

    #[clap(short = 'i')]
    #[clap(long = "sample")]
    #[clap(help = "BAM file for one sample (BAM[:NAME]); only that sample's mutations are counted in it")]
    #[clap(value_name = "BAM[:NAME]")]
    #[clap(action = ArgAction::Append)]
    #[arg(value_parser = sample_spec_from_string)]
    pub samples: Vec<SampleSpec>,

    #[clap(short = 'a')]
    #[clap(long = "all")]
    #[clap(help = "BAM file to evaluate against every mutation in the table (BAM[:NAME])")]
    #[clap(value_name = "BAM[:NAME]")]
    #[clap(action = ArgAction::Append)]
    #[arg(value_parser = sample_spec_from_string)]
    pub all_samples: Vec<SampleSpec>,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "exclude-duplicates")]
    #[clap(help = "Exclude duplicate-flagged reads instead of only logging them")]
    pub exclude_duplicates: bool,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn sample_spec_from_string(s: &str) -> Result<SampleSpec> {
    let (file, name) = match s.rsplit_once(':') {
        Some((file, name)) => (file, Some(name)),
        None => (s, None),
    };
    if file.is_empty() {
        return Err(format!("Empty BAM path in sample spec: '{}'", s));
    }
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(format!("Empty sample name in sample spec: '{}'", s));
        }
    }
    let path = check_file_exists(file)?;
    Ok(SampleSpec {
        path,
        name: name.map(|n| n.to_string()),
    })
}
