//! kwtools: file and label management for machine-learning image datasets.
//!
//! The library exposes every operation as a plain function taking an
//! explicit options struct; the `kwtools` binary is a thin clap front end
//! over them.
//!
//! # Modules
//!
//! - [`labels`]: YOLO label parsing and class-name files
//! - [`analyze`]: label statistics
//! - [`rewrite`]: in-place class remapping and confidence stripping
//! - [`mapping`]: class mapping files
//! - [`coco`]: COCO documents, category remapping and YOLO conversion
//! - [`split`]: seeded train/val/test splitting
//! - [`images`]: image header statistics
//! - [`files`]: batch move, copy, rename and duplicate detection
//! - [`error`]: error types

pub mod analyze;
pub mod coco;
pub mod error;
pub mod files;
pub mod images;
pub mod labels;
pub mod mapping;
pub mod rewrite;
pub mod scan;
pub mod split;

mod progress;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

pub use error::{FileError, FileErrorKind, KwtoolsError};

/// The kwtools CLI application.
#[derive(Parser)]
#[command(name = "kwtools")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Move files.
    #[command(subcommand)]
    File(FileCommand),

    /// Batch-rename files.
    #[command(subcommand)]
    Rename(RenameCommand),

    /// Copy files and find duplicates.
    #[command(subcommand)]
    Utils(UtilsCommand),

    /// Inspect YOLO label directories.
    #[command(subcommand)]
    Label(LabelCommand),

    /// Split datasets and convert YOLO to COCO.
    #[command(subcommand)]
    Dataset(DatasetCommand),

    /// Inspect image files.
    #[command(subcommand)]
    Image(ImageCommand),

    /// Remap class ids in YOLO labels or categories in a COCO file.
    Modify(ModifyArgs),

    /// Strip the confidence column from YOLO label files.
    Clean(CleanArgs),
}

#[derive(Subcommand)]
enum FileCommand {
    /// Move files matching a pattern into a target directory.
    Move {
        source_dir: PathBuf,
        /// File name glob, e.g. '*.jpg'.
        pattern: String,
        target: PathBuf,
        #[arg(short, long)]
        recursive: bool,
    },
}

#[derive(Subcommand)]
enum RenameCommand {
    /// Replace a regex match in every file name.
    Rename {
        dir: PathBuf,
        pattern: String,
        replacement: String,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Add a prefix to every file name.
    Prefix {
        dir: PathBuf,
        prefix: String,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Add a suffix before every file extension.
    Suffix {
        dir: PathBuf,
        suffix: String,
        #[arg(short, long)]
        recursive: bool,
    },
}

#[derive(Subcommand)]
enum UtilsCommand {
    /// Copy files matching a pattern, keeping relative paths.
    Copy {
        source_dir: PathBuf,
        target_dir: PathBuf,
        pattern: String,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Group files with identical content.
    FindDuplicates {
        dir: PathBuf,
        #[arg(short, long)]
        recursive: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum LabelCommand {
    /// Count objects per class across label files.
    Analyze {
        label_dir: PathBuf,
        /// Class name file, one name per line.
        #[arg(short = 'n', long)]
        names: Option<PathBuf>,
        #[arg(short, long)]
        recursive: bool,
        /// List files that failed.
        #[arg(short, long)]
        verbose: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum DatasetCommand {
    /// Copy files into train/val/test directories.
    Split(SplitArgs),
    /// Build a COCO JSON file from YOLO labels.
    Yolo2coco(Yolo2CocoArgs),
}

#[derive(Args)]
struct SplitArgs {
    data_dir: PathBuf,
    output_dir: PathBuf,
    #[arg(short = 't', long, default_value_t = 0.7, value_parser = validate_ratio)]
    train: f64,
    #[arg(long, default_value_t = 0.2, value_parser = validate_ratio)]
    val: f64,
    #[arg(short = 's', long, default_value_t = 0.1, value_parser = validate_ratio)]
    test: f64,
    #[arg(long, default_value_t = split::DEFAULT_SEED)]
    seed: u64,
    /// File name glob; repeatable. Defaults to '*.jpg' and '*.png'.
    #[arg(short, long = "pattern")]
    patterns: Vec<String>,
}

#[derive(Args)]
struct Yolo2CocoArgs {
    yolo_dir: PathBuf,
    class_file: PathBuf,
    output_file: PathBuf,
    /// Image directory, if different from the label directory.
    #[arg(long)]
    img_dir: Option<PathBuf>,
    /// Image file name glob; repeatable. Defaults to '*.jpg' and '*.png'.
    #[arg(short, long = "pattern")]
    patterns: Vec<String>,
    /// Read image sizes and write absolute top-left pixel boxes.
    #[arg(long)]
    pixel_boxes: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum ImageCommand {
    /// Summarize formats, sizes, resolutions and color modes.
    Analyze {
        dir: PathBuf,
        #[arg(short, long)]
        recursive: bool,
        /// Image file name glob; repeatable. Defaults to '*.jpg' and '*.png'.
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,
        #[arg(short, long)]
        verbose: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Args)]
struct ModifyArgs {
    /// Label directory (yolo) or annotation file (coco).
    label_path: PathBuf,
    /// JSON file mapping old class ids to new ids and/or names.
    mapping_file: PathBuf,
    #[arg(short, long, value_enum)]
    format: LabelFormat,
    #[arg(short, long)]
    recursive: bool,
    /// Write the COCO result here instead of over the input.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Overwrite the COCO input without asking.
    #[arg(long)]
    yes: bool,
    /// Do not keep a .bak copy of modified label files.
    #[arg(long)]
    no_backup: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct CleanArgs {
    label_dir: PathBuf,
    #[arg(short, long)]
    recursive: bool,
    #[arg(long)]
    no_backup: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LabelFormat {
    Yolo,
    Coco,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("ratio must be between 0.0 and 1.0".to_string()),
    }
}

/// Run the kwtools CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), KwtoolsError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("kwtools {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("{}", env!("CARGO_PKG_DESCRIPTION"));
        println!();
        println!("Run 'kwtools --help' for usage information.");
        return Ok(());
    };

    init_logging(command.verbose());

    match command {
        Commands::File(FileCommand::Move {
            source_dir,
            pattern,
            target,
            recursive,
        }) => {
            let report = files::move_files(&source_dir, &pattern, &target, recursive)?;
            print!("{}", report);
        }
        Commands::Rename(cmd) => {
            let report = match cmd {
                RenameCommand::Rename {
                    dir,
                    pattern,
                    replacement,
                    recursive,
                } => files::batch_rename(&dir, &pattern, &replacement, recursive)?,
                RenameCommand::Prefix {
                    dir,
                    prefix,
                    recursive,
                } => files::add_prefix(&dir, &prefix, recursive)?,
                RenameCommand::Suffix {
                    dir,
                    suffix,
                    recursive,
                } => files::add_suffix(&dir, &suffix, recursive)?,
            };
            print!("{}", report);
        }
        Commands::Utils(UtilsCommand::Copy {
            source_dir,
            target_dir,
            pattern,
            recursive,
        }) => {
            let report = files::copy_files_by_pattern(&source_dir, &target_dir, &pattern, recursive)?;
            print!("{}", report);
        }
        Commands::Utils(UtilsCommand::FindDuplicates {
            dir,
            recursive,
            output,
        }) => {
            let report = files::find_duplicate_files(&dir, recursive)?;
            emit(&report, output)?;
        }
        Commands::Label(LabelCommand::Analyze {
            label_dir,
            names,
            recursive,
            verbose,
            output,
        }) => {
            let opts = analyze::AnalyzeOptions {
                recursive,
                class_names: names,
            };
            let analysis = analyze::analyze_labels(&label_dir, &opts)?.verbose(verbose);
            emit(&analysis, output)?;
        }
        Commands::Dataset(DatasetCommand::Split(args)) => run_split(args)?,
        Commands::Dataset(DatasetCommand::Yolo2coco(args)) => run_yolo2coco(args)?,
        Commands::Image(ImageCommand::Analyze {
            dir,
            recursive,
            patterns,
            verbose,
            output,
        }) => {
            let mut opts = images::ImageStatsOptions {
                recursive,
                ..Default::default()
            };
            if !patterns.is_empty() {
                opts.patterns = patterns;
            }
            let stats = images::analyze_images(&dir, &opts)?.verbose(verbose);
            emit(&stats, output)?;
        }
        Commands::Modify(args) => run_modify(args)?,
        Commands::Clean(args) => {
            let opts = rewrite::RewriteOptions {
                mode: rewrite::RewriteMode::StripConfidence,
                recursive: args.recursive,
                backup: !args.no_backup,
            };
            let report = rewrite::rewrite_labels_dir(&args.label_dir, &opts)?.verbose(args.verbose);
            print!("{}", report);
        }
    }

    Ok(())
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Label(LabelCommand::Analyze { verbose, .. })
            | Commands::Image(ImageCommand::Analyze { verbose, .. }) => *verbose,
            Commands::Dataset(DatasetCommand::Yolo2coco(args)) => args.verbose,
            Commands::Modify(args) => args.verbose,
            Commands::Clean(args) => args.verbose,
            _ => false,
        }
    }
}

/// `RUST_LOG` wins over the flag.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

fn emit<R>(report: &R, output: OutputFormat) -> Result<(), KwtoolsError>
where
    R: Serialize + std::fmt::Display,
{
    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).map_err(KwtoolsError::ReportJson)?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", report),
    }
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<(), KwtoolsError> {
    let mut opts = split::SplitOptions::new(args.data_dir, args.output_dir);
    opts.ratios = split::SplitRatios {
        train: args.train,
        val: args.val,
        test: args.test,
    };
    opts.seed = args.seed;
    if !args.patterns.is_empty() {
        opts.patterns = args.patterns;
    }

    let report = split::split_dataset(&opts)?;
    println!("Dataset split into {}:", opts.output_dir.display());
    print!("{}", report);
    Ok(())
}

fn run_yolo2coco(args: Yolo2CocoArgs) -> Result<(), KwtoolsError> {
    let mut opts = coco::ConvertOptions::new(args.yolo_dir, args.class_file);
    opts.image_dir = args.img_dir;
    if !args.patterns.is_empty() {
        opts.image_patterns = args.patterns;
    }
    if args.pixel_boxes {
        opts.bbox_mode = coco::BBoxMode::Pixel;
    }

    let (doc, report) = coco::convert_yolo_to_coco(&opts)?;
    coco::write_coco_json(&args.output_file, &doc)?;

    println!("Wrote {}:", args.output_file.display());
    print!("{}", report.verbose(args.verbose));
    Ok(())
}

fn run_modify(args: ModifyArgs) -> Result<(), KwtoolsError> {
    let mapping = mapping::ClassMapping::load(&args.mapping_file)?;

    match args.format {
        LabelFormat::Yolo => {
            let opts = rewrite::RewriteOptions {
                mode: rewrite::RewriteMode::RemapClasses(mapping.to_yolo()?),
                recursive: args.recursive,
                backup: !args.no_backup,
            };
            let report = rewrite::rewrite_labels_dir(&args.label_path, &opts)?.verbose(args.verbose);
            print!("{}", report);
        }
        LabelFormat::Coco => {
            if !args.label_path.exists() {
                return Err(KwtoolsError::InputNotFound {
                    path: args.label_path,
                });
            }
            if !args.label_path.is_file() {
                return Err(KwtoolsError::NotAFile {
                    path: args.label_path,
                });
            }
            if args.output.is_none() && !args.yes {
                let stdin = io::stdin();
                if !confirm_overwrite(&args.label_path, &mut stdin.lock(), &mut io::stderr())? {
                    println!("Aborted; {} was not modified.", args.label_path.display());
                    return Ok(());
                }
            }
            let report = coco::remap_coco_file(&args.label_path, &mapping, args.output.as_deref())?;
            info!("remapped {} category mapping(s)", mapping.len());
            print!("{}", report);
        }
    }
    Ok(())
}

/// Ask on `prompt` and read one answer line from `input`.
///
/// Only `y` or `yes` (any case) count as consent; end of input is a no.
fn confirm_overwrite<R, W>(path: &Path, input: &mut R, prompt: &mut W) -> Result<bool, KwtoolsError>
where
    R: BufRead,
    W: Write,
{
    write!(prompt, "Overwrite {}? [y/N] ", path.display())?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
