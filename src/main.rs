/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;

use lxb::boards;
use lxb::common::period_ns_from_hz;
use lxb::constraints::{ConstraintFormat, ConstraintSet};
use lxb::dbg_log;
use lxb::exporter::*;
use lxb::loader::{self, OpenOpts, OpenWriteError, WriteOpts};
#[allow(unused)]
use lxb::log::*;
use lxb::platform::*;
use lxb::programmer::Programmer;
use lxb::xdc_import::{self, ImportError, ImportOpts};

#[derive(Parser, Debug)]
#[clap(
    author = "Antmicro",
    version = "0.1.0",
    about = "LXB - LiteX board descriptions and pin constraints",
    long_about = None
)]
struct Args {
    #[clap(subcommand)]
    command: SubCommands,
}

#[derive(Parser, Debug)]
struct BoardArgs {
    #[clap(help = "Built-in board name or board file (.json/.yaml, gzipped if .gz)")]
    board: String,
    #[clap(long, help = "Board revision (defaults to the board's default revision)")]
    revision: Option<String>,
}

#[derive(Parser, Debug)]
struct ShowCmd {
    #[clap(flatten)]
    board: BoardArgs,
}

#[derive(Parser, Debug)]
struct ValidateCmd {
    #[clap(flatten)]
    board: BoardArgs,
}

#[derive(Parser, Debug)]
struct ConstraintsCmd {
    #[clap(flatten)]
    board: BoardArgs,
    #[clap(long, help = "Toolchain to emit constraints for (trellis, diamond, vivado)")]
    toolchain: Option<Toolchain>,
    #[clap(
        long = "request",
        help = "Resource to constrain, NAME or NAME:INDEX (all resources if none given)"
    )]
    requests: Vec<String>,
    #[clap(short = 'o', long, help = "Output file (stdout if not given)")]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DumpCmd {
    #[clap(flatten)]
    board: BoardArgs,
    #[clap(short = 'o', long, help = "Board file to write (gzipped if .gz)")]
    output: PathBuf,
    #[clap(long, default_value = "6", help = "gzip compression level")]
    compression: u32,
}

#[derive(Parser, Debug)]
struct ExportCmd {
    #[clap(
        long,
        value_delimiter = ',',
        help = "Comma-separated boards to export, \":all\" for every board (default)"
    )]
    boards: Option<Vec<String>>,
    #[clap(long, default_value = ".", help = "Directory for constraint files")]
    prefix: PathBuf,
    #[clap(long, help = "Also write a JSON summary of the exported boards")]
    json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ImportXdcCmd {
    #[clap(help = "Vendor master XDC file")]
    xdc: PathBuf,
    #[clap(short = 'o', long, help = "Board file to write (gzipped if .gz)")]
    output: PathBuf,
    #[clap(long, help = "Skip ports with no naming rule or a malformed name")]
    lenient: bool,
    #[clap(long, help = "Board name (defaults to the XDC file name)")]
    name: Option<String>,
    #[clap(long, default_value = "xcvu9p-fsgd2104-2l-e", help = "FPGA part")]
    device: String,
}

#[derive(Parser, Debug)]
struct ProgramCmd {
    #[clap(flatten)]
    board: BoardArgs,
    #[clap(help = "Bitstream to load")]
    bitstream: PathBuf,
}

#[derive(Parser, Debug)]
enum SubCommands {
    /// List built-in boards
    List,
    /// Print a board's pin and connector tables
    Show(ShowCmd),
    /// Check a board's pin tables
    Validate(ValidateCmd),
    /// Generate a toolchain constraint file
    Constraints(ConstraintsCmd),
    /// Write a board file
    Dump(DumpCmd),
    /// Write constraint files for several built-in boards
    Export(ExportCmd),
    /// Build a board file from a vendor XDC
    ImportXdc(ImportXdcCmd),
    /// Print the command loading a bitstream onto the board
    Program(ProgramCmd),
}

#[derive(Debug)]
enum CliError {
    UnknownBoard(String),
    BadRequest(String),
    Platform(PlatformError),
    BoardFile(OpenWriteError),
    Import(ImportError),
    Io(String),
    Invalid(usize),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBoard(b) => write!(
                f, "unknown board {} (built-in: {})", b, boards::names().join(", ")
            ),
            Self::BadRequest(r) => write!(f, "malformed request \"{}\", expected NAME[:INDEX]", r),
            Self::Platform(e) => write!(f, "{}", e),
            Self::BoardFile(e) => write!(f, "{}", e),
            Self::Import(e) => write!(f, "XDC import failed: {}", e),
            Self::Io(e) => write!(f, "{}", e),
            Self::Invalid(n) => write!(f, "{} violation(s) found", n),
        }
    }
}

impl std::error::Error for CliError {}

impl From<PlatformError> for CliError {
    fn from(e: PlatformError) -> Self {
        Self::Platform(e)
    }
}

impl From<OpenWriteError> for CliError {
    fn from(e: OpenWriteError) -> Self {
        Self::BoardFile(e)
    }
}

impl From<ImportError> for CliError {
    fn from(e: ImportError) -> Self {
        Self::Import(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(format!("{}", e))
    }
}

fn is_board_file(arg: &str) -> bool {
    arg.contains('/') || [".json", ".yaml", ".yml", ".gz"].iter().any(|ext| arg.ends_with(ext))
}

fn is_compressed(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

fn load_board(arg: &str) -> Result<BoardDescription, CliError> {
    if is_board_file(arg) {
        let raw = !is_compressed(Path::new(arg));
        Ok(loader::open(arg, OpenOpts { raw })?)
    } else {
        boards::get(arg).cloned().ok_or_else(|| CliError::UnknownBoard(arg.to_string()))
    }
}

fn parse_request(req: &str) -> Result<(&str, Option<u32>), CliError> {
    let bad = || CliError::BadRequest(req.to_string());
    match req.split_once(':') {
        Some((name, index)) if !name.is_empty() =>
            Ok((name, Some(index.parse().map_err(|_| bad())?))),
        Some(_) => Err(bad()),
        None if req.is_empty() => Err(bad()),
        None => Ok((req, None)),
    }
}

fn list() {
    for board in boards::all() {
        let toolchains: Vec<&str> = board.toolchains.iter().map(|t| t.as_str()).collect();
        for revision in &board.revisions {
            let default = if revision.name == board.default_revision { "*" } else { " " };
            println!(
                "{:<20} {}{:<8} {:<24} {}",
                board.name, default, revision.name, revision.device, toolchains.join(",")
            );
        }
    }
}

fn show(args: ShowCmd) -> Result<(), CliError> {
    let board = load_board(&args.board.board)?;
    let platform = Platform::new(&board, PlatformOpts { revision: args.board.revision, toolchain: None })?;

    println!("Board:      {} rev. {}", platform.board(), platform.revision());
    println!("Device:     {}", platform.device());
    println!("Toolchain:  {}", platform.toolchain());
    println!("Programmer: {}", platform.create_programmer());
    println!("Clock:      {} ({} ns)", board.default_clk_name, board.default_clk_period_ns);
    println!();
    for record in platform.io() {
        print!("{}", record);
    }
    if !platform.connectors().is_empty() {
        println!();
        for c in platform.connectors() {
            println!("{}: {}", c.name, String::from(c.pins.clone()));
        }
    }
    Ok(())
}

fn validate_board(args: ValidateCmd) -> Result<(), CliError> {
    let board = load_board(&args.board.board)?;
    let revisions: Vec<String> = match args.board.revision {
        Some(revision) => vec![revision],
        None => board.revision_names().into_iter().map(String::from).collect(),
    };

    let mut violations = 0;
    for revision in revisions {
        let platform = Platform::new(&board, PlatformOpts { revision: Some(revision), toolchain: None })?;
        let report = platform.validate();
        print!("{} rev. {}: {}", platform.board(), platform.revision(), report);
        violations += report.violations.len();
    }

    if violations != 0 {
        return Err(CliError::Invalid(violations));
    }
    Ok(())
}

fn constraints(args: ConstraintsCmd) -> Result<(), CliError> {
    let board = load_board(&args.board.board)?;
    let mut platform = Platform::new(&board, PlatformOpts {
        revision: args.board.revision,
        toolchain: args.toolchain,
    })?;

    for req in &args.requests {
        let (name, index) = parse_request(req)?;
        platform.request(name, index)?;
    }
    let text = platform.build_constraints()?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)?;
            dbg_log!(DBG_INFO, "Wrote {}", path.display());
        },
        None => print!("{}", text),
    }
    Ok(())
}

fn dump(args: DumpCmd) -> Result<(), CliError> {
    let mut board = load_board(&args.board.board)?;
    if let Some(revision) = args.board.revision {
        let selected = board.revision(&revision).cloned().ok_or_else(|| {
            PlatformError::UnsupportedRevision {
                board: board.name.clone(),
                revision: revision.clone(),
                supported: board.revision_names().into_iter().map(String::from).collect(),
            }
        })?;
        board.default_revision = selected.name.clone();
        board.revisions = vec![selected];
    }

    let opts = WriteOpts { raw: !is_compressed(&args.output), compresion_level: args.compression };
    loader::write(&args.output, &board, opts)?;
    Ok(())
}

#[derive(Serialize)]
struct BoardSummary {
    revision: String,
    device: String,
    toolchain: Toolchain,
    format: ConstraintFormat,
    constraints: ConstraintSet,
    validation: ValidationReport,
}

fn export(args: ExportCmd) -> Result<(), CliError> {
    let selection = args.boards.or_else(|| Some(vec![EXPORT_ALL.to_string()]));
    let checker = ExportChecker::new(&selection);
    for name in checker.unknown(&boards::names()) {
        eprintln!("Warning: no built-in board named {}", name);
    }

    std::fs::create_dir_all(&args.prefix)?;
    let mut xdc_exporter =
        MultiFileExporter::new(&selection, &args.prefix, ConstraintFormat::Xdc.extension());
    let mut lpf_exporter =
        MultiFileExporter::new(&selection, &args.prefix, ConstraintFormat::Lpf.extension());
    /* serde::Serialize is not object-safe, summaries get their own exporter */
    let mut json_exporter: Option<CompoundJsonExporter<BoardSummary>> =
        args.json.map(|path| CompoundJsonExporter::new(&selection, path));

    for board in boards::all() {
        if !checker.should_export(&board.name) {
            continue;
        }
        dbg_log!(DBG_INFO, "Exporting board {}", board.name);

        let mut platform = Platform::new(board, PlatformOpts::default())?;
        let text = platform.build_constraints()?;
        let exporter = match platform.constraint_format() {
            ConstraintFormat::Xdc => &mut xdc_exporter,
            ConstraintFormat::Lpf => &mut lpf_exporter,
        };
        exporter.ignore_or_export(&board.name, || text)?;

        if let Some(json_exporter) = json_exporter.as_mut() {
            json_exporter.ignore_or_export(&board.name, || BoardSummary {
                revision: platform.revision().to_string(),
                device: platform.device().to_string(),
                toolchain: platform.toolchain(),
                format: platform.constraint_format(),
                constraints: platform.constraint_set(),
                validation: platform.validate(),
            })?;
        }
    }

    for path in xdc_exporter.written().iter().chain(lpf_exporter.written()) {
        println!("{}", path.display());
    }
    if let Some(mut json_exporter) = json_exporter {
        json_exporter.flush()?;
    }
    Ok(())
}

fn import_xdc(args: ImportXdcCmd) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&args.xdc)?;
    let io = xdc_import::import(&text, ImportOpts { lenient: args.lenient })?;

    let name = args.name.unwrap_or_else(|| {
        args.xdc.file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "imported".to_string())
    });
    let board = BoardDescription {
        name,
        default_clk_name: "clk300".into(),
        default_clk_period_ns: period_ns_from_hz(300e6),
        toolchains: vec![Toolchain::Vivado],
        programmer: Programmer::Vivado,
        default_revision: boards::DEFAULT_REVISION.into(),
        revisions: vec![Revision {
            name: boards::DEFAULT_REVISION.into(),
            device: args.device,
            io,
            connectors: Vec::new(),
        }],
        period_constraints: Vec::new(),
        platform_commands: Vec::new(),
        shared_pins: Vec::new(),
    };

    let report = validate(&board.revisions[0].io, &[], &[]);
    if !report.is_ok() {
        eprint!("Warning: imported table has violations:\n{}", report);
    }
    println!("Imported {} signals", board.revisions[0].io.len());

    let opts = WriteOpts { raw: !is_compressed(&args.output), ..Default::default() };
    loader::write(&args.output, &board, opts)?;
    Ok(())
}

fn program(args: ProgramCmd) -> Result<(), CliError> {
    let board = load_board(&args.board.board)?;
    let platform = Platform::new(&board, PlatformOpts { revision: args.board.revision, toolchain: None })?;
    let invocation = platform.create_programmer().invocation(&args.bitstream);

    if let Some(script) = &invocation.script {
        println!("# {}", script.filename);
        print!("{}", script.contents);
        println!();
    }
    println!("{}", invocation);
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        SubCommands::List => {
            list();
            Ok(())
        },
        SubCommands::Show(cmd) => show(cmd),
        SubCommands::Validate(cmd) => validate_board(cmd),
        SubCommands::Constraints(cmd) => constraints(cmd),
        SubCommands::Dump(cmd) => dump(cmd),
        SubCommands::Export(cmd) => export(cmd),
        SubCommands::ImportXdc(cmd) => import_xdc(cmd),
        SubCommands::Program(cmd) => program(cmd),
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
