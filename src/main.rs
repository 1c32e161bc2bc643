use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::{ArgAction, Parser, Subcommand};
use log::{error, warn};

use presswork::markup::MarkupInterpreter;
use presswork::sheet::{self, DelimitedWorkbook};
use presswork::{Error, Font, Info, LayoutEngine, PdfSink};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// TTF or OTF font file used for measurement and embedding
    #[arg(long)]
    font: PathBuf,

    /// Draw a dashed rectangle around the margin box of each page
    #[arg(long)]
    margin_lines: bool,

    /// Draw tick marks at the horizontal stops recorded on each page
    #[arg(long)]
    debug_marks: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render markup files to sibling .pdf files
    Markup {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Render workbook files to sibling .pdf and .txt files
    Sheet {
        /// Password for protected workbooks
        #[arg(short, long)]
        password: Option<String>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let font = match std::fs::read(&args.font).map_err(Error::from).and_then(Font::load) {
        Ok(font) => Rc::new(font),
        Err(e) => {
            error!("{}: {}", args.font.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut processed = 0;
    match &args.command {
        Command::Markup { files } => {
            for file in files {
                match render_markup(file, &font, &args) {
                    Ok(()) => processed += 1,
                    Err(e) => error!("{}: {}", file.display(), e),
                }
            }
        }
        Command::Sheet { password, files } => {
            if password.is_some() {
                warn!("the delimited workbook reader ignores passwords");
            }
            for file in files {
                match render_sheet(file, &font, &args) {
                    Ok(()) => processed += 1,
                    Err(e) => error!("{}: {}", file.display(), e),
                }
            }
        }
    }

    println!("processed {} files.", processed);
    ExitCode::SUCCESS
}

fn make_engine(path: &Path, font: &Rc<Font>, args: &Args) -> LayoutEngine<Rc<Font>, PdfSink> {
    let mut info = Info::new();
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        info.title(stem);
    }
    let sink = PdfSink::new(font.clone(), info);
    let mut engine = LayoutEngine::new(font.clone(), sink);
    engine.set_draw_margin_box(args.margin_lines);
    engine.set_draw_debug_marks(args.debug_marks);
    engine
}

fn render_markup(path: &Path, font: &Rc<Font>, args: &Args) -> Result<(), Error> {
    let text = std::fs::read_to_string(path)?;
    let mut engine = make_engine(path, font, args);
    MarkupInterpreter::new(&mut engine).render(&text)?;

    let mut out = BufWriter::new(File::create(path.with_extension("pdf"))?);
    engine.finish(&mut out)
}

fn render_sheet(path: &Path, font: &Rc<Font>, args: &Args) -> Result<(), Error> {
    let text = std::fs::read_to_string(path)?;
    let workbook = DelimitedWorkbook::parse(&text);

    let mut engine = make_engine(path, font, args);
    sheet::render_pdf(&workbook, &mut engine)?;
    let mut pdf = BufWriter::new(File::create(path.with_extension("pdf"))?);
    engine.finish(&mut pdf)?;

    let mut txt = BufWriter::new(File::create(path.with_extension("txt"))?);
    sheet::write_text(&workbook, &mut txt)
}
