use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};

use anamnesis_pdf::{
    EmptyInput, Error, ExportRequest, FontSet, Labels, ReportHeader, ReportOptions,
    export_report, extract_patient_name, font_directories, format_timestamp,
};

#[derive(Clone, Copy, ValueEnum)]
enum Lang {
    En,
    Id,
}

#[derive(Parser)]
#[command(name = "anamnesis-pdf", version)]
#[command(about = "Lay out an anamnesis summary as a paginated PDF")]
struct Cli {
    /// Summary text file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Directory the PDF is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Patient name for the filename (defaults to the summary's `Nama:` row)
    #[arg(long)]
    name: Option<String>,

    /// Date stamp for the filename, YYYY-MM-DD (defaults to today, UTC)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Date line printed under the title (defaults to the current time in WIB)
    #[arg(long)]
    timestamp: Option<String>,

    /// Language of the title block and footers
    #[arg(long, value_enum, default_value = "en")]
    lang: Lang,

    /// TrueType family to embed instead of the built-in Helvetica
    #[arg(long)]
    font_family: Option<String>,

    /// Extra directory searched for --font-family (ANAMNESIS_FONTS is searched too)
    #[arg(long)]
    font_dir: Vec<PathBuf>,

    /// Fail on an empty summary instead of writing a header-only page
    #[arg(long)]
    reject_empty: bool,
}

fn read_summary(input: Option<&PathBuf>) -> Result<String, Error> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        }),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(Error::Io)?;
            Ok(text)
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, Error> {
    let summary = read_summary(cli.input.as_ref())?;
    let now = Utc::now();
    let timestamp = cli.timestamp.unwrap_or_else(|| format_timestamp(now));

    let (header, labels) = match cli.lang {
        Lang::En => (ReportHeader::english(Some(&timestamp)), Labels::english()),
        Lang::Id => (ReportHeader::indonesian(Some(&timestamp)), Labels::indonesian()),
    };
    let options = ReportOptions {
        header,
        labels,
        empty_input: if cli.reject_empty {
            EmptyInput::Reject
        } else {
            EmptyInput::SinglePage
        },
        ..ReportOptions::default()
    };

    let fonts = match &cli.font_family {
        Some(family) => FontSet::load_family(family, &font_directories(&cli.font_dir))?,
        None => FontSet::builtin(),
    };

    let patient_name = cli.name.unwrap_or_else(|| extract_patient_name(&summary));
    let request = ExportRequest {
        patient_name: &patient_name,
        summary: &summary,
        date: cli.date.unwrap_or_else(|| now.date_naive()),
    };

    export_report(&request, &options, &fonts, &cli.output)
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
