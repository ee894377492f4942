use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use document_builder::clock::INPUT_DATE_FORMAT;
use document_builder::{
    available_types, create_document, Clock, Document, DocumentKind, DocumentVariant,
    FieldValues, FixedClock, PdfBuilder, Result, SystemClock,
};
use log::{debug, error, info, warn};

/// Builds résumés, business letters and meeting protocols from field values.
///
/// Field values are read from a JSON object (`--data`) and/or given one by one with
/// `--field name=value`; later values win.  PDF export needs the Times New Roman fonts under
/// `assets/fonts`, in `DOCUMENT_BUILDER_FONTS_DIR`, or the Windows system fonts.
#[derive(Parser)]
#[command(author, version, about = "Document builder for résumés, letters and protocols")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported document type tags.
    Types,

    /// Check that every required field is filled in.
    Validate(DocumentArgs),

    /// Print the HTML preview fragment.
    Preview(OutputArgs),

    /// Print the print layout as JSON.
    Layout(OutputArgs),

    /// Render the document to PDF.
    Export {
        #[command(flatten)]
        document: DocumentArgs,

        /// Output file or directory; defaults to the document's own file name.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render even when required fields are missing.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct DocumentArgs {
    /// Document type tag (cv, letter or protocol).
    #[arg(value_name = "TYPE")]
    kind: String,

    /// JSON file holding an object of field values.
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// A single field value, e.g. `--field firstName=Олена`.
    #[arg(short, long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Pin today's date (YYYY-MM-DD) instead of reading the system clock.
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct OutputArgs {
    #[command(flatten)]
    document: DocumentArgs,

    /// Write to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_field(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.replace("\\n", "\n")))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, INPUT_DATE_FORMAT)
        .map_err(|err| format!("invalid date '{}': {}", raw, err))
}

impl DocumentArgs {
    fn field_values(&self) -> Result<FieldValues> {
        let mut fields = match &self.data {
            Some(path) => {
                debug!("Reading field values from {}", path.display());
                FieldValues::from_json_file(path).map_err(|err| {
                    error!("Cannot use field values from {}", path.display());
                    err
                })?
            }
            None => FieldValues::new(),
        };
        fields.extend(self.fields.iter().cloned());
        Ok(fields)
    }

    fn document(&self) -> Result<Document> {
        create_document(&self.kind, self.field_values()?)
    }

    fn clock(&self) -> Box<dyn Clock> {
        match self.date {
            Some(date) => Box::new(FixedClock(date)),
            None => Box::new(SystemClock),
        }
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn report_missing(document: &Document) -> bool {
    let missing = document.missing_fields();
    for field in &missing {
        eprintln!("missing required field: {}", field);
    }
    missing.is_empty()
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Types => {
            for tag in available_types() {
                let title = DocumentKind::from_tag(tag).map(DocumentKind::title).unwrap_or(tag);
                println!("{:<10} {}", tag, title);
            }
            Ok(true)
        }
        Commands::Validate(args) => {
            let document = args.document()?;
            let valid = report_missing(&document);
            if valid {
                println!("{} document is valid", document.kind());
            }
            Ok(valid)
        }
        Commands::Preview(args) => {
            let document = args.document.document()?;
            let html = document.render_html(args.document.clock().as_ref());
            write_output(args.output.as_deref(), &html)?;
            Ok(true)
        }
        Commands::Layout(args) => {
            let document = args.document.document()?;
            let layout = document.print_layout(args.document.clock().as_ref());
            write_output(args.output.as_deref(), &layout.to_json()?)?;
            Ok(true)
        }
        Commands::Export {
            document: args,
            output,
            force,
        } => {
            let document = args.document()?;
            if !report_missing(&document) {
                if !force {
                    return Ok(false);
                }
                warn!("Exporting {} document with missing fields", document.kind());
            }

            let file_name = document.export_file_name();
            let path = match output {
                Some(path) if path.is_dir() => path.join(&file_name),
                Some(path) => path,
                None => PathBuf::from(&file_name),
            };

            let layout = document.print_layout(args.clock().as_ref());
            PdfBuilder::new()
                .with_title(file_name.trim_end_matches(".pdf"))
                .render_to_file(&layout, &path)?;
            println!("{}", path.display());
            Ok(true)
        }
    }
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("document_builder=info"),
    )
    .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("Error: {}", err);
            print_error_sources(&err);
            std::process::exit(1);
        }
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
