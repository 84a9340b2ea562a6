use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde::Serialize;

use isbn_capture_backends::{
    ImageFolderCamera, SymbolDecoder, TesseractConfig, TesseractRecognizer,
};
use isbn_capture_core::{
    validate, Identifier, ScanConfiguration, ScanError, ScanOutcome, ScanSession,
};

use crate::book::{Book, BookMetadata, CoverStyle, NewBook};
use crate::config::AppConfig;
use crate::error::CatalogError;
use crate::scan_state::{ConsoleDelegate, DiagnosticsInfo, Session};
use crate::search::{self, SearchField};

/// Form fields for `add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    /// Hardback, Softback, Paperback, Mass Market Paperback, Leather Bound or Board Book
    #[arg(long, default_value = "Hardback")]
    pub cover_style: String,
    #[arg(long)]
    pub isbn: Option<String>,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Folder of still images to scan, in file-name order
    #[arg(long)]
    pub frames: PathBuf,
    /// Stop after the last image instead of cycling
    #[arg(long)]
    pub once: bool,
    #[arg(long)]
    pub no_ocr: bool,
    #[arg(long)]
    pub no_barcode: bool,
    #[arg(long, default_value_t = 1500)]
    pub interval_ms: u64,
    /// Give up after this many seconds; 0 scans until a match
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
    /// ISBN typed by hand; used if the camera cannot be opened or nothing is recognized first
    #[arg(long)]
    pub manual: Option<String>,
    /// Tesseract executable
    #[arg(long, default_value = "tesseract")]
    pub tesseract: PathBuf,
    /// Store the looked-up book with this cover style
    #[arg(long)]
    pub add: Option<String>,
    /// Print scan diagnostics as JSON when done
    #[arg(long)]
    pub diagnostics: bool,
}

impl ScanArgs {
    pub fn scan_configuration(&self) -> ScanConfiguration {
        ScanConfiguration {
            poll_interval: Duration::from_millis(self.interval_ms),
            enable_barcode: !self.no_barcode,
            enable_ocr: !self.no_ocr,
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            ..Default::default()
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CatalogError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CatalogError::Storage(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_books(books: &[&Book]) {
    if books.is_empty() {
        println!("No books.");
        return;
    }
    for book in books {
        let isbn = book
            .isbn
            .as_deref()
            .map(|i| format!(" ISBN {}", i))
            .unwrap_or_default();
        println!(
            "{}  {} by {} ({}){}",
            book.id, book.title, book.author, book.cover_style, isbn
        );
    }
}

fn print_metadata(meta: &BookMetadata) {
    println!("ISBN:   {}", meta.isbn);
    println!("Title:  {}", meta.title);
    println!("Author: {}", meta.author);
    println!("Source: {}", meta.source);
}

pub fn list(config: &AppConfig, json: bool) -> Result<(), CatalogError> {
    let books = config.store().list()?;
    if json {
        return print_json(&books);
    }
    print_books(&books.iter().collect::<Vec<_>>());
    Ok(())
}

pub fn add(config: &AppConfig, args: AddArgs) -> Result<(), CatalogError> {
    let isbn = args
        .isbn
        .as_deref()
        .map(|text| validate(text).map_err(|_| ScanError::ManualEntryRejected(text.into())))
        .transpose()?;
    let book = config.store().add(NewBook {
        title: args.title,
        author: args.author,
        cover_style: args.cover_style.parse()?,
        isbn,
    })?;
    println!("Added {}", book.id);
    Ok(())
}

pub fn delete(config: &AppConfig, id: &str) -> Result<(), CatalogError> {
    let book = config.store().delete(id)?;
    println!("Deleted \"{}\"", book.title);
    Ok(())
}

pub fn search(config: &AppConfig, term: &str, by: &str, json: bool) -> Result<(), CatalogError> {
    let field: SearchField = by.parse()?;
    let books = config.store().list()?;
    let hits = search::filter(&books, term, field);
    if json {
        return print_json(&hits);
    }
    print_books(&hits);
    Ok(())
}

pub fn authors(config: &AppConfig, prefix: Option<&str>) -> Result<(), CatalogError> {
    let authors = search::unique_authors(&config.store().list()?);
    match prefix {
        Some(prefix) => {
            if let Some(author) = search::suggest_author(prefix, &authors) {
                println!("{}", author);
            }
        }
        None => authors.iter().for_each(|a| println!("{}", a)),
    }
    Ok(())
}

pub fn lookup(config: &AppConfig, isbn: &str) -> Result<(), CatalogError> {
    let id = validate(isbn).map_err(|_| ScanError::ManualEntryRejected(isbn.into()))?;
    let meta = config.lookup_chain().lookup(&id)?;
    print_metadata(&meta);
    Ok(())
}

pub fn scan(config: &AppConfig, args: ScanArgs) -> Result<(), CatalogError> {
    let cover_style = args.add.as_deref().map(str::parse::<CoverStyle>).transpose()?;

    let camera = if args.once {
        ImageFolderCamera::once(&args.frames)
    } else {
        ImageFolderCamera::new(&args.frames)
    };
    let ocr = TesseractRecognizer::with_config(TesseractConfig {
        program: args.tesseract.clone(),
        ..Default::default()
    });
    let mut session: Session = ScanSession::new(camera, SymbolDecoder::new(), ocr);
    session.set_delegate(ConsoleDelegate::new(log::log_enabled!(log::Level::Info)));
    session.configure(args.scan_configuration())?;

    let outcome = run_session(&mut session, args.manual.as_deref())?;
    if args.diagnostics {
        print_json(&DiagnosticsInfo::from(session.diagnostics()))?;
    }

    match outcome {
        ScanOutcome::Accepted(id) => accept(config, &id, cover_style),
        ScanOutcome::Cancelled => {
            println!("Scan cancelled.");
            Ok(())
        }
        ScanOutcome::Failed(e) => Err(e.into()),
    }
}

/// Start scanning, falling back to the manual entry if the camera cannot be
/// acquired.
fn run_session(session: &mut Session, manual: Option<&str>) -> Result<ScanOutcome, CatalogError> {
    if let Some(text) = manual {
        validate(text).map_err(|_| ScanError::ManualEntryRejected(text.into()))?;
    }

    if let Err(e) = session.start() {
        let Some(text) = manual else {
            session.stop();
            return Err(e.into());
        };
        log::info!("camera unavailable ({}), using manual entry", e);
        session.submit_manual(text)?;
        return Ok(session.wait());
    }

    if let Some(text) = manual {
        // Give the recognizers one poll before the typed entry takes over
        std::thread::sleep(session.config().poll_interval);
        if let Err(e) = session.submit_manual(text) {
            log::debug!("manual entry not used: {}", e);
        }
    }
    Ok(session.wait())
}

fn accept(
    config: &AppConfig,
    id: &Identifier,
    cover_style: Option<CoverStyle>,
) -> Result<(), CatalogError> {
    println!("Scanned {}", id);
    let meta = match config.lookup_chain().lookup(id) {
        Ok(meta) => meta,
        Err(CatalogError::NotFound(what)) if cover_style.is_none() => {
            println!("No metadata found for {}. Enter title and author manually.", what);
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    print_metadata(&meta);

    if let Some(style) = cover_style {
        let book = config.store().add(meta.prefill(style))?;
        println!("Added {}", book.id);
    }
    Ok(())
}
