//! linkshelf command line.
//!
//! Thin front-end over the library: classify and resolve single URLs, import
//! or export the local shelf, list saved bookmarks, or watch stdin and resolve
//! metadata for the last URL typed.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use linkshelf::app::{default_db_path, App};
use linkshelf::logging::{self, LoggerConfig};
use linkshelf::managers::bookmark_manager::BookmarkStore;
use linkshelf::services::debounce::Debouncer;
use linkshelf::services::import_export::{import_bookmarks, serialize_bookmarks};
use linkshelf::services::metadata_resolver::MetadataResolver;
use linkshelf::services::platform_classifier::classify_url;
use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkshelf::types::bookmark::BookmarkQuery;
use linkshelf::types::platform::PlatformFilter;
use linkshelf::types::settings::ShelfSettings;
use linkshelf::types::transfer::ExportFormat;

type CliResult = Result<(), Box<dyn std::error::Error>>;

const USAGE: &str = "\
usage: linkshelf <command> [args]

commands:
  classify <url>                   print the platform a URL belongs to
  resolve <url>                    fetch title, description and thumbnail
  import <file|->                  import bookmarks (JSON, CSV, bookmark HTML or URL list)
  export <json|csv|html> [file]    export the shelf to a file or stdout
  list [platform] [query]          list bookmarks, newest first
  watch                            resolve URLs typed on stdin, debounced";

fn load_settings() -> ShelfSettings {
    let mut engine = SettingsEngine::new(None);
    match engine.load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("warning: {}; using default settings", e);
            ShelfSettings::default()
        }
    }
}

fn open_app() -> Result<App, Box<dyn std::error::Error>> {
    App::new(&default_db_path().to_string_lossy())
}

fn read_input(source: &str) -> io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(source)
    }
}

fn cmd_classify(url: &str) -> CliResult {
    let tag = classify_url(url);
    println!("{}\t{}", tag, tag.display_name());
    Ok(())
}

async fn cmd_resolve(settings: &ShelfSettings, url: &str) -> CliResult {
    let resolver = MetadataResolver::new(settings.metadata.clone())?;
    let metadata = resolver.resolve(url).await;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

async fn cmd_import(source: &str) -> CliResult {
    let text = read_input(source)?;
    let app = open_app()?;
    let mut store = app.store();
    let summary = import_bookmarks(&text, app.user_id(), &app.resolver, &mut store).await;

    println!("Imported {}/{} bookmarks", summary.succeeded, summary.attempted);
    for failure in &summary.failures {
        println!(
            "  #{} {}: {}",
            failure.index + 1,
            failure.url.as_deref().unwrap_or("(no url)"),
            failure.reason
        );
    }
    Ok(())
}

fn cmd_export(format: &str, out: Option<&str>) -> CliResult {
    let format: ExportFormat = format.parse()?;
    let app = open_app()?;
    let bookmarks = app.store().list_bookmarks(app.user_id())?;
    let file = serialize_bookmarks(&bookmarks, format);

    match out {
        Some(path) => {
            fs::write(path, &file.content)?;
            eprintln!("Wrote {} bookmarks to {}", bookmarks.len(), path);
        }
        None => print!("{}", file.content),
    }
    Ok(())
}

fn cmd_list(platform: Option<&str>, search: Option<&str>) -> CliResult {
    let filter: PlatformFilter = platform.unwrap_or("all").parse()?;
    let app = open_app()?;
    let query = BookmarkQuery {
        platform: filter,
        search: search.map(str::to_string),
    };
    let bookmarks = app.store().query_bookmarks(app.user_id(), &query)?;

    if bookmarks.is_empty() {
        println!("No bookmarks found.");
    }
    for b in &bookmarks {
        println!("[{}] {}", b.source.display_name(), b.title);
        println!("    {}", b.url);
        if !b.tags.is_empty() {
            println!("    #{}", b.tags.join(" #"));
        }
    }
    Ok(())
}

/// Each stdin line restarts the debounce timer; only the last URL of a burst
/// is resolved.
async fn cmd_watch(settings: &ShelfSettings) -> CliResult {
    let resolver = MetadataResolver::new(settings.metadata.clone())?;
    let debouncer = Arc::new(Debouncer::default());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let url = line.trim().to_string();
        if url.is_empty() {
            continue;
        }
        println!("{}\t{}", url, classify_url(&url).display_name());

        let debouncer = Arc::clone(&debouncer);
        let resolver = resolver.clone();
        pending.push(tokio::spawn(async move {
            if debouncer.settle().await {
                let metadata = resolver.resolve(&url).await;
                match serde_json::to_string(&metadata) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!(error = %e, "failed to encode metadata"),
                }
            }
        }));
        pending.retain(|handle| !handle.is_finished());
    }

    for handle in pending {
        handle.await?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = load_settings();
    if let Err(e) = logging::init(LoggerConfig::with_level(settings.logging.level.clone())) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let arg = |i: usize| args.get(i).map(String::as_str);
    let result = match (arg(0), arg(1)) {
        (Some("classify"), Some(url)) => cmd_classify(url),
        (Some("resolve"), Some(url)) => cmd_resolve(&settings, url).await,
        (Some("import"), Some(source)) => cmd_import(source).await,
        (Some("export"), Some(format)) => cmd_export(format, arg(2)),
        (Some("list"), platform) => cmd_list(platform, arg(2)),
        (Some("watch"), None) => cmd_watch(&settings).await,
        (None, _) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
