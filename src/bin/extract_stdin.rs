//! Simple CLI that reads HTML from stdin and prints the extraction result as
//! JSON to stdout.
//!
//! Usage: `extract_stdin [PAGE_URL] < page.html`
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`.

use std::io::{self, Read};

use page_harvest::{extract, ExtractionResult, HtmlPage};
use tracing_subscriber::EnvFilter;

fn run() -> ExtractionResult {
    let mut bytes = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut bytes) {
        return ExtractionResult::failure(format!("Failed to read from stdin: {e}"));
    }

    let mut page = HtmlPage::from_bytes(&bytes);
    if let Some(raw) = std::env::args().nth(1) {
        match url::Url::parse(&raw) {
            Ok(location) => page = page.with_url(location),
            Err(e) => return ExtractionResult::failure(format!("Invalid page URL `{raw}`: {e}")),
        }
    }
    extract(&page)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let result = run();
    println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
}
