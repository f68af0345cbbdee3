//! Newsgroup browsing example
//!
//! Lists a binaries newsgroup the way a file browser would see it:
//! complete files at the top level, related files folded into folders.
//!
//! Run with: cargo run --example browse

use nntpfs::{FileKind, NewsUrl, NntpFs, SiteConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let host = std::env::var("NNTP_HOST").unwrap_or_else(|_| "news.example.com".to_string());
    let group =
        std::env::var("NNTP_GROUP").unwrap_or_else(|_| "alt.binaries.sounds.mp3".to_string());

    // Credentials are optional; many servers admit anonymous readers
    let auth = match (std::env::var("NNTP_USER"), std::env::var("NNTP_PASS")) {
        (Ok(user), Ok(pass)) => format!("{}:{}@", user, pass),
        _ => String::new(),
    };

    let fs = NntpFs::new(SiteConfig::default());
    let token = CancellationToken::new();

    let url = NewsUrl::parse(&format!("news://{}{}/{}", auth, host, group), fs.site())?;
    println!("Listing {} on {}...\n", group, host);

    let mut dir = fs.open_directory(&url, &token).await?;
    let mut files = 0usize;
    let mut folders = 0usize;

    while let Some(entry) = fs.read_directory(&mut dir) {
        match entry.kind {
            FileKind::Directory => {
                folders += 1;
                println!("  {}/", entry.name);

                let inner = NewsUrl::parse(
                    &format!("news://{}{}/{}/{}", auth, host, group, entry.name),
                    fs.site(),
                )?;
                let mut sub = fs.open_directory(&inner, &token).await?;
                while let Some(member) = fs.read_directory(&mut sub) {
                    files += 1;
                    println!("      {:>12}  {}", member.size.unwrap_or(0), member.name);
                }
            }
            FileKind::Regular => {
                files += 1;
                println!(
                    "  {:>12}  {} ({})",
                    entry.size.unwrap_or(0),
                    entry.name,
                    entry.mime_type
                );
            }
        }
    }

    println!("\n{} files in {} folders", files, folders);
    Ok(())
}
