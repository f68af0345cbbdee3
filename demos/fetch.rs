//! File download example
//!
//! Streams one reconstructed file out of a newsgroup and writes it to
//! disk. The file's fragments are fetched and decoded on the fly; the
//! read loop never sees the article boundaries.
//!
//! Run with: cargo run --example fetch -- "<file name>"

use nntpfs::{NewsUrl, NntpFs, SiteConfig};
use std::io::Write;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let Some(name) = std::env::args().nth(1) else {
        eprintln!("usage: fetch <file name as shown by browse>");
        std::process::exit(2);
    };

    let host = std::env::var("NNTP_HOST").unwrap_or_else(|_| "news.example.com".to_string());
    let group =
        std::env::var("NNTP_GROUP").unwrap_or_else(|_| "alt.binaries.sounds.mp3".to_string());
    let auth = match (std::env::var("NNTP_USER"), std::env::var("NNTP_PASS")) {
        (Ok(user), Ok(pass)) => format!("{}:{}@", user, pass),
        _ => String::new(),
    };

    let fs = NntpFs::new(SiteConfig::default());
    let token = CancellationToken::new();

    let url = NewsUrl::parse(&format!("news://{}{}/{}/{}", auth, host, group, name), fs.site())?;
    println!("Fetching {} from {}...", name, group);

    let mut reader = fs.open_file(&url, &token).await?;

    // file names may carry a folder prefix; flatten for the local copy
    let local_name = name.replace('/', "-");
    let mut out = std::fs::File::create(&local_name)?;

    let mut chunk = vec![0u8; 64 * 1024];
    let mut total = 0usize;
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        out.write_all(&chunk[..n])?;
        total += n;
    }
    reader.close();

    println!("Wrote {} bytes to {}", total, local_name);
    Ok(())
}
