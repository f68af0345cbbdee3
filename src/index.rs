//! Newsgroup file index: fragment reassembly, folder grouping, caching
//!
//! The overview scan yields one [`ParsedHeader`] per article. Articles that
//! share a filename accumulate as fragments of one [`NewsFile`]; files
//! missing any fragment are pruned so callers only ever see wholes; files
//! sharing a normalized folder name collapse into synthetic directories.
//!
//! The resulting tree is exclusively owned, top down: an index owns its
//! files, a directory owns its children, a file owns its fragments. There
//! are no back-references, and a published index never mutates.

use crate::client::NntpConnection;
use crate::config::CredentialSource;
use crate::error::{NntpfsError, Result};
use crate::overview::{ParsedHeader, parse_header};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Articles scanned per listing, counting back from the newest
const MAX_ARTICLE_WINDOW: u64 = 2400;

/// Average encoded-article header overhead subtracted per fragment when
/// estimating decoded size
const FRAGMENT_HEADER_OVERHEAD: i64 = 800;

/// One numbered piece of a multi-part posting
#[derive(Debug, Clone)]
pub struct Fragment {
    /// 1-based part number
    pub part_number: u32,
    /// Message-id to fetch this part's body
    pub message_id: String,
    /// Declared (encoded) size in bytes
    pub declared_size: u64,
}

/// Payload of a [`NewsFile`]: fragments for regular files, child files for
/// synthesized directories
#[derive(Debug, Clone)]
pub enum FileContents {
    /// Fragments in the order they were attached
    Fragments(Vec<Fragment>),
    /// Files grouped under this synthetic directory
    Children(Vec<NewsFile>),
}

/// One reconstructed file (or synthesized folder) in a newsgroup
#[derive(Debug, Clone)]
pub struct NewsFile {
    /// Display name; slashes from the subject are mapped to dashes
    pub name: String,
    /// Normalized folder-name candidate from the subject, if any
    pub folder_name: Option<String>,
    /// Declared part count (member count for directories)
    pub total_parts: u32,
    /// Estimated decoded size; always 0 for directories
    pub size: u64,
    /// Posting date of the first fragment seen (newest member for
    /// directories)
    pub mod_date: Option<DateTime<Utc>>,
    /// Fragments or children
    pub contents: FileContents,
}

impl NewsFile {
    fn from_header(header: &ParsedHeader) -> Self {
        Self {
            name: display_name(&header.filename),
            folder_name: header.folder_name.clone(),
            total_parts: header.total_parts,
            size: 0,
            mod_date: header.mod_date,
            contents: FileContents::Fragments(Vec::new()),
        }
    }

    /// Whether this entry is a synthesized directory
    pub fn is_directory(&self) -> bool {
        matches!(self.contents, FileContents::Children(_))
    }

    /// Fragments of a regular file (empty slice for directories)
    pub fn fragments(&self) -> &[Fragment] {
        match &self.contents {
            FileContents::Fragments(fragments) => fragments,
            FileContents::Children(_) => &[],
        }
    }

    /// Children of a directory (empty slice for regular files)
    pub fn children(&self) -> &[NewsFile] {
        match &self.contents {
            FileContents::Children(children) => children,
            FileContents::Fragments(_) => &[],
        }
    }

    fn attach(&mut self, header: &ParsedHeader) {
        let FileContents::Fragments(fragments) = &mut self.contents else {
            return;
        };
        // first-seen wins: a repost with the same part number is ignored
        if fragments
            .iter()
            .any(|f| f.part_number == header.part_number)
        {
            return;
        }
        fragments.push(Fragment {
            part_number: header.part_number,
            message_id: header.message_id.clone(),
            declared_size: header.size,
        });
    }

    fn is_complete(&self) -> bool {
        self.fragments().len() as u32 >= self.total_parts
    }

    /// Estimated decoded size: the declared sizes minus a per-fragment
    /// header allowance, scaled by 3/4 for the 6-bit text encoding
    fn estimate_size(&self) -> u64 {
        let total: i64 = self
            .fragments()
            .iter()
            .map(|f| f.declared_size as i64 - FRAGMENT_HEADER_OVERHEAD)
            .sum();
        let scaled = 3 * total / 4;
        scaled.max(0) as u64
    }
}

/// A subject that is nothing but separators would produce an empty name
fn display_name(filename: &str) -> String {
    let mapped: String = filename
        .chars()
        .map(|c| if c == '/' { '-' } else { c })
        .collect();
    if mapped.is_empty() {
        "(Empty)".to_string()
    } else {
        mapped
    }
}

/// Placeholder for folders whose normalized name came out empty
const UNKNOWN_TITLE: &str = "Unknown Title";

/// Fold parsed overview rows into the list of complete top-level files
///
/// Part number 0 is noise and never attached; duplicate part numbers keep
/// the first fragment seen; files missing fragments are dropped; files
/// sharing a folder name group under a synthetic directory.
pub fn build_file_list(headers: impl IntoIterator<Item = ParsedHeader>) -> Vec<NewsFile> {
    let mut files: Vec<NewsFile> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for header in headers {
        if header.part_number == 0 {
            continue;
        }
        let key = display_name(&header.filename).to_ascii_lowercase();
        let index = *by_name.entry(key).or_insert_with(|| {
            files.push(NewsFile::from_header(&header));
            files.len() - 1
        });
        files[index].attach(&header);
    }

    files.retain(NewsFile::is_complete);
    for file in &mut files {
        file.size = file.estimate_size();
    }

    group_folders(files)
}

/// Cluster files with a shared folder name into synthetic directories
///
/// Only folders with two or more members become directories; singletons
/// stay plain files. Directories append after the remaining files, in the
/// order their folder name was first seen.
fn group_folders(files: Vec<NewsFile>) -> Vec<NewsFile> {
    let mut member_indices: HashMap<String, Vec<usize>> = HashMap::new();
    let mut folder_order: Vec<String> = Vec::new();

    for (index, file) in files.iter().enumerate() {
        if let Some(folder) = &file.folder_name {
            member_indices
                .entry(folder.clone())
                .or_insert_with(|| {
                    folder_order.push(folder.clone());
                    Vec::new()
                })
                .push(index);
        }
    }

    let mut slots: Vec<Option<NewsFile>> = files.into_iter().map(Some).collect();
    let mut directories: Vec<NewsFile> = Vec::new();

    for folder in folder_order {
        let members = &member_indices[&folder];
        if members.len() < 2 {
            continue;
        }
        let children: Vec<NewsFile> = members
            .iter()
            .filter_map(|&index| slots[index].take())
            .collect();
        let name = if folder.is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            folder
        };
        directories.push(NewsFile {
            name,
            folder_name: None,
            total_parts: children.len() as u32,
            size: 0,
            mod_date: children.iter().filter_map(|c| c.mod_date).max(),
            contents: FileContents::Children(children),
        });
    }

    let mut result: Vec<NewsFile> = slots.into_iter().flatten().collect();
    result.append(&mut directories);
    result
}

/// Case-insensitive entry lookup, distinguishing files from directories
pub fn find_entry<'a>(files: &'a [NewsFile], name: &str, directory: bool) -> Option<&'a NewsFile> {
    files
        .iter()
        .find(|f| f.is_directory() == directory && f.name.eq_ignore_ascii_case(name))
}

/// The assembled view of one newsgroup
#[derive(Debug)]
pub struct GroupIndex {
    /// Newsgroup this index was built from
    pub newsgroup: String,
    /// Top-level files and synthesized directories, post-grouping
    pub files: Vec<NewsFile>,
}

impl GroupIndex {
    /// Resolve a `[folder/]name` path against this index
    pub fn resolve(&self, folder: Option<&str>, name: &str) -> Option<&NewsFile> {
        match folder {
            Some(folder_name) => {
                let dir = find_entry(&self.files, folder_name, true)?;
                find_entry(dir.children(), name, false)
            }
            None => find_entry(&self.files, name, false),
        }
    }
}

/// Single-slot index cache
///
/// Holds at most one newsgroup's index; requesting a different group
/// replaces (and drops) the previous tree wholesale. The lock guards only
/// the slot swap — published indexes are immutable and shared by `Arc`.
#[derive(Default)]
pub struct GroupCache {
    slot: Mutex<Option<Arc<GroupIndex>>>,
}

impl GroupCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached index for `newsgroup`, if it is the resident one
    pub fn get(&self, newsgroup: &str) -> Option<Arc<GroupIndex>> {
        let slot = self.slot.lock().expect("group cache lock poisoned");
        slot.as_ref()
            .filter(|index| index.newsgroup.eq_ignore_ascii_case(newsgroup))
            .cloned()
    }

    /// Publish an index, replacing whatever was cached
    pub fn store(&self, index: Arc<GroupIndex>) {
        let mut slot = self.slot.lock().expect("group cache lock poisoned");
        *slot = Some(index);
    }

    /// Drop the cached index
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("group cache lock poisoned");
        *slot = None;
    }
}

/// Build a fresh index for `newsgroup` over an acquired connection
///
/// Selects the group (with the one-shot credential retry for servers that
/// gate groups behind authentication), streams the overview window, and
/// assembles the file list. Malformed overview rows are skipped, never
/// fatal.
pub async fn fetch_group_index(
    conn: &mut NntpConnection,
    newsgroup: &str,
    credentials: Option<&dyn CredentialSource>,
) -> Result<GroupIndex> {
    let info = match conn.select_group(newsgroup).await {
        Ok(info) => info,
        Err(
            err @ (NntpfsError::Io(_)
            | NntpfsError::Timeout
            | NntpfsError::Cancelled
            | NntpfsError::ConnectionClosed),
        ) => return Err(err),
        Err(first_failure) => {
            // servers sometimes admit anonymous readers but require auth
            // for particular groups; prompt once and retry
            let retry = if conn.is_anonymous() {
                credentials.and_then(|source| source.request(&conn.identity().host))
            } else {
                None
            };
            let Some(creds) = retry else {
                debug!("GROUP {} failed without retry: {}", newsgroup, first_failure);
                return Err(NntpfsError::NoSuchGroup(newsgroup.to_string()));
            };
            conn.login(&creds.username, &creds.password).await?;
            conn.select_group(newsgroup)
                .await
                .map_err(|_| NntpfsError::NoSuchGroup(newsgroup.to_string()))?
        }
    };

    if info.count == 0 || info.last < info.first {
        return Ok(GroupIndex {
            newsgroup: newsgroup.to_string(),
            files: Vec::new(),
        });
    }

    let mut first = info.first;
    if info.last - first > MAX_ARTICLE_WINDOW {
        first = info.last - MAX_ARTICLE_WINDOW;
    }

    conn.begin_overview(first, info.last).await?;

    let mut headers: Vec<ParsedHeader> = Vec::new();
    let mut skipped = 0usize;
    while let Some(line) = conn.next_overview_line().await? {
        match parse_header(&line) {
            Some(header) => headers.push(header),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(
            "Skipped {} malformed overview rows in {}",
            skipped, newsgroup
        );
    }

    debug!(
        "Scanned {} overview rows in {} ({}-{})",
        headers.len(),
        newsgroup,
        first,
        info.last
    );

    Ok(GroupIndex {
        newsgroup: newsgroup.to_string(),
        files: build_file_list(headers),
    })
}
