#![doc = include_str!("../README.md")]

mod client;
/// NNTP command builders and response parsers
pub mod commands;
mod config;
/// Streaming uuencode/base64 body decoding
pub mod decoder;
mod error;
/// Newsgroup file index: reassembly, folder grouping, caching
pub mod index;
/// XOVER header parsing
pub mod overview;
mod pool;
mod response;
/// Subject-line folder-name normalization
pub mod subject;
/// Virtual-filesystem adapter
pub mod vfs;

pub use client::NntpConnection;
pub use commands::{GroupInfo, parse_group_response, parse_response_line};
pub use config::{
    Credentials, CredentialSource, DEFAULT_PORT, ProxySettings, ServerIdentity, SiteConfig,
    TLS_PORT,
};
pub use decoder::{BodyDecoder, FileReader, TransferEncoding};
pub use error::{NntpfsError, Result};
pub use index::{
    Fragment, FileContents, GroupCache, GroupIndex, NewsFile, build_file_list, fetch_group_index,
};
pub use overview::{ParsedHeader, parse_date, parse_header};
pub use pool::ConnectionPool;
pub use response::{NntpResponse, codes};
pub use subject::normalize_folder_name;
pub use vfs::{DirCursor, FileInfo, FileKind, NewsUrl, NntpFs};
