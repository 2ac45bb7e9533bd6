//! Reading and decoding source files

use crate::discover::DiscoveredFile;
use codescope_core::{content_hash, Decoding};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid text in any permitted decoding ({tried})")]
    Undecodable { path: PathBuf, tried: String },
}

/// A decoded file with its content hash. Lives for one run only.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub key: String,
    pub text: String,
    pub hash: String,
    pub decoding: Decoding,
}

/// Decode `bytes` with the first decoding that accepts them.
pub fn decode(bytes: &[u8], decodings: &[Decoding]) -> Option<(String, Decoding)> {
    decodings.iter().find_map(|&decoding| {
        let text = match decoding {
            Decoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Decoding::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| b as char).collect()),
            // every byte maps to the code point of the same value
            Decoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        };
        text.map(|text| (text, decoding))
    })
}

/// Read, decode and hash one discovered file.
pub async fn read_source(file: &DiscoveredFile, decodings: &[Decoding]) -> Result<SourceFile, ReadError> {
    let bytes = tokio::fs::read(&file.path).await.map_err(|source| ReadError::Io {
        path: file.path.clone(),
        source,
    })?;

    let (text, decoding) = decode(&bytes, decodings).ok_or_else(|| ReadError::Undecodable {
        path: file.path.clone(),
        tried: decodings
            .iter()
            .map(|d| format!("{:?}", d))
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    if decoding != Decoding::Utf8 {
        tracing::debug!("Decoded {} as {:?}", file.key, decoding);
    }

    Ok(SourceFile {
        hash: content_hash(&text),
        path: file.path.clone(),
        key: file.key.clone(),
        text,
        decoding,
    })
}
