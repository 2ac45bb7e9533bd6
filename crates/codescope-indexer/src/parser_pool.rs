//! Thread-safe parser pool for tree-sitter parsers
//!
//! Parsing is CPU-bound and must not stall the async scheduler, so requests
//! are handed to dedicated parser threads over a channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tree_sitter::{Language, Parser};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to set language {file_type:?}: {message}")]
    Language { file_type: FileType, message: String },
    #[error("parser produced no tree for {0}")]
    NoTree(PathBuf),
    #[error("syntax errors in {0}")]
    Syntax(PathBuf),
    #[error("parser pool is shut down")]
    PoolClosed,
    #[error("parser worker died")]
    WorkerDied,
    #[error("parse task failed: {0}")]
    Join(String),
}

/// Languages with a structured extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Python,
    JavaScript,
}

impl FileType {
    /// Determine file type from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "py" | "pyi" => Some(FileType::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(FileType::JavaScript),
            _ => None,
        }
    }

    /// Get the tree-sitter language for this file type
    pub fn get_language(&self) -> Language {
        match self {
            FileType::Python => tree_sitter_python::LANGUAGE.into(),
            FileType::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// A parsing request sent to the parser pool
#[derive(Debug)]
pub struct ParseRequest {
    pub file_type: FileType,
    pub content: String,
    pub path: PathBuf,
}

/// Result of a parsing operation
#[derive(Debug)]
pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub path: PathBuf,
    pub content: String,
}

struct WorkerRequest {
    request: ParseRequest,
    response_sender: mpsc::Sender<Result<ParseResult, ParseError>>,
}

/// Thread-safe parser pool
#[derive(Clone)]
pub struct ParserPool {
    sender: mpsc::Sender<WorkerRequest>,
}

impl ParserPool {
    /// Create a new parser pool with the specified number of worker threads
    pub fn new(num_workers: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<WorkerRequest>();
        let receiver = Arc::new(Mutex::new(receiver));

        for i in 0..num_workers.max(1) {
            let receiver = receiver.clone();
            std::thread::spawn(move || {
                Self::worker_thread(i, receiver);
            });
        }

        Self { sender }
    }

    fn worker_thread(worker_id: usize, receiver: Arc<Mutex<mpsc::Receiver<WorkerRequest>>>) {
        tracing::debug!("Parser worker {} started", worker_id);

        let mut parser = Parser::new();

        loop {
            let next = match receiver.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };
            let WorkerRequest {
                request,
                response_sender,
            } = match next {
                Ok(req) => req,
                Err(_) => {
                    tracing::debug!("Parser worker {} shutting down", worker_id);
                    break;
                }
            };

            let result = Self::parse_with(&mut parser, request);
            if response_sender.send(result).is_err() {
                tracing::warn!("Failed to send parse result back to caller");
            }
        }
    }

    fn parse_with(parser: &mut Parser, request: ParseRequest) -> Result<ParseResult, ParseError> {
        let language = request.file_type.get_language();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::Language {
                file_type: request.file_type,
                message: e.to_string(),
            })?;

        match parser.parse(&request.content, None) {
            Some(tree) => Ok(ParseResult {
                tree,
                path: request.path,
                content: request.content,
            }),
            None => Err(ParseError::NoTree(request.path)),
        }
    }

    fn submit(
        sender: &mpsc::Sender<WorkerRequest>,
        request: ParseRequest,
    ) -> Result<ParseResult, ParseError> {
        let (response_sender, response_receiver) = mpsc::channel();
        sender
            .send(WorkerRequest {
                request,
                response_sender,
            })
            .map_err(|_| ParseError::PoolClosed)?;
        response_receiver.recv().map_err(|_| ParseError::WorkerDied)?
    }

    /// Parse content, blocking the current thread until done
    pub fn parse_blocking(&self, request: ParseRequest) -> Result<ParseResult, ParseError> {
        Self::submit(&self.sender, request)
    }

    /// Parse content without blocking the async scheduler
    pub async fn parse(&self, request: ParseRequest) -> Result<ParseResult, ParseError> {
        let sender = self.sender.clone();
        tokio::task::spawn_blocking(move || Self::submit(&sender, request))
            .await
            .map_err(|e| ParseError::Join(e.to_string()))?
    }
}

/// Convenience function to create a parser pool with default settings
pub fn create_parser_pool() -> ParserPool {
    // Use number of CPU cores as default worker count, but at least 2
    let num_workers = std::thread::available_parallelism()
        .map(|n| n.get().max(2))
        .unwrap_or(2);

    ParserPool::new(num_workers)
}
