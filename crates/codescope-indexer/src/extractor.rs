//! Call-graph extraction for one file, structured when possible

use crate::languages::{get_extractor, heuristic};
use crate::parser_pool::{create_parser_pool, FileType, ParseError, ParseRequest, ParserPool};
use codescope_core::SymbolFacts;
use std::path::Path;

/// How a file will be read, chosen before any parsing happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// A grammar exists for this file type.
    Structured(FileType),
    /// No grammar; pattern matching only.
    Heuristic,
}

impl ExtractionStrategy {
    /// Capability probe based on the file extension.
    pub fn probe(path: &Path) -> Self {
        match FileType::from_path(path) {
            Some(file_type) => ExtractionStrategy::Structured(file_type),
            None => ExtractionStrategy::Heuristic,
        }
    }
}

/// Produces imports, declarations and call edges for a file.
///
/// Never fails: a structured parse that does not succeed degrades to the
/// heuristic path.
#[derive(Clone)]
pub struct CallGraphExtractor {
    pool: ParserPool,
}

impl CallGraphExtractor {
    pub fn new(pool: ParserPool) -> Self {
        Self { pool }
    }

    pub async fn extract(&self, path: &Path, content: &str) -> SymbolFacts {
        match ExtractionStrategy::probe(path) {
            ExtractionStrategy::Structured(file_type) => {
                match self.structured(file_type, path, content).await {
                    Ok(facts) => facts,
                    Err(e) => {
                        tracing::debug!("Falling back to heuristic extraction for {}: {}", path.display(), e);
                        heuristic::extract(content)
                    }
                }
            }
            ExtractionStrategy::Heuristic => heuristic::extract(content),
        }
    }

    async fn structured(
        &self,
        file_type: FileType,
        path: &Path,
        content: &str,
    ) -> Result<SymbolFacts, ParseError> {
        let parsed = self
            .pool
            .parse(ParseRequest {
                file_type,
                content: content.to_string(),
                path: path.to_path_buf(),
            })
            .await?;

        if parsed.tree.root_node().has_error() {
            return Err(ParseError::Syntax(parsed.path));
        }

        Ok(get_extractor(file_type).extract(&parsed.tree, &parsed.content))
    }
}

impl Default for CallGraphExtractor {
    fn default() -> Self {
        Self::new(create_parser_pool())
    }
}
