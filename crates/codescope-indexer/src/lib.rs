//! File parsing and symbol extraction

pub mod extractor;
pub mod languages;
pub mod parser_pool;


pub use extractor::{CallGraphExtractor, ExtractionStrategy};
pub use languages::LanguageExtractor;
pub use parser_pool::{create_parser_pool, FileType, ParseError, ParseRequest, ParseResult, ParserPool};
