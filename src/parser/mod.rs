pub mod table_parser;

pub use table_parser::{parser_for, LongTableParser, Parser, WideTableParser};
