//! Glow parser: converts a token stream into device, define and function
//! tables.

mod defines;
mod parse_decl;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};

/// Lex and parse a source file in one step.
pub fn parse_source(source_file: &glow_types::SourceFile) -> ParseResult {
    let lexed = glow_lexer::Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}
