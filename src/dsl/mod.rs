//! DSL (Domain Specific Language) parser for schematic descriptions.
//!
//! A line-oriented, SPICE-flavoured text format for building the
//! component/node/wire model without the drawing surface. Every net name
//! becomes one wire; terminals listed on the same net are wired together.
//!
//! # Grammar Overview
//!
//! ```text
//! schematic   = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = ".join" net net | ".title" { word }
//! component   = [keyword] name net net { value | state | param }
//!
//! keyword     = "BATTERY" | "RESISTOR" | "BULB" | "LAMP" | "SWITCH" | "AMMETER" | "VOLTMETER"
//! state       = "on" | "off" | "closed" | "open"
//! param       = ("r" | "v" | "i" | "p") '=' value
//! value       = number [si_prefix] [unit]
//! si_prefix   = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! unit        = "V" | "A" | "W" | "ohm" | "ohms" | "Ω"
//! ```
//!
//! Without a keyword the kind comes from the name prefix:
//!
//! | Prefix | Kind | Positional value |
//! |--------|------|------------------|
//! | B | Battery (first net is the positive pole) | EMF |
//! | R | Resistor | resistance |
//! | L | Bulb | resistance |
//! | SW, S | Switch | `on`/`off` |
//! | A | Ammeter | - |
//! | V | Voltmeter | - |
//!
//! # Example
//!
//! ```text
//! # Two bulbs in parallel behind a switch
//! B1   plus minus 9V
//! SW1  plus a     on
//! L1   a    minus 30
//! L2   a    minus 60
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a schematic DSL string into an AST.
pub fn parse(input: &str) -> Result<SchematicAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a schematic DSL file.
pub fn parse_file(path: &std::path::Path) -> Result<SchematicAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::LabError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
