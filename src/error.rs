//! Error types for the circuit lab.
//!
//! This module provides a unified error type [`LabError`] covering schematic
//! loading (DSL and JSON), edits to the component registry, and the two
//! conditions under which the solving engine refuses to build a model.
//!
//! The engine itself never aborts a tick on these: [`crate::solver::Simulator`]
//! turns them into diagnostics on the tick report.

use thiserror::Error;

use crate::circuit::{ComponentId, NodeId};

/// Result type alias using [`LabError`].
pub type Result<T> = std::result::Result<T, LabError>;

/// Why a battery cannot act as the source of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringFault {
    /// The positive terminal is not on any wire.
    StartUnwired,
    /// The negative terminal is not on any wire.
    EndUnwired,
    /// Both terminals sit on the same wire (the battery is shorted).
    SharedWire,
}

impl std::fmt::Display for WiringFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WiringFault::StartUnwired => write!(f, "positive terminal is not wired"),
            WiringFault::EndUnwired => write!(f, "negative terminal is not wired"),
            WiringFault::SharedWire => write!(f, "both terminals are on the same wire"),
        }
    }
}

/// Unified error type for all circuit lab operations.
#[derive(Error, Debug)]
pub enum LabError {
    // ============ DSL Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}'")]
    UnknownComponentType { component_type: String },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    // ============ Schematic Errors ============
    /// Malformed JSON schematic
    #[error("Invalid schematic JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Component id not present in the registry
    #[error("Component {id} not found")]
    ComponentNotFound { id: ComponentId },

    /// Component name not present in the registry
    #[error("No component named '{name}'")]
    NameNotFound { name: String },

    /// Node id not present in the registry
    #[error("Node {id} not found")]
    NodeNotFound { id: NodeId },

    /// A connection request that cannot form a wire
    #[error("Cannot connect {a} to {b}: {message}")]
    InvalidConnection { a: NodeId, b: NodeId, message: String },

    /// Switch operation on a component that is not a switch
    #[error("Component '{name}' is not a switch")]
    NotASwitch { name: String },

    // ============ Engine Errors ============
    /// The source battery is floating or shorted
    #[error("Battery '{name}' wiring error: {fault}")]
    InvalidSourceWiring { name: String, fault: WiringFault },

    /// The active loops do not reduce to a series/parallel composition
    #[error("Unsupported topology: {message}")]
    UnsupportedTopology { message: String },

    // ============ I/O Errors ============
    /// Error reading a schematic file
    #[error("Failed to read schematic file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a schematic file
    #[error("Failed to write schematic file '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LabError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an unsupported topology error
    pub fn unsupported_topology(message: impl Into<String>) -> Self {
        Self::UnsupportedTopology {
            message: message.into(),
        }
    }
}
