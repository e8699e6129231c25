use thiserror::Error;

/// Failures of the relational or document source. These abort the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Failed to open relational source '{path}': {message}")]
    Open { path: String, message: String },

    #[error("Query against table '{table}' failed: {message}")]
    Query { table: String, message: String },

    #[error("Diagram archive '{path}' could not be read: {message}")]
    Archive { path: String, message: String },

    #[error("Diagram '{0}' was not found in the archive")]
    DiagramNotFound(String),

    #[error("Diagram '{diagram}' could not be parsed: {source}")]
    Document {
        diagram: String,
        source: DiagramParseError,
    },

    #[error("Input file '{0}' does not exist")]
    MissingInput(String),
}

/// The interconnection text does not have the shape `-"<quoted>"<diagram>\<block>.<port>`.
///
/// Every variant carries the literal offending text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterconnectionError {
    #[error("No negation marker in interconnection text '{0}'")]
    MissingNegationMarker(String),

    #[error("Negation marker is not followed by a quoted segment in '{0}'")]
    MissingQuote(String),

    #[error("Unterminated quote in interconnection text '{0}'")]
    UnterminatedQuote(String),

    #[error("Interconnection text '{0}' has no backslash before the block name")]
    MissingBackslash(String),

    #[error("Interconnection text '{0}' has no '.' between block and port")]
    MissingPortSeparator(String),

    #[error("Interconnection text '{0}' has an empty block name")]
    EmptyBlock(String),

    #[error("Interconnection text '{0}' has an empty port identifier")]
    EmptyPort(String),

    #[error("Interconnection text '{text}' contains {count} negation references")]
    Ambiguous { text: String, count: usize },
}

impl InterconnectionError {
    /// The literal text that failed to parse.
    pub fn text(&self) -> &str {
        match self {
            InterconnectionError::MissingNegationMarker(t)
            | InterconnectionError::MissingQuote(t)
            | InterconnectionError::UnterminatedQuote(t)
            | InterconnectionError::MissingBackslash(t)
            | InterconnectionError::MissingPortSeparator(t)
            | InterconnectionError::EmptyBlock(t)
            | InterconnectionError::EmptyPort(t) => t,
            InterconnectionError::Ambiguous { text, .. } => text,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortReferenceError {
    #[error("Instance port '{0}' has no '/' separating block and port")]
    MissingSeparator(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramParseError {
    #[error("XML is not well-formed: {0}")]
    Xml(String),
}

impl From<roxmltree::Error> for DiagramParseError {
    fn from(err: roxmltree::Error) -> Self {
        DiagramParseError::Xml(err.to_string())
    }
}

/// Errors raised while loading the execution-data file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Config file '{path}' is not valid execution data: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("No {0} was given on the command line, in the environment or in the config file")]
    MissingValue(&'static str),
}
