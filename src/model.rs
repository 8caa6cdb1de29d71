use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::locator::DocumentLocator;

/// Well-known vocabulary IRIs used by the built-in extractors and rules.
pub mod vocab {
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DCTERMS_SOURCE: &str = "http://purl.org/dc/terms/source";
    pub const FOAF_DOCUMENT: &str = "http://xmlns.com/foaf/0.1/Document";
    pub const XHTML_VOCAB: &str = "http://www.w3.org/1999/xhtml/vocab#";
    pub const XHTML_LICENSE: &str = "http://www.w3.org/1999/xhtml/vocab#license";
    pub const OPEN_GRAPH: &str = "http://ogp.me/ns#";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    Iri {
        value: String,
    },
    Blank {
        id: String,
    },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri {
            value: value.into(),
        }
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Self::Blank { id: id.into() }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: Some(language.into().to_ascii_lowercase()),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri { value } => Some(value),
            _ => None,
        }
    }
}

impl From<&Url> for Term {
    fn from(url: &Url) -> Self {
        Self::iri(url.as_str())
    }
}

impl From<&DocumentLocator> for Term {
    fn from(locator: &DocumentLocator) -> Self {
        Self::iri(locator.as_str())
    }
}

/// Writes the term in N-Triples syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri { value } => write!(f, "<{}>", escape_iri(value)),
            Self::Blank { id } => write!(f, "_:{id}"),
            Self::Literal {
                value,
                language,
                datatype,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(language) = language {
                    write!(f, "@{language}")
                } else if let Some(datatype) = datatype {
                    write!(f, "^^<{}>", escape_iri(datatype))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: Term::iri(predicate),
            object,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_iri(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\0'..=' ' => {
                escaped.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => escaped.push(c),
        }
    }
    escaped
}
