//! Output templates
//!
//! Template text uses `{{host}}` and `{{address}}` placeholders. Unknown
//! placeholders expand to nothing; an opening `{{` without a closing `}}` is
//! an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const START_TAG: &str = "{{";
const END_TAG: &str = "}}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Cannot find closing \"}}}}\" for placeholder opened at byte {0}")]
    Unclosed(usize),
}

/// Template with an optional header and footer line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Template {
    pub text: String,
    pub header: String,
    pub footer: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Template behind the `hosts` format
    pub fn hosts() -> Self {
        Self::new("{{address}} {{host}}")
    }

    /// Template behind the `csv` format
    pub fn csv() -> Self {
        Self::new("{{host}},{{address}}").with_header("name,address")
    }

    /// Returns true if text, header and footer are all empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.header.is_empty() && self.footer.is_empty()
    }

    /// Splits the text into literals and placeholders
    pub fn compile(&self) -> Result<CompiledText, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = self.text.as_str();
        let mut offset = 0;

        while let Some(start) = rest.find(START_TAG) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after_start = &rest[start + START_TAG.len()..];
            let end = after_start
                .find(END_TAG)
                .ok_or(TemplateError::Unclosed(offset + start))?;
            segments.push(Segment::Placeholder(after_start[..end].to_string()));

            let consumed = start + START_TAG.len() + end + END_TAG.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(CompiledText { segments })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Template text ready for expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledText {
    segments: Vec<Segment>,
}

impl CompiledText {
    /// Expands the text for one (host, address) pair
    pub fn expand(&self, host: &str, address: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(tag) => match tag.as_str() {
                    "host" => out.push_str(host),
                    "address" => out.push_str(address),
                    _ => {}
                },
            }
        }
        out
    }
}
