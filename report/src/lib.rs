//! Renders a resolved [`Definitions`] model as a text or HTML report.
//!
//! Both renderers are pure functions of the model: they never resolve
//! anything themselves and never fail on an unresolved reference.
//!
//! ```no_run
//! let definitions = suds_wsdl::parse(std::fs::read_to_string("service.wsdl")?)?;
//! println!("{}", suds_report::text(&definitions));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fmt, str::FromStr};

use suds_wsdl::types::Definitions;

pub mod anchor;
mod html;
mod index;
mod text;

pub use html::html;
pub use text::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Html,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown report format `{0}`, expected `text` or `html`")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Html => "html",
        })
    }
}

pub fn render(definitions: &Definitions, format: Format) -> String {
    tracing::debug!(
        "Rendering {} report for {} messages and {} schema declarations",
        format,
        definitions.messages.len(),
        definitions.declarations.len()
    );

    match format {
        Format::Text => text(definitions),
        Format::Html => html(definitions),
    }
}
