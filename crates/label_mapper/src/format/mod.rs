//! Label formatting
//!
//! - [`LabelFormat`]: compiled printf-style template applied to one value
//! - [`FormatResolver`]: picks the user template or a per-kind default

mod printf;
mod resolver;

pub use printf::LabelFormat;
pub use resolver::{default_format, resolve_format, FormatResolver};

use thiserror::Error;

/// Widest field width a template may request
pub const MAX_FIELD_WIDTH: usize = 1024;

/// Errors raised while compiling a label format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The template ends in the middle of a conversion
    #[error("format '{template}' ends inside a conversion")]
    Truncated {
        /// Offending template
        template: String,
    },

    /// The conversion character is not supported
    #[error("unsupported conversion '%{conversion}' in format '{template}'")]
    UnknownConversion {
        /// Offending template
        template: String,
        /// Conversion character found
        conversion: char,
    },

    /// Width or precision taken from an argument
    #[error("'*' width or precision is not supported in format '{template}'")]
    StarArgument {
        /// Offending template
        template: String,
    },

    /// Width or precision above [`MAX_FIELD_WIDTH`]
    #[error("field width in format '{template}' exceeds {MAX_FIELD_WIDTH}")]
    FieldTooWide {
        /// Offending template
        template: String,
    },
}
