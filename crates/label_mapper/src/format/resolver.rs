//! Default label formats per value kind

use super::{FormatError, LabelFormat};
use crate::data::ScalarKind;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Default template for values of `kind`
pub const fn default_format(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Int8
        | ScalarKind::UInt8
        | ScalarKind::Int16
        | ScalarKind::UInt16
        | ScalarKind::Int32 => "%d",
        ScalarKind::UInt32 => "%u",
        ScalarKind::Int64 => "%ld",
        ScalarKind::UInt64 => "%lu",
        ScalarKind::IdType => "%lld",
        ScalarKind::Float32 => "%f",
        ScalarKind::Float64 => "%g",
        ScalarKind::Char => "%c",
        ScalarKind::String => "%s",
    }
}

/// The user template when one is set and non-empty, else the default for `kind`
pub fn resolve_format(kind: ScalarKind, user_format: Option<&str>) -> &str {
    match user_format {
        Some(format) if !format.is_empty() => format,
        _ => default_format(kind),
    }
}

/// Compiled-format cache used by a mapper
///
/// Holds the compiled user template, if any, and compiles each default
/// template the first time its kind is seen.
#[derive(Debug, Clone, Default)]
pub struct FormatResolver {
    user: Option<LabelFormat>,
    defaults: HashMap<ScalarKind, LabelFormat>,
}

impl FormatResolver {
    /// Create a resolver with no user template
    pub fn new() -> Self {
        Self::default()
    }

    /// The user template, if set
    pub fn user_format(&self) -> Option<&str> {
        self.user.as_ref().map(LabelFormat::template)
    }

    /// Replace the user template; `None` or `""` clears it
    ///
    /// Returns whether the stored template changed. An invalid template is
    /// rejected and the previous one kept.
    pub fn set_user_format(&mut self, format: Option<&str>) -> Result<bool, FormatError> {
        let format = format.filter(|f| !f.is_empty());
        if format == self.user_format() {
            return Ok(false);
        }
        self.user = format.map(LabelFormat::parse).transpose()?;
        Ok(true)
    }

    /// Compiled format for values of `kind`
    pub fn resolve(&mut self, kind: ScalarKind) -> Result<&LabelFormat, FormatError> {
        let Self { user, defaults } = self;
        if let Some(user) = user {
            return Ok(user);
        }
        match defaults.entry(kind) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let format = LabelFormat::parse(resolve_format(kind, None))?;
                Ok(entry.insert(format))
            }
        }
    }
}
