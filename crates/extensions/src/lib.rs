//! Built-in extensions and the registry that turns `-x` arguments into
//! configured [`Extension`]s.

mod duplicates;
pub mod error;
mod selector;
mod usage;

pub use crate::duplicates::{DuplicateFinder, UniquePolicy};
pub use crate::selector::{Request, Selector};
pub use crate::usage::usage;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use ifs_index::{Extension, Params};

/// Names of every built-in extension.
pub const NAMES: &[&str] = &[DuplicateFinder::NAME, DuplicateFinder::AUDIO_NAME];

/// Outcome of an `-x` argument.
pub enum Selection {
    /// A configured extension, ready for the pipeline.
    Use(Box<dyn Extension>),
    /// Usage text of the requested extension.
    Help(String),
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Use(extension) => f.debug_tuple("Use").field(&extension.name()).finish(),
            Self::Help(text) => f.debug_tuple("Help").field(text).finish(),
        }
    }
}

/// An unconfigured instance of the named extension.
pub fn create(name: &str) -> Result<Box<dyn Extension>> {
    Ok(match name {
        DuplicateFinder::NAME => Box::new(DuplicateFinder::new()),
        DuplicateFinder::AUDIO_NAME => Box::new(DuplicateFinder::audio()),
        other => exn::bail!(ErrorKind::UnknownExtension(other.to_string())),
    })
}

/// Create the named extension and hand it its validated parameters.
pub fn configure(name: &str, raw: Vec<(String, String)>) -> Result<Box<dyn Extension>> {
    let mut extension = create(name)?;
    let params = Params::validate(raw, &extension.params())
        .or_raise(|| ErrorKind::InvalidParameters(name.to_string()))?;
    extension.on_params_passed(&params).or_raise(|| ErrorKind::InvalidParameters(name.to_string()))?;
    tracing::debug!(extension = name, ?params, "Extension configured");
    Ok(extension)
}

/// Resolve one `name[:help|key=value ...]` argument.
pub fn select(argument: &str) -> Result<Selection> {
    let selector: Selector = argument.parse()?;
    match selector.request {
        Request::Help => Ok(Selection::Help(usage(create(&selector.name)?.as_ref()))),
        Request::Configure(raw) => Ok(Selection::Use(configure(&selector.name, raw)?)),
    }
}
