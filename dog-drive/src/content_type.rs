use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Returned whenever a path's type can't be determined
pub const UNKNOWN_CONTENT_TYPE: &str = "application/unknown";

/// Extension → MIME lookup backing [`ContentTypes`].
///
/// Keys are lower-cased extensions with their leading dot (`".jpg"`).
pub trait ContentTypeRegistry: Send + Sync {
    fn lookup(&self, extension: &str) -> Option<String>;
}

/// Registry backed by the `mime_guess` tables
#[derive(Debug, Clone, Default)]
pub struct MimeGuessRegistry;

impl ContentTypeRegistry for MimeGuessRegistry {
    fn lookup(&self, extension: &str) -> Option<String> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        mime_guess::from_ext(ext).first_raw().map(str::to_string)
    }
}

/// Registry with an explicit table
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    types: HashMap<String, String>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mime_type` for `extension` (`"PNG"`, `".png"` and `"png"` are equivalent)
    pub fn with<E: AsRef<str>, M: Into<String>>(mut self, extension: E, mime_type: M) -> Self {
        let ext = extension.as_ref().trim_start_matches('.').to_lowercase();
        self.types.insert(format!(".{}", ext), mime_type.into());
        self
    }
}

impl ContentTypeRegistry for StaticRegistry {
    fn lookup(&self, extension: &str) -> Option<String> {
        self.types.get(extension).cloned()
    }
}

/// Resolves a path to a MIME type, never failing
#[derive(Clone)]
pub struct ContentTypes {
    registry: Arc<dyn ContentTypeRegistry>,
}

impl ContentTypes {
    pub fn new<R: ContentTypeRegistry + 'static>(registry: R) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// MIME type for `path`, or [`UNKNOWN_CONTENT_TYPE`]
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> String {
        extension_key(path.as_ref())
            .and_then(|ext| self.registry.lookup(&ext))
            .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string())
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new(MimeGuessRegistry)
    }
}

impl std::fmt::Debug for ContentTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTypes").finish_non_exhaustive()
    }
}

/// Lower-cased extension with its leading dot; `None` when there is none
pub fn extension_key(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}
