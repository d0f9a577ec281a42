use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::BaselineError;
use crate::persist;
use crate::signature::ClassSignature;

/// Read-only mapping from internal class name to [`ClassSignature`].
///
/// The index is immutable once built, so a single instance can be shared by
/// any number of checkers (it is `Send + Sync`).
#[derive(Debug, Default, Clone)]
pub struct SignatureIndex {
    classes: HashMap<String, ClassSignature>,
}

impl SignatureIndex {
    /// Decode a baseline stream (see [`crate::SignatureWriter`] for the format).
    pub fn load<R: Read>(reader: R) -> Result<Self, BaselineError> {
        let mut classes = HashMap::new();
        let read = persist::read_records(reader, |class| {
            if let Some(previous) = classes.insert(class.name.clone(), class) {
                tracing::warn!(
                    class = %previous.name,
                    "duplicate class in signature baseline; keeping the later record"
                );
            }
        })?;

        tracing::debug!(records = read, classes = classes.len(), "loaded signature baseline");
        Ok(Self { classes })
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, BaselineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        tracing::debug!(path = %path.display(), "reading signature baseline");
        Self::load(file)
    }

    /// Build an index directly from records; later duplicates replace earlier ones.
    pub fn from_signatures(signatures: impl IntoIterator<Item = ClassSignature>) -> Self {
        Self {
            classes: signatures
                .into_iter()
                .map(|class| (class.name.clone(), class))
                .collect(),
        }
    }

    /// Exact lookup by internal name. Unknown classes are an expected outcome.
    pub fn lookup(&self, class_name: &str) -> Option<&ClassSignature> {
        self.classes.get(class_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassSignature> {
        self.classes.values()
    }
}

impl FromIterator<ClassSignature> for SignatureIndex {
    fn from_iter<T: IntoIterator<Item = ClassSignature>>(iter: T) -> Self {
        Self::from_signatures(iter)
    }
}
