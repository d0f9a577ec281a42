use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One class as recorded in a baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSignature {
    /// Internal name, e.g. `java/util/List`.
    pub name: String,
    /// `None` for `java/lang/Object` (and interfaces recorded without one).
    pub superclass_name: Option<String>,
    /// Directly implemented/extended interfaces, in declaration order.
    pub interface_names: Vec<String>,
    /// Members declared directly on this class; see [`crate::member`].
    pub member_signatures: HashSet<String>,
}

impl ClassSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass_name = Some(superclass.into());
        self
    }

    pub fn with_interfaces<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interface_names
            .extend(interfaces.into_iter().map(Into::into));
        self
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.member_signatures
            .extend(members.into_iter().map(Into::into));
        self
    }

    pub fn declares(&self, member: &str) -> bool {
        self.member_signatures.contains(member)
    }

    /// Superclass first, then interfaces in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass_name
            .as_deref()
            .into_iter()
            .chain(self.interface_names.iter().map(String::as_str))
    }
}
