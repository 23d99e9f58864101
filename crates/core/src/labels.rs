//! Ownership labels tying admin API objects to Kubernetes objects.

use std::collections::BTreeMap;
use std::fmt;

/// Label map carried by most resources.
pub type Labels = BTreeMap<String, String>;

/// Label holding the Kubernetes kind of the owning object.
pub const LABEL_KIND: &str = "k8s/kind";
/// Label holding the namespace of the owning object.
pub const LABEL_NAMESPACE: &str = "k8s/namespace";
/// Label holding the name of the owning object.
pub const LABEL_NAME: &str = "k8s/name";

/// The Kubernetes object a resource was created for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl OwnerRef {
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Read the owner back from a label map.
    ///
    /// Returns `None` unless all three ownership labels are present.
    pub fn from_labels(labels: &Labels) -> Option<Self> {
        Some(Self {
            kind: labels.get(LABEL_KIND)?.clone(),
            namespace: labels.get(LABEL_NAMESPACE)?.clone(),
            name: labels.get(LABEL_NAME)?.clone(),
        })
    }

    /// Write the ownership labels into `labels`, replacing previous values.
    pub fn apply(&self, labels: &mut Labels) {
        labels.insert(LABEL_KIND.to_string(), self.kind.clone());
        labels.insert(LABEL_NAMESPACE.to_string(), self.namespace.clone());
        labels.insert(LABEL_NAME.to_string(), self.name.clone());
    }

    /// Key used by the label index: `kind/namespace/name`.
    pub fn index_key(&self) -> String {
        format!("{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.index_key())
    }
}
