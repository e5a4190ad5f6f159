//! The nested values tree backing the generated `values.yaml`.
//!
//! Every invocation of a processor builds its own [`Values`] and only writes
//! below the config key derived from the object's name. Trees built by
//! independent invocations therefore merge by plain deep union, the caller
//! aggregating them does not need to resolve collisions.

use serde::Serialize;
use serde_yaml::{Mapping, Value, mapping::Entry};
use snafu::{OptionExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("value at {path:?} is not a mapping and cannot be descended into"))]
    NotAMapping { path: String },

    #[snafu(display("conflicting values at {path:?} cannot be merged"))]
    MergeConflict { path: String },

    #[snafu(display("key path must contain at least one segment"))]
    EmptyPath,
}

/// A tree of configuration values addressed by string path segments.
///
/// Serializes transparently into the nested mapping expected in a Helm
/// `values.yaml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Values(Mapping);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts `value` at the given path, creating intermediate mappings as
    /// needed.
    ///
    /// Fails if an intermediate segment already holds a non-mapping value,
    /// since silently overwriting it would break another writer's subtree.
    pub fn set_nested<V>(&mut self, path: &[&str], value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        let (leaf, parents) = path.split_last().context(EmptyPathSnafu)?;

        let mut current = &mut self.0;
        let mut walked = Vec::with_capacity(parents.len());
        for segment in parents {
            walked.push(*segment);
            let child = current
                .entry(Value::String((*segment).to_owned()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            current = child.as_mapping_mut().context(NotAMappingSnafu {
                path: walked.join("."),
            })?;
        }

        current.insert(Value::String((*leaf).to_owned()), value.into());
        Ok(())
    }

    pub fn get_nested(&self, path: &[&str]) -> Option<&Value> {
        let (leaf, parents) = path.split_last()?;

        let mut current = &self.0;
        for segment in parents {
            current = current.get(*segment)?.as_mapping()?;
        }
        current.get(*leaf)
    }

    /// Deep union of two trees, used to aggregate the values of independent
    /// invocations.
    ///
    /// Mappings are merged recursively, equal leaves are kept as-is. A clash
    /// between differing leaves (or a leaf and a mapping) is an error, it
    /// means two invocations wrote under the same config key.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        let mut walked = Vec::new();
        merge_mappings(&mut self.0, other.0, &mut walked)
    }
}

fn merge_mappings(base: &mut Mapping, other: Mapping, walked: &mut Vec<String>) -> Result<()> {
    for (key, value) in other {
        let segment = match key.as_str() {
            Some(segment) => segment.to_owned(),
            None => format!("{key:?}"),
        };

        match base.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                walked.push(segment);
                match (slot.get_mut(), value) {
                    (Value::Mapping(base_child), Value::Mapping(other_child)) => {
                        merge_mappings(base_child, other_child, walked)?;
                    }
                    (existing, incoming) => {
                        if *existing != incoming {
                            return MergeConflictSnafu {
                                path: walked.join("."),
                            }
                            .fail();
                        }
                    }
                }
                walked.pop();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_nested_creates_intermediate_mappings() {
        let mut values = Values::new();
        values
            .set_nested(&["appIngress", "ingress", "enabled"], true)
            .unwrap();

        assert_eq!(
            values.get_nested(&["appIngress", "ingress", "enabled"]),
            Some(&Value::Bool(true)),
        );
    }

    #[test]
    fn set_nested_rejects_descending_into_leaf() {
        let mut values = Values::new();
        values.set_nested(&["appIngress", "ingress"], "leaf").unwrap();

        let err = values
            .set_nested(&["appIngress", "ingress", "enabled"], true)
            .unwrap_err();
        assert_eq!(
            err,
            Error::NotAMapping {
                path: "appIngress.ingress".to_owned()
            },
        );
    }

    #[test]
    fn set_nested_rejects_empty_path() {
        let mut values = Values::new();
        assert_eq!(values.set_nested(&[], true).unwrap_err(), Error::EmptyPath);
    }

    #[test]
    fn merge_unions_disjoint_subtrees() {
        let mut left = Values::new();
        left.set_nested(&["appIngress", "ingress", "enabled"], true)
            .unwrap();

        let mut right = Values::new();
        right
            .set_nested(&["metricsIngress", "ingress", "className"], "nginx")
            .unwrap();

        left.merge(right).unwrap();

        assert_eq!(
            left.get_nested(&["appIngress", "ingress", "enabled"]),
            Some(&Value::Bool(true)),
        );
        assert_eq!(
            left.get_nested(&["metricsIngress", "ingress", "className"]),
            Some(&Value::String("nginx".to_owned())),
        );
    }

    #[test]
    fn merge_keeps_equal_leaves() {
        let mut left = Values::new();
        left.set_nested(&["app", "enabled"], true).unwrap();

        let mut right = Values::new();
        right.set_nested(&["app", "enabled"], true).unwrap();

        left.merge(right).unwrap();
        assert_eq!(
            left.get_nested(&["app", "enabled"]),
            Some(&Value::Bool(true)),
        );
    }

    #[test]
    fn merge_detects_leaf_conflicts() {
        let mut left = Values::new();
        left.set_nested(&["app", "className"], "nginx").unwrap();

        let mut right = Values::new();
        right.set_nested(&["app", "className"], "traefik").unwrap();

        let err = left.merge(right).unwrap_err();
        assert_eq!(
            err,
            Error::MergeConflict {
                path: "app.className".to_owned()
            },
        );
    }

    #[test]
    fn serializes_as_plain_nested_mapping() {
        let mut values = Values::new();
        values
            .set_nested(&["appIngress", "ingress", "enabled"], true)
            .unwrap();
        values
            .set_nested(&["appIngress", "ingress", "className"], "nginx")
            .unwrap();

        let yaml = serde_yaml::to_string(&values).unwrap();
        assert_eq!(
            yaml,
            "appIngress:\n  ingress:\n    enabled: true\n    className: nginx\n",
        );
    }
}
