//! Converts deployed Kubernetes resources into Helm chart artifacts.
//!
//! Each supported resource kind is handled by a [`processor::Processor`]: the
//! processor checks whether it applies to a given object, projects the object
//! into its typed form, rewrites environment-specific fields into template
//! expressions and returns the final template text together with the values
//! extracted for it. Values from independent objects live under disjoint,
//! name-derived keys so they can be merged into a single `values.yaml` without
//! collision.

pub mod app;
pub mod meta;
pub mod processor;
pub mod template;
pub mod values;

// External re-exports
pub use k8s_openapi;
pub use kube;
