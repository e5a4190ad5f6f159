//! Application-level metadata and the naming scheme derived from it.
//!
//! All keys in the generated `values.yaml` and all cross-references between
//! generated templates are derived from object names through [`AppMeta`]. The
//! derivation is pure, so the same manifest always produces the same chart.

use convert_case::{Case, Casing};

/// Prefix commonly carried by objects generated from controller manifests.
/// It is stripped before deriving a values key, it carries no information.
const CONTROLLER_MANAGER_PREFIX: &str = "controller-manager-";

/// Chart-wide metadata shared by all processors of one conversion run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppMeta {
    chart_name: String,
    app_name: String,
}

impl AppMeta {
    pub fn new(chart_name: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            chart_name: chart_name.into(),
            app_name: app_name.into(),
        }
    }

    pub fn chart_name(&self) -> &str {
        &self.chart_name
    }

    /// Strips the application name prefix from a raw object name.
    ///
    /// Object names in operator manifests are usually prefixed with the
    /// application name. The trimmed name is what ends up in filenames and in
    /// templated cross-references, the full name is reconstructed at render
    /// time from the Helm release name.
    pub fn trim_name<'a>(&self, raw_name: &'a str) -> &'a str {
        raw_name
            .strip_prefix(&format!("{}-", self.app_name))
            .unwrap_or(raw_name)
    }

    /// Derives the values key under which all of one object's extracted
    /// configuration is stored.
    ///
    /// Deterministic: the same raw name always yields the same key. Two raw
    /// names only collide if they already collide after prefix trimming,
    /// which is accepted rather than worked around.
    pub fn config_key(&self, raw_name: &str) -> String {
        let trimmed = self.trim_name(raw_name);
        let short = trimmed
            .strip_prefix(CONTROLLER_MANAGER_PREFIX)
            .unwrap_or(trimmed);
        short.to_case(Case::Camel)
    }

    /// Returns a template expression resolving to another generated object's
    /// full name, for rewriting cross-references such as backend services.
    pub fn templated_name(&self, raw_name: &str) -> String {
        format!(
            "{{{{ include \"{chart}.fullname\" . }}}}-{name}",
            chart = self.chart_name,
            name = self.trim_name(raw_name)
        )
    }
}
