//! Rendering of the shared `metadata:` block of generated templates.

use std::fmt::Write;

use kube::core::DynamicObject;
use serde_yaml::{Mapping, Value};
use snafu::{OptionExt, ResultExt, Snafu};

use crate::{app::AppMeta, values::Values};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("object carries no type information"))]
    MissingTypeMeta,

    #[snafu(display("object has no name"))]
    MissingName,

    #[snafu(display("failed to record annotations in the values tree"))]
    RecordAnnotations { source: crate::values::Error },

    #[snafu(display("failed to write the metadata block"))]
    WriteBlock { source: std::fmt::Error },
}

/// Options controlling how an object's metadata block is rendered.
#[derive(Debug, Default)]
pub struct MetaOptions<'a> {
    /// When set, the object's annotations are written verbatim into the
    /// values tree at this path and the rendered block references them with a
    /// template expression instead of inlining them.
    pub annotations_path: Option<&'a [&'a str]>,
}

/// Renders the `apiVersion`/`kind`/`metadata:` block for a generated
/// template.
///
/// The object name is replaced with a templated full name so the rendered
/// chart follows the Helm release name, and the chart's common labels are
/// pulled in via an include. Requested annotation passthroughs are written to
/// `sink`.
pub fn render_object_meta(
    app: &AppMeta,
    object: &DynamicObject,
    options: &MetaOptions<'_>,
    sink: &mut Values,
) -> Result<String> {
    let types = object.types.as_ref().context(MissingTypeMetaSnafu)?;
    let name = object.metadata.name.as_deref().context(MissingNameSnafu)?;

    let mut block = String::new();
    writeln!(block, "apiVersion: {}", types.api_version).context(WriteBlockSnafu)?;
    writeln!(block, "kind: {}", types.kind).context(WriteBlockSnafu)?;
    writeln!(block, "metadata:").context(WriteBlockSnafu)?;
    writeln!(block, "  name: {}", app.templated_name(name)).context(WriteBlockSnafu)?;
    writeln!(block, "  labels:").context(WriteBlockSnafu)?;
    write!(
        block,
        "  {{{{- include \"{chart}.labels\" . | nindent 4 }}}}",
        chart = app.chart_name()
    )
    .context(WriteBlockSnafu)?;

    if let Some(path) = options.annotations_path {
        let annotations: Mapping = object
            .metadata
            .annotations
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (Value::String(key), Value::String(value)))
            .collect();
        sink.set_nested(path, annotations)
            .context(RecordAnnotationsSnafu)?;

        write!(
            block,
            "\n  annotations:\n    {{{{- toYaml .Values.{path} | nindent 4 }}}}",
            path = path.join(".")
        )
        .context(WriteBlockSnafu)?;
    }

    Ok(block)
}
