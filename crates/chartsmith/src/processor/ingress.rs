//! Conversion rule for `networking.k8s.io/v1` Ingress objects.

use k8s_openapi::api::networking::v1::{Ingress, IngressSpec};
use kube::{
    Resource, ResourceExt,
    core::{DynamicObject, TypeMeta},
};
use serde::Serialize;
use snafu::ResultExt;

use super::{
    AssembleSnafu, ConvertSnafu, Processor, RecordValueSnafu, RenderMetadataSnafu, Result,
    SerializeSpecSnafu, TemplateResult,
};
use crate::{
    app::AppMeta,
    meta::{self, MetaOptions},
    template::{ResourceBlocks, TemplateAssembler},
    values::Values,
};

/// Wraps the templatized spec under its single top-level key for
/// serialization.
#[derive(Serialize)]
struct SpecDocument<'a> {
    spec: &'a IngressSpec,
}

/// Converts an Ingress into a template guarded by
/// `<configKey>.ingress.enabled`, with its class name and annotations
/// extracted into the values tree and all backend service references
/// rewritten to templated names.
#[derive(Debug, Default)]
pub struct IngressProcessor;

impl Processor for IngressProcessor {
    fn matches(&self, types: &TypeMeta) -> bool {
        types.api_version == Ingress::api_version(&()) && types.kind == Ingress::kind(&())
    }

    fn process(
        &self,
        app: &AppMeta,
        assembler: &TemplateAssembler,
        object: &DynamicObject,
    ) -> Result<TemplateResult> {
        let mut ingress: Ingress = object.to_owned().try_parse().context(ConvertSnafu {
            kind: Ingress::kind(&()),
        })?;

        let raw_name = object.name_any();
        let name = app.trim_name(&raw_name).to_owned();
        let config_key = app.config_key(&raw_name);
        tracing::debug!(%name, %config_key, "converting ingress object");

        let mut values = Values::new();
        values
            .set_nested(&[&config_key, "ingress", "enabled"], true)
            .context(RecordValueSnafu)?;

        let annotations_path = [config_key.as_str(), "ingress", "annotations"];
        let metadata = meta::render_object_meta(
            app,
            object,
            &MetaOptions {
                annotations_path: Some(&annotations_path),
            },
            &mut values,
        )
        .context(RenderMetadataSnafu)?;

        // The Go type always carries a spec struct, mirror that here so the
        // class name rewrite applies even to a spec-less document.
        let spec = ingress.spec.get_or_insert_with(IngressSpec::default);
        templatize_backends(app, spec);
        capture_class_name(&config_key, spec, &mut values).context(RecordValueSnafu)?;

        let spec_block =
            serde_yaml::to_string(&SpecDocument { spec }).context(SerializeSpecSnafu)?;

        let content = assembler
            .assemble(&ResourceBlocks {
                conditional_open: format!("{{{{- if .Values.{config_key}.ingress.enabled }}}}"),
                metadata,
                spec: spec_block.trim_end().to_owned(),
                conditional_close: "{{- end }}".to_owned(),
            })
            .context(AssembleSnafu)?;

        Ok(TemplateResult {
            filename: format!("{name}.yaml"),
            content,
            values,
        })
    }
}

/// Rewrites every backend service reference, in the default backend and in
/// every path of every rule, to a templated cross-reference. Absent backends,
/// rule values or paths are left untouched.
fn templatize_backends(app: &AppMeta, spec: &mut IngressSpec) {
    if let Some(service) = spec
        .default_backend
        .as_mut()
        .and_then(|backend| backend.service.as_mut())
    {
        service.name = app.templated_name(&service.name);
    }

    for rule in spec.rules.iter_mut().flatten() {
        let Some(http) = rule.http.as_mut() else {
            continue;
        };
        for path in &mut http.paths {
            if let Some(service) = path.backend.service.as_mut() {
                service.name = app.templated_name(&service.name);
            }
        }
    }
}

/// Captures the concrete class name (or the empty string if none is set) as
/// the values default, then unconditionally replaces the field with the
/// template expression referencing it.
fn capture_class_name(
    config_key: &str,
    spec: &mut IngressSpec,
    values: &mut Values,
) -> std::result::Result<(), crate::values::Error> {
    let class_name = spec.ingress_class_name.clone().unwrap_or_default();
    values.set_nested(&[config_key, "ingress", "className"], class_name)?;

    spec.ingress_class_name = Some(format!(
        "{{{{ .Values.{config_key}.ingress.className }}}}"
    ));
    Ok(())
}
