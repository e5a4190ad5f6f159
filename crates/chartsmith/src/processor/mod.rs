//! Conversion rules ("processors") and the dispatch over them.
//!
//! A processor handles exactly one resource kind. The dispatcher walks the
//! processors in a fixed order and hands the object to the first one whose
//! applicability check accepts it; an object no processor matches is skipped,
//! which is not an error.

use kube::{
    ResourceExt,
    core::{DynamicObject, TypeMeta},
};
use snafu::Snafu;

use crate::{app::AppMeta, template::TemplateAssembler, values::Values};

pub mod ingress;

pub use ingress::IngressProcessor;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    /// The applicability check accepted the kind but the body does not have
    /// the expected shape, so the document itself is malformed.
    #[snafu(display("failed to parse object as {kind}"))]
    Convert {
        source: kube::core::dynamic::ParseDynamicObjectError,
        kind: String,
    },

    #[snafu(display("failed to render the object metadata block"))]
    RenderMetadata { source: crate::meta::Error },

    #[snafu(display("failed to record an extracted value"))]
    RecordValue { source: crate::values::Error },

    #[snafu(display("failed to serialize the templatized spec"))]
    SerializeSpec { source: serde_yaml::Error },

    #[snafu(display("failed to assemble the resource template"))]
    Assemble { source: crate::template::Error },
}

/// One generated chart artifact: the template file plus the values extracted
/// for it.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateResult {
    pub filename: String,
    pub content: String,
    pub values: Values,
}

/// A conversion rule for one resource kind.
pub trait Processor {
    /// Whether this processor handles objects of the given type. Pure, no
    /// side effects.
    fn matches(&self, types: &TypeMeta) -> bool;

    /// Converts the object into a template and its extracted values. Must
    /// only be called for objects whose type [`Self::matches`] accepted.
    fn process(
        &self,
        app: &AppMeta,
        assembler: &TemplateAssembler,
        object: &DynamicObject,
    ) -> Result<TemplateResult>;
}

/// The processors tried for each object, in dispatch order.
pub fn default_processors() -> Vec<Box<dyn Processor>> {
    vec![Box::new(IngressProcessor)]
}

/// Runs `object` through the first matching processor.
///
/// Returns `Ok(None)` when no processor applies, callers continue with the
/// next object in that case.
pub fn process_object(
    processors: &[Box<dyn Processor>],
    app: &AppMeta,
    assembler: &TemplateAssembler,
    object: &DynamicObject,
) -> Result<Option<TemplateResult>> {
    let Some(types) = &object.types else {
        tracing::debug!(
            name = %object.name_any(),
            "object carries no type information, skipping"
        );
        return Ok(None);
    };

    for processor in processors {
        if processor.matches(types) {
            return processor.process(app, assembler, object).map(Some);
        }
    }

    tracing::debug!(
        kind = %types.kind,
        api_version = %types.api_version,
        name = %object.name_any(),
        "no processor matches object type, skipping"
    );
    Ok(None)
}
