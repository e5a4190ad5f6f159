//! Assembly of the final template text from its fixed blocks.

use serde::Serialize;
use snafu::{ResultExt, Snafu};
use tera::Tera;

/// The fixed structure every generated resource template follows: an enable
/// conditional around the metadata block and the templatized spec.
const RESOURCE_TEMPLATE_NAME: &str = "resource";
const RESOURCE_TEMPLATE: &str = "{{ conditional_open }}\n{{ metadata }}\n{{ spec }}\n{{ conditional_close }}";

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse the fixed resource template"))]
    ParseTemplate { source: tera::Error },

    #[snafu(display("failed to build the template context"))]
    BuildContext { source: tera::Error },

    #[snafu(display("failed to render the resource template"))]
    RenderTemplate { source: tera::Error },
}

/// The four text blocks a resource template is assembled from, in output
/// order.
#[derive(Debug, Serialize)]
pub struct ResourceBlocks {
    pub conditional_open: String,
    pub metadata: String,
    pub spec: String,
    pub conditional_close: String,
}

/// Renders resource templates from their four fixed blocks.
///
/// The underlying template is parsed exactly once, when the assembler is
/// constructed. Afterwards the assembler is immutable and can be shared
/// across concurrent invocations.
#[derive(Debug)]
pub struct TemplateAssembler {
    engine: Tera,
}

impl TemplateAssembler {
    pub fn new() -> Result<Self> {
        let mut engine = Tera::default();
        engine
            .add_raw_template(RESOURCE_TEMPLATE_NAME, RESOURCE_TEMPLATE)
            .context(ParseTemplateSnafu)?;
        Ok(Self { engine })
    }

    /// Joins the blocks into the final template text.
    ///
    /// Block contents are inserted verbatim, Helm expressions inside them are
    /// not interpreted here.
    pub fn assemble(&self, blocks: &ResourceBlocks) -> Result<String> {
        let context = tera::Context::from_serialize(blocks).context(BuildContextSnafu)?;
        self.engine
            .render(RESOURCE_TEMPLATE_NAME, &context)
            .context(RenderTemplateSnafu)
    }
}
