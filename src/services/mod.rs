pub mod document_renderer;
pub mod record_store;
pub mod template_resolver;

pub use document_renderer::DocumentRenderer;
pub use record_store::RecordStore;
pub use template_resolver::{TemplateResolver, GENERIC_TEMPLATE, NOT_ATTENDING_TEMPLATE};
