use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::convert::DocumentConverter;
use crate::structuring::RecordStructurer;

/// Shared state handed to the batch pipeline.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Model-backed in production; tests plug in a canned structurer.
    pub structurer: Arc<dyn RecordStructurer>,
    /// `None` when conversion is disabled or the converter binary is missing.
    /// DOCX is then read natively and `.doc` fails per document.
    pub converter: Option<Arc<dyn DocumentConverter>>,
}
