mod evaluation;
mod reference;

pub use evaluation::EvaluationService;
pub use reference::ReferenceService;
