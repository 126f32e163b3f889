mod evaluate;
mod health;
mod reference;

pub use evaluate::evaluate_site;
pub use health::health_check;
pub use reference::{reference_status, reload_reference};
