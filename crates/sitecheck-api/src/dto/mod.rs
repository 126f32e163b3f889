mod request;
mod response;

pub use request::EvaluateRequest;
pub use response::{
    DatasetStatus, EvaluateResponse, HealthResponse, ReferenceStatusResponse, ReloadResponse,
};
