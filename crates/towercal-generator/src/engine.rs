//! Toolpath engine boundary
//!
//! The validated parameter set, derived schedule, and expanded script
//! fragments are bundled into a [`GenerationRequest`] and handed to a
//! [`ToolpathEngine`]. The engine seam is the only suspension point in
//! the pipeline; engines are swappable so the validation and scheduling
//! core tests without one present.

use crate::params::Parameters;
use crate::placeholders::substitute;
use crate::schedule::Segment;
use async_trait::async_trait;
use serde::Serialize;
use towercal_core::EngineError;
use uuid::Uuid;

/// One complete, self-contained generation request.
///
/// Owns its segment schedule; a request is never shared or reused across
/// generations. The script fragments are stored fully expanded.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Request id, for log correlation.
    pub id: Uuid,
    pub parameters: Parameters,
    pub segments: Vec<Segment>,
    /// Start fragment with placeholders already expanded.
    pub start_gcode: String,
    /// End fragment with placeholders already expanded.
    pub end_gcode: String,
}

impl GenerationRequest {
    /// Assemble a request from a validated parameter set and its derived
    /// schedule, expanding placeholders in both script fragments.
    pub fn assemble(parameters: Parameters, segments: Vec<Segment>) -> Self {
        let start_gcode = substitute(&parameters.start_gcode, &parameters);
        let end_gcode = substitute(&parameters.end_gcode, &parameters);
        Self {
            id: Uuid::new_v4(),
            parameters,
            segments,
            start_gcode,
            end_gcode,
        }
    }
}

/// A toolpath engine turns a [`GenerationRequest`] into complete G-code
/// text.
///
/// Generation is a pure, single-shot, idempotent computation; engine
/// failures are surfaced unmodified and never retried.
#[async_trait]
pub trait ToolpathEngine: Send + Sync {
    /// Human-readable engine name, for logs.
    fn name(&self) -> &str;

    /// Generate the complete G-code text for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError>;
}

/// Submit `request` to `engine` and return its G-code or failure.
pub async fn submit(
    engine: &dyn ToolpathEngine,
    request: &GenerationRequest,
) -> Result<String, EngineError> {
    tracing::info!(
        id = %request.id,
        engine = engine.name(),
        segments = request.segments.len(),
        "submitting generation request"
    );
    let result = engine.generate(request).await;
    if let Err(err) = &result {
        tracing::warn!(id = %request.id, error = %err, "generation failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{validate, RawParameters};
    use crate::schedule::interpolate;

    struct RejectingEngine;

    #[async_trait]
    impl ToolpathEngine for RejectingEngine {
        fn name(&self) -> &str {
            "rejecting"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, EngineError> {
            Err(EngineError::Rejected {
                reason: "unsupported configuration".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_engine_failure_passes_through() {
        let params = validate(&RawParameters::default()).unwrap();
        let segments = interpolate(&params).unwrap();
        let request = GenerationRequest::assemble(params, segments);
        let err = submit(&RejectingEngine, &request).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::Rejected {
                reason: "unsupported configuration".to_string()
            }
        );
    }

    #[test]
    fn test_assemble_expands_fragments() {
        let raw = RawParameters {
            start_gcode: "M104 S$HOTTEMP".to_string(),
            end_gcode: "$G29".to_string(),
            ..Default::default()
        };
        let params = validate(&raw).unwrap();
        let segments = interpolate(&params).unwrap();
        let request = GenerationRequest::assemble(params, segments);
        assert_eq!(request.start_gcode, "M104 S240");
        assert_eq!(request.end_gcode, "");
        assert_eq!(request.segments.len(), 10);
    }
}
