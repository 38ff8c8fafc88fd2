//! Resolution of the detection service's loosely shaped response.

use crate::WorkflowOutput;
use serde_json::Value;

/// The three shapes the service has been observed to return, resolved once at
/// the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResponse {
    /// `{ "outputs": [ { ... }, ... ] }`
    Wrapped(WorkflowOutput),
    /// `[ { ... }, ... ]`
    BareList(WorkflowOutput),
    /// Anything else, including an empty `outputs` list.
    Empty,
}

impl DetectionResponse {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut object) => match object.remove("outputs") {
                Some(Value::Array(outputs)) => {
                    first_output(outputs).map_or(Self::Empty, Self::Wrapped)
                }
                _ => Self::Empty,
            },
            Value::Array(items) => first_output(items).map_or(Self::Empty, Self::BareList),
            _ => Self::Empty,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }

    pub fn output(&self) -> Option<&WorkflowOutput> {
        match self {
            Self::Wrapped(output) | Self::BareList(output) => Some(output),
            Self::Empty => None,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Wrapped(_) => "wrapped",
            Self::BareList(_) => "bare list",
            Self::Empty => "empty",
        }
    }
}

fn first_output(items: Vec<Value>) -> Option<WorkflowOutput> {
    let first = items.into_iter().next()?;
    match serde_json::from_value(first) {
        Ok(output) => Some(output),
        Err(err) => {
            log::warn!("Ignoring malformed workflow output: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrapped_outputs_take_first_entry() {
        let response = DetectionResponse::from_value(json!({
            "outputs": [
                { "count_objects": 3 },
                { "count_objects": 99 }
            ]
        }));
        assert_eq!(response.shape(), "wrapped");
        assert_eq!(response.output().and_then(|o| o.count_objects), Some(3));
    }

    #[test]
    fn bare_list_is_recognised() {
        let response = DetectionResponse::from_value(json!([{ "count_objects": "5" }]));
        assert_eq!(response.shape(), "bare list");
        assert_eq!(response.output().and_then(|o| o.count_objects), Some(5));
    }

    #[test]
    fn other_shapes_are_empty() {
        for value in [
            json!({}),
            json!({ "outputs": [] }),
            json!({ "outputs": "nope" }),
            json!([]),
            json!(null),
            json!("text"),
            json!([42]),
        ] {
            assert_eq!(DetectionResponse::from_value(value), DetectionResponse::Empty);
        }
    }

    #[test]
    fn malformed_nested_fields_degrade() {
        let response = DetectionResponse::from_value(json!({
            "outputs": [{
                "count_objects": 2,
                "output_image": 17,
                "predictions": { "predictions": "not a list" }
            }]
        }));
        let output = response.output().expect("wrapped output");
        assert_eq!(output.count_objects, Some(2));
        assert_eq!(output.output_image, None);
        assert_eq!(
            output.predictions.as_ref().and_then(|p| p.predictions.as_ref()),
            None
        );
    }

    #[test]
    fn from_slice_rejects_invalid_json() {
        assert!(DetectionResponse::from_slice(b"{not json").is_err());
        assert_eq!(
            DetectionResponse::from_slice(b"{}").ok(),
            Some(DetectionResponse::Empty)
        );
    }
}
