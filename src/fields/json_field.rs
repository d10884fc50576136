use crate::field::FieldType;

/// Passes values through unchanged in both directions
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonField;

impl FieldType for JsonField {
	fn type_name(&self) -> &'static str {
		"json"
	}
}
