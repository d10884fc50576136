//! # Reinhardt Marshal
//!
//! Declarative field and serializer composition: converts untrusted,
//! loosely-typed input into validated internal values, renders domain objects
//! back into plain structures, and reports validation errors as a tree with
//! field-level granularity.
//!
//! ## Core Concepts
//!
//! - **[`Field`]**: one conversion unit. Resolves absence, null and defaults,
//!   converts input through its [`FieldType`], then runs its validator
//!   pipeline. Renders internal values for output.
//! - **[`Schema`]**: an immutable, assembled set of field templates built from
//!   bases, [`Mixin`]s and its own declarations.
//! - **[`Serializer`]**: the per-request unit. Binds a fresh copy of a schema's
//!   fields to a [`Context`], validates input, renders instances and saves.
//! - **[`ValidationError`]**: the error tree. Leaves are message lists;
//!   composites map field names or list indices to child errors.
//!
//! ## Outcomes
//!
//! Field operations return [`FieldResult`]: a value, a
//! [`FieldError::Invalid`] error tree, or [`FieldError::Skip`], which omits the
//! field without failing.
//!
//! ## Quick Example
//!
//! ```
//! use reinhardt_marshal::{Field, Schema, Serializer, Value, validators};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Appointment")
//!     .field("patient", Field::string().with_validator(validators::max_length(50)))
//!     .field("day", Field::date())
//!     .field("slots", Field::list(Field::integer()).optional())
//!     .build();
//!
//! let mut serializer = Serializer::new(&schema).with_data(Value::from(json!({
//!     "patient": "Ada",
//!     "day": "2024-02-30",
//!     "slots": [1, "two"],
//! })));
//!
//! assert!(!serializer.is_valid());
//! assert_eq!(
//!     serializer.errors().unwrap().to_json(),
//!     json!({"day": ["Invalid date format."], "slots": {"1": ["A valid integer is required."]}})
//! );
//! ```

pub mod config;
pub mod context;
pub mod dates;
pub mod errors;
pub mod field;
pub mod fields;
pub mod orm;
pub mod serializers;
pub mod validators;
pub mod value;

pub use config::{ConfigError, Settings};
pub use context::{Context, Parent};
pub use errors::{
	ErrorPath, FieldError, FieldResult, NON_FIELD_ERRORS, PathSegment, RepresentationError,
	SerializerError, ValidationError,
};
pub use field::{Access, DefaultValue, Field, FieldType, Presence};
pub use serializers::{Mixin, Schema, Serializer};
pub use validators::Validator;
pub use value::{Entity, EnumMember, Map, Value};
