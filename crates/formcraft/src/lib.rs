// formcraft - form schemas with derived fields and validation
// Build a schema, save it to a local store, then preview it: input is
// collected, derived fields are recomputed and every field is validated
// before a submission is accepted.

pub mod builder;
pub mod config;
pub mod derive;
pub mod editor;
pub mod error;
pub mod forms_list;
pub mod model;
pub mod preview;
pub mod store;
pub mod validation;
pub mod widget;

// Re-export core types
pub use builder::BuilderState;
pub use config::Config;
pub use derive::{DerivedFields, Settle};
pub use editor::FieldDraft;
pub use error::{BuilderError, FieldError, PreviewError, SchemaError, StoreError};
pub use forms_list::{FormSummary, FormsList};
pub use model::{FieldConfig, FieldType, FormSchema, ValidationRule, Values};
pub use preview::{PreviewSession, PreviewStatus, SubmitOutcome};
pub use store::{FileStore, FormRepository, KeyValueStore, KvFormRepository, MemoryStore, FORMS_KEY};
pub use validation::{validate_field, validate_form, FormErrors};
pub use widget::{Control, Widget};

// Re-export the formula language
pub use formcraft_parser::{ExprError, Formula, Value};
