// Form definition core
//
// Forms accumulate named, typed fields in an ordered registry, namespace
// them under the form name, merge in fields from other forms and derive
// validation rules from field options. Rendering and validation are
// delegated to the `Renderer` and `Validator` collaborators.

mod builder;
mod collaborators;
mod composer;
mod controller;
mod descriptor;
mod error;
mod field_type;
mod input;
pub mod naming;
pub mod options;
mod registry;
pub mod rules;

pub use builder::{FormBuilder, FormDefinition, FormHelper};
pub use collaborators::{
    ErrorBag, JsonModelAdapter, MessageMap, ModelAdapter, RenderContext, Renderer, RequestSource,
    ValidationOutcome, Validator,
};
pub use composer::{ChildForm, CompositionSource};
pub use controller::Form;
pub use descriptor::FieldDescriptor;
pub use error::{FormError, FormResult};
pub use field_type::{FieldType, FieldTypeRegistry, TypeResolver, Widget};
pub use input::FormInput;
pub use options::{options, Options};
pub use registry::FieldRegistry;
pub use rules::{rule_map, AggregatedRules, AttributeMap, RuleMap};
