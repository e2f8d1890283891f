// The form object: field bookkeeping, naming, composition, rendering and
// validation in one place

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::builder::{FormBuilder, FormDefinition, FormHelper};
use super::collaborators::{
    ErrorBag, MessageMap, RenderContext, RequestSource, ValidationOutcome,
};
use super::composer::{self, ChildForm, CompositionSource};
use super::descriptor::FieldDescriptor;
use super::error::{FormError, FormResult};
use super::naming;
use super::options::{is_truthy, merge_options, option_str, pull_option, Options};
use super::registry::FieldRegistry;
use super::rules::{self, RuleMap};

const DEFAULT_METHOD: &str = "GET";

/// A form: an ordered set of fields plus everything needed to render and
/// validate them.
///
/// Forms are created through [`FormBuilder`](super::FormBuilder). A form
/// with a [`FormDefinition`] rebuilds by replaying `build_form`; a plain
/// form rebuilds by re-adding its existing fields.
pub struct Form {
    helper: Arc<FormHelper>,
    definition: Option<Arc<dyn FormDefinition>>,
    fields: FieldRegistry,
    form_options: Options,
    model: Value,
    name: Option<String>,
    data: Options,
    exclude: Vec<String>,
    errors_enabled: bool,
    client_validation: bool,
    validation: Option<ValidationOutcome>,
    request: Option<Box<dyn RequestSource>>,
    rebuilding: bool,
    /// Names re-added by the current rebuild
    replayed: HashSet<String>,
}

/// State restored when a rebuild fails
struct Checkpoint {
    name: Option<String>,
    model: Value,
    fields: FieldRegistry,
    form_options: Options,
}

impl Form {
    pub fn new(helper: Arc<FormHelper>, definition: Option<Arc<dyn FormDefinition>>) -> Self {
        let mut form_options = Options::new();
        form_options.insert("method".to_string(), json!(DEFAULT_METHOD));
        form_options.insert("url".to_string(), Value::Null);

        Self {
            helper,
            definition,
            fields: FieldRegistry::new(),
            form_options,
            model: Value::Null,
            name: None,
            data: Options::new(),
            exclude: Vec::new(),
            errors_enabled: true,
            client_validation: true,
            validation: None,
            request: None,
            rebuilding: false,
            replayed: HashSet::new(),
        }
    }

    /// Run the definition's build hook. Plain forms have nothing to build.
    pub(crate) fn build_form(&mut self) -> FormResult<()> {
        match self.definition.clone() {
            Some(definition) => definition.build_form(self),
            None => Ok(()),
        }
    }

    /// Rebuild the form so names and values are recomputed.
    ///
    /// Rebuilding never introduces a field that is not already registered.
    /// A failed rebuild leaves the form as it was.
    pub fn rebuild_form(&mut self) -> FormResult<&mut Self> {
        let checkpoint = self.checkpoint();
        self.rebuild_from(checkpoint)?;
        Ok(self)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            name: self.name.clone(),
            model: self.model.clone(),
            fields: self.fields.clone(),
            form_options: self.form_options.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.name = checkpoint.name;
        self.model = checkpoint.model;
        self.fields = checkpoint.fields;
        self.form_options = checkpoint.form_options;
    }

    /// Replay the form against its state before `checkpoint` was taken.
    ///
    /// Fields the replay does not touch (composed or modified after
    /// creation) are moved from the previous form name to the current one.
    fn rebuild_from(&mut self, checkpoint: Checkpoint) -> FormResult<()> {
        if self.fields.is_empty() {
            return Ok(());
        }

        tracing::debug!(form = self.definition_name(), "rebuilding form");
        self.rebuilding = true;
        self.replayed.clear();
        let result = match self.definition.clone() {
            Some(definition) => definition.build_form(self),
            None => self.replay_fields(checkpoint.name.as_deref()),
        };
        self.rebuilding = false;
        let replayed = std::mem::take(&mut self.replayed);

        if let Err(err) = result {
            tracing::debug!(form = self.definition_name(), error = %err, "rebuild failed, restoring form");
            self.restore(checkpoint);
            return Err(err);
        }

        let current = self.name.clone();
        for field in self.fields.iter_mut() {
            if replayed.contains(field.name()) {
                continue;
            }
            let moved = naming::requalify(
                field.qualified_name(),
                checkpoint.name.as_deref(),
                current.as_deref(),
            );
            if let Some(qualified_name) = moved {
                field.set_qualified_name(qualified_name);
            }
        }
        Ok(())
    }

    /// Re-add the fields a plain form declared under its own name; the
    /// rest keep their namespace and are moved afterwards
    fn replay_fields(&mut self, previous_name: Option<&str>) -> FormResult<()> {
        let snapshot: Vec<(String, String, Options)> = self
            .fields
            .iter()
            .filter(|f| f.qualified_name() == naming::qualify(f.name(), previous_name))
            .map(|f| (f.name().to_string(), f.kind().to_string(), f.options().clone()))
            .collect();

        for (name, kind, options) in snapshot {
            self.add_field(&name, &kind, options, true)?;
        }
        Ok(())
    }

    fn make_field(&self, name: &str, kind: &str, options: Options) -> FormResult<FieldDescriptor> {
        let field_type = self.helper.types().resolve(kind)?;

        let mut options = merge_options(&field_type.default_options(), &options);
        if !options.contains_key("label") {
            options.insert("label".to_string(), json!(naming::format_label(name)));
        }

        Ok(FieldDescriptor::new(
            name,
            self.name.as_deref(),
            field_type,
            options,
        ))
    }

    fn ensure_valid_name(&self, name: &str) -> FormResult<()> {
        if name.trim().is_empty() {
            return Err(FormError::InvalidFieldName {
                form: self.definition_name().to_string(),
            });
        }
        Ok(())
    }

    /// While rebuilding, only already registered names may be touched
    fn skipped_by_rebuild(&self, name: &str) -> bool {
        self.rebuilding && !self.fields.has(name)
    }

    fn add_field(&mut self, name: &str, kind: &str, options: Options, modify: bool) -> FormResult<()> {
        self.ensure_valid_name(name)?;
        if self.skipped_by_rebuild(name) {
            return Ok(());
        }

        let descriptor = self.make_field(name, kind, options)?;
        self.push_field(descriptor, modify)
    }

    fn push_field(&mut self, descriptor: FieldDescriptor, modify: bool) -> FormResult<()> {
        if self.skipped_by_rebuild(descriptor.name()) {
            return Ok(());
        }

        let is_file = descriptor.field_type().is_file_upload();
        let name = descriptor.name().to_string();
        self.fields.add(descriptor, modify || self.rebuilding)?;
        self.after_field_added(&name, is_file);
        Ok(())
    }

    /// Splice a field around `anchor`. While rebuilding, a removed anchor
    /// leaves the field where it is.
    fn splice_field(
        &mut self,
        anchor: &str,
        name: &str,
        kind: &str,
        options: Options,
        modify: bool,
        before: bool,
    ) -> FormResult<()> {
        self.ensure_valid_name(name)?;
        if self.skipped_by_rebuild(name) {
            return Ok(());
        }

        let descriptor = self.make_field(name, kind, options)?;
        let is_file = descriptor.field_type().is_file_upload();
        let allow_overwrite = modify || self.rebuilding;
        if self.rebuilding && !self.fields.has(anchor) {
            self.fields.add(descriptor, allow_overwrite)?;
        } else if before {
            self.fields.add_before(anchor, descriptor, allow_overwrite)?;
        } else {
            self.fields.add_after(anchor, descriptor, allow_overwrite)?;
        }
        self.after_field_added(name, is_file);
        Ok(())
    }

    fn after_field_added(&mut self, name: &str, is_file: bool) {
        if self.rebuilding {
            self.replayed.insert(name.to_string());
        }
        if is_file {
            self.form_options.insert("files".to_string(), Value::Bool(true));
        }
    }

    /// Add a field; fails if a field with that name already exists
    pub fn add(&mut self, name: &str, kind: &str, options: Options) -> FormResult<&mut Self> {
        self.add_field(name, kind, options, false)?;
        Ok(self)
    }

    /// Add a field directly before `anchor`
    pub fn add_before(
        &mut self,
        anchor: &str,
        name: &str,
        kind: &str,
        options: Options,
        modify: bool,
    ) -> FormResult<&mut Self> {
        self.splice_field(anchor, name, kind, options, modify, true)?;
        Ok(self)
    }

    /// Add a field directly after `anchor`
    pub fn add_after(
        &mut self,
        anchor: &str,
        name: &str,
        kind: &str,
        options: Options,
        modify: bool,
    ) -> FormResult<&mut Self> {
        self.splice_field(anchor, name, kind, options, modify, false)?;
        Ok(self)
    }

    /// Modify an existing field, or add it when missing.
    ///
    /// Unless `overwrite_options` is set, the new options are merged over
    /// the field's current ones. The field keeps its position.
    pub fn modify(
        &mut self,
        name: &str,
        kind: &str,
        options: Options,
        overwrite_options: bool,
    ) -> FormResult<&mut Self> {
        let options = match self.fields.get(name) {
            Ok(existing) if !overwrite_options => merge_options(existing.options(), &options),
            _ => options,
        };

        self.add_field(name, kind, options, true)?;
        Ok(self)
    }

    pub fn remove(&mut self, name: &str) -> FormResult<&mut Self> {
        self.fields.remove(name)?;
        tracing::debug!(field = name, "removed field");
        Ok(self)
    }

    /// Copy the fields of another form into this one.
    ///
    /// Either every field is added or, on a duplicate, none is.
    pub fn compose(
        &mut self,
        source: impl Into<CompositionSource>,
        options: Options,
        modify: bool,
    ) -> FormResult<&mut Self> {
        let descriptors = composer::collect_fields(self, source.into(), options)?;

        if !modify && !self.rebuilding {
            if let Some(duplicate) = descriptors.iter().find(|d| self.fields.has(d.name())) {
                return Err(FormError::DuplicateField {
                    name: duplicate.name().to_string(),
                });
            }
        }

        for descriptor in descriptors {
            self.push_field(descriptor, modify)?;
        }
        Ok(self)
    }

    /// Create the form registered under `id` as a child standing for
    /// `field_name` of this form: inside `user` its fields come out as
    /// `user[field_name][...]`
    pub fn child_form(&self, id: &str, field_name: &str, options: Options) -> FormResult<ChildForm> {
        let child_name = naming::qualify(field_name, self.get_name());
        FormBuilder::from_helper(self.helper.clone()).child_form(id, &child_name, options)
    }

    /// Skip these fields when rendering
    pub fn exclude(&mut self, names: &[&str]) -> &mut Self {
        self.exclude.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclude
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == name)
    }

    pub fn get_field(&self, name: &str) -> FormResult<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.has(name)
    }

    pub fn get_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.all()
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn disable_fields(&mut self) -> &mut Self {
        for field in self.fields.iter_mut() {
            field.set_disabled(true);
        }
        self
    }

    pub fn enable_fields(&mut self) -> &mut Self {
        for field in self.fields.iter_mut() {
            field.set_disabled(false);
        }
        self
    }

    // Options

    pub fn get_form_options(&self) -> &Options {
        &self.form_options
    }

    pub fn get_form_option(&self, key: &str) -> Option<&Value> {
        self.form_options.get(key)
    }

    pub fn set_form_option(&mut self, key: &str, value: Value) -> &mut Self {
        self.form_options.insert(key.to_string(), value);
        self
    }

    /// Merge options into the form options.
    ///
    /// `model`, `data`, `errors_enabled`, `client_validation` and `name` are
    /// pulled out and applied to the form instead of being stored.
    pub fn set_form_options(&mut self, options: Options) -> FormResult<&mut Self> {
        let mut merged = merge_options(&self.form_options, &options);

        let name = pull_option(&mut merged, "name");
        let model = pull_option(&mut merged, "model");
        let data = pull_option(&mut merged, "data");
        let errors_enabled = pull_option(&mut merged, "errors_enabled");
        let client_validation = pull_option(&mut merged, "client_validation");
        self.form_options = merged;

        if let Some(Value::Object(data)) = data {
            self.add_data(data);
        }
        if let Some(enabled) = errors_enabled {
            self.errors_enabled = is_truthy(&enabled);
        }
        if let Some(enabled) = client_validation {
            self.client_validation = is_truthy(&enabled);
        }
        if let Some(name) = name.as_ref().and_then(Value::as_str) {
            if self.name.as_deref() != Some(name) {
                self.set_name(name)?;
            }
        }
        if let Some(model) = model {
            self.set_model(model)?;
        }

        Ok(self)
    }

    pub fn get_method(&self) -> &str {
        option_str(&self.form_options, "method").unwrap_or(DEFAULT_METHOD)
    }

    pub fn set_method(&mut self, method: &str) -> &mut Self {
        self.set_form_option("method", json!(method))
    }

    pub fn get_url(&self) -> Option<&str> {
        option_str(&self.form_options, "url")
    }

    pub fn set_url(&mut self, url: &str) -> &mut Self {
        self.set_form_option("url", json!(url))
    }

    /// Template id: the `template` option, else the configured default
    pub fn template_id(&self) -> String {
        option_str(&self.form_options, "template")
            .map(str::to_string)
            .unwrap_or_else(|| self.helper.settings().form_template.clone())
    }

    // Naming and model

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name the form; every field name is namespaced under it
    pub fn set_name(&mut self, name: &str) -> FormResult<&mut Self> {
        let checkpoint = self.checkpoint();
        self.name = Some(name.to_string());
        self.setup_named_model();
        self.rebuild_from(checkpoint)?;
        Ok(self)
    }

    pub fn get_model(&self) -> &Value {
        &self.model
    }

    pub fn set_model(&mut self, model: Value) -> FormResult<&mut Self> {
        let checkpoint = self.checkpoint();
        self.model = model;
        self.setup_named_model();
        self.rebuild_from(checkpoint)?;
        Ok(self)
    }

    /// Bind any serializable value as the model
    pub fn bind_model<T: Serialize>(&mut self, model: &T) -> FormResult<&mut Self> {
        let model = serde_json::to_value(model)?;
        self.set_model(model)
    }

    fn setup_named_model(&mut self) {
        let Some(name) = self.name.as_deref() else {
            return;
        };
        if naming::is_empty_model(&self.model) {
            return;
        }

        if let Some(mapping) = self.helper.model_adapter().to_mapping(&self.model) {
            self.model = naming::wrap_model(Value::Object(mapping), name);
        }
    }

    /// Value shown for a field: explicit `value` option, then the bound
    /// model, then `default_value`
    pub fn field_value(&self, field: &FieldDescriptor) -> Option<Value> {
        if let Some(value) = field.option("value").filter(|v| !v.is_null()) {
            return Some(value.clone());
        }

        let from_model = self
            .model
            .as_object()
            .and_then(|model| naming::lookup_path(model, field.qualified_name()))
            .filter(|v| !v.is_null());
        if let Some(value) = from_model {
            return Some(value.clone());
        }

        field.option("default_value").filter(|v| !v.is_null()).cloned()
    }

    // Extra data

    pub fn set_data(&mut self, name: &str, value: Value) -> &mut Self {
        self.data.insert(name.to_string(), value);
        self
    }

    pub fn add_data(&mut self, data: Options) -> &mut Self {
        for (name, value) in data {
            self.data.insert(name, value);
        }
        self
    }

    pub fn get_data(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn data(&self) -> &Options {
        &self.data
    }

    // Flags

    pub fn have_errors_enabled(&self) -> bool {
        self.errors_enabled
    }

    pub fn set_errors_enabled(&mut self, enabled: bool) -> &mut Self {
        self.errors_enabled = enabled;
        self
    }

    pub fn client_validation_enabled(&self) -> bool {
        self.client_validation
    }

    pub fn set_client_validation_enabled(&mut self, enabled: bool) -> &mut Self {
        self.client_validation = enabled;
        self
    }

    // Rendering

    /// Render the whole form
    pub fn render_form(
        &mut self,
        options: Options,
        show_start: bool,
        show_fields: bool,
        show_end: bool,
    ) -> FormResult<String> {
        let names = self.fields.names().into_iter().map(str::to_string).collect();
        self.render(options, names, show_start, show_fields, show_end)
    }

    /// Render every field not rendered yet, without the form start tag
    pub fn render_rest(&mut self, show_end: bool, show_fields: bool) -> FormResult<String> {
        let names = self.unrendered_names();
        self.render(Options::new(), names, false, show_fields, show_end)
    }

    /// Render the unrendered fields up to and including `field_name`
    pub fn render_until(
        &mut self,
        field_name: &str,
        show_end: bool,
        show_fields: bool,
    ) -> FormResult<String> {
        let mut names = self.unrendered_names();
        if let Some(pos) = names.iter().position(|n| n == field_name) {
            names.truncate(pos + 1);
        }
        self.render(Options::new(), names, false, show_fields, show_end)
    }

    pub fn render_all(&mut self) -> FormResult<String> {
        self.render_form(Options::new(), true, true, true)
    }

    pub fn render_remaining(&mut self, until: Option<&str>) -> FormResult<String> {
        match until {
            Some(field_name) => self.render_until(field_name, true, true),
            None => self.render_rest(true, true),
        }
    }

    fn unrendered_names(&self) -> Vec<String> {
        self.fields
            .unrendered()
            .into_iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    fn render(
        &mut self,
        options: Options,
        names: Vec<String>,
        show_start: bool,
        show_fields: bool,
        show_end: bool,
    ) -> FormResult<String> {
        self.setup_named_model();
        let template = self.template_id();

        let markup = {
            let fields: Vec<&FieldDescriptor> = names
                .iter()
                .filter_map(|name| self.fields.get(name).ok())
                .collect();
            let context = RenderContext {
                form_options: merge_options(&self.form_options, &options),
                fields,
                model: &self.model,
                exclude: &self.exclude,
                show_start,
                show_fields,
                show_end,
                form: &*self,
            };

            self.helper
                .renderer()
                .render(&template, &context)
                .map_err(FormError::Render)?
        };

        let mut rendered = 0;
        for name in &names {
            if self.is_excluded(name) {
                continue;
            }
            if let Some(field) = self.fields.get_mut(name) {
                field.set_rendered(true);
                rendered += 1;
            }
        }

        tracing::debug!(template = %template, fields = rendered, "rendered form");
        Ok(markup)
    }

    // Validation

    /// Provide the submitted input used by `validate`
    pub fn set_request(&mut self, request: impl RequestSource + 'static) -> &mut Self {
        self.request = Some(Box::new(request));
        self
    }

    /// Field rules merged with `overrides`, without validating
    pub fn get_rules(&self, overrides: &RuleMap) -> RuleMap {
        rules::merge_overrides(rules::aggregate(&self.fields).rules, overrides)
    }

    /// Validate the request input against the field rules.
    ///
    /// `overrides` replace field-declared rules with the same name. The
    /// outcome is cached for `is_valid` and `get_errors`.
    pub fn validate(
        &mut self,
        overrides: &RuleMap,
        messages: &MessageMap,
    ) -> FormResult<&ValidationOutcome> {
        let aggregated = rules::aggregate(&self.fields);
        let rules = rules::merge_overrides(aggregated.rules, overrides);
        let input = self
            .request
            .as_ref()
            .map(|request| request.all_inputs())
            .unwrap_or_default();

        let outcome = self
            .helper
            .validator()
            .make(&input, &rules, messages, &aggregated.attributes)
            .map_err(FormError::Validation)?;

        tracing::debug!(
            form = self.definition_name(),
            rules = rules.len(),
            failed = outcome.fails(),
            "validated form"
        );
        Ok(self.validation.insert(outcome))
    }

    /// Validate with the field rules unless a validation already ran
    pub fn is_valid(&mut self) -> FormResult<bool> {
        if let Some(outcome) = &self.validation {
            return Ok(outcome.passes());
        }
        let outcome = self.validate(&RuleMap::new(), &MessageMap::new())?;
        Ok(outcome.passes())
    }

    pub fn get_errors(&self) -> FormResult<&ErrorBag> {
        self.validation
            .as_ref()
            .map(ValidationOutcome::messages)
            .ok_or_else(|| FormError::NotValidated(self.definition_name().to_string()))
    }

    /// Last validation outcome, if any
    pub fn validation(&self) -> Option<&ValidationOutcome> {
        self.validation.as_ref()
    }

    pub fn helper(&self) -> &Arc<FormHelper> {
        &self.helper
    }

    pub fn definition_name(&self) -> &str {
        self.definition
            .as_ref()
            .map(|definition| definition.definition_name())
            .unwrap_or("Form")
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("definition", &self.definition_name())
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("form_options", &self.form_options)
            .field("model", &self.model)
            .field("exclude", &self.exclude)
            .finish()
    }
}
