//! Virtual fields: computed at read time by a resolver, never stored
//!
//! The only build-time concern is the admin UI. A field whose output is not a
//! leaf type, or which takes required arguments, cannot be fetched by the admin
//! UI without an explicit selection, so it must either carry `ui.query` or be
//! hidden from both admin views.

use crate::error::{ResolveError, SchemaError, SchemaResult};
use crate::relationship::FieldPath;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// Named type at the core of an output type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedType {
    Scalar(String),
    Enum(String),
    Object(String),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(name) | NamedType::Enum(name) | NamedType::Object(name) => name,
        }
    }
}

/// Output type of a virtual field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputType {
    pub named: NamedType,
    pub list: bool,
    pub non_null: bool,
}

impl OutputType {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::named(NamedType::Scalar(name.into()))
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::named(NamedType::Enum(name.into()))
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::named(NamedType::Object(name.into()))
    }

    fn named(named: NamedType) -> Self {
        Self {
            named,
            list: false,
            non_null: false,
        }
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    /// Scalars and enums can be selected without a sub-selection
    pub fn is_leaf(&self) -> bool {
        matches!(self.named, NamedType::Scalar(_) | NamedType::Enum(_))
    }
}

/// Type of a resolver argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputType {
    pub name: String,
    pub non_null: bool,
}

/// Argument accepted by a virtual field
#[derive(Debug, Clone, PartialEq)]
pub struct ArgDefinition {
    pub name: String,
    pub ty: InputType,
    pub default_value: Option<Value>,
}

impl ArgDefinition {
    pub fn optional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: InputType {
                name: type_name.into(),
                non_null: false,
            },
            default_value: None,
        }
    }

    pub fn non_null(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            ty: InputType {
                name: type_name.into(),
                non_null: true,
            },
            ..Self::optional(name, "")
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Non-null without a default: callers must always pass it
    pub fn is_required(&self) -> bool {
        self.ty.non_null && self.default_value.is_none()
    }
}

/// Admin UI visibility of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    Edit,
    #[default]
    Read,
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualFieldUi {
    /// Selection appended to the field in admin queries, e.g. `{ name }`
    pub query: Option<String>,
    pub item_view: FieldMode,
    pub list_view: FieldMode,
}

pub type Resolver = Arc<dyn Fn(&Value, &Map<String, Value>) -> Result<Value, ResolveError> + Send + Sync>;

/// Declaration of a virtual field
#[derive(Clone)]
pub struct VirtualFieldConfig {
    pub output: OutputType,
    pub args: Vec<ArgDefinition>,
    pub ui: VirtualFieldUi,
    resolver: Resolver,
}

impl VirtualFieldConfig {
    pub fn new<F>(output: OutputType, resolver: F) -> Self
    where
        F: Fn(&Value, &Map<String, Value>) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Self {
            output,
            args: Vec::new(),
            ui: VirtualFieldUi::default(),
            resolver: Arc::new(resolver),
        }
    }

    pub fn arg(mut self, arg: ArgDefinition) -> Self {
        self.args.push(arg);
        self
    }

    pub fn ui_query(mut self, query: impl Into<String>) -> Self {
        self.ui.query = Some(query.into());
        self
    }

    pub fn item_view(mut self, mode: FieldMode) -> Self {
        self.ui.item_view = mode;
        self
    }

    pub fn list_view(mut self, mode: FieldMode) -> Self {
        self.ui.list_view = mode;
        self
    }

    /// Hide the field from both admin views
    pub fn hidden(self) -> Self {
        self.item_view(FieldMode::Hidden).list_view(FieldMode::Hidden)
    }
}

impl fmt::Debug for VirtualFieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFieldConfig")
            .field("output", &self.output)
            .field("args", &self.args)
            .field("ui", &self.ui)
            .finish()
    }
}

/// A compiled virtual field
#[derive(Debug, Clone)]
pub struct VirtualField {
    field_path: FieldPath,
    config: VirtualFieldConfig,
}

impl VirtualField {
    pub(crate) fn build(field_path: FieldPath, config: VirtualFieldConfig) -> SchemaResult<Self> {
        let needs_selection = !config.output.is_leaf() || config.args.iter().any(ArgDefinition::is_required);
        let both_hidden = config.ui.item_view == FieldMode::Hidden && config.ui.list_view == FieldMode::Hidden;
        let query_missing = config.ui.query.as_deref().map_or(true, str::is_empty);

        if needs_selection && query_missing && !both_hidden {
            return Err(SchemaError::VirtualFieldRequiresUiQuery {
                message: missing_ui_query_message(&field_path),
                field_path: field_path.to_string(),
            });
        }

        Ok(Self { field_path, config })
    }

    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    pub fn output(&self) -> &OutputType {
        &self.config.output
    }

    pub fn args(&self) -> &[ArgDefinition] {
        &self.config.args
    }

    pub fn has_required_args(&self) -> bool {
        self.config.args.iter().any(ArgDefinition::is_required)
    }

    /// Run the resolver. Arguments missing from `args` fall back to their defaults.
    pub fn resolve(&self, item: &Value, args: &Map<String, Value>) -> Result<Value, ResolveError> {
        let mut effective = args.clone();
        for arg in &self.config.args {
            if effective.contains_key(&arg.name) {
                continue;
            }
            match &arg.default_value {
                Some(default) => {
                    effective.insert(arg.name.clone(), default.clone());
                }
                None if arg.ty.non_null => {
                    return Err(ResolveError::new(format!(
                        "Missing required argument \"{}\" for {}",
                        arg.name, self.field_path
                    )));
                }
                None => {}
            }
        }
        (self.config.resolver)(item, &effective)
    }

    /// Metadata the admin UI needs to fetch this field
    pub fn admin_meta(&self) -> Value {
        json!({ "query": self.config.ui.query.clone().unwrap_or_default() })
    }
}

/// Query name used by the admin UI to fetch one item: the list key with a
/// lowercase first letter.
pub fn item_query_name(list_key: &str) -> String {
    let mut chars = list_key.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn missing_ui_query_message(field_path: &FieldPath) -> String {
    format!(
        "The virtual field at {path} requires a selection for the Admin UI but ui.query is unspecified \
         and the item view and list view field modes are not both set to hidden.\n\
         Either set ui.query with what the Admin UI should fetch or hide the field from the Admin UI \
         by setting both field modes to hidden.\n\
         When setting ui.query, it is interpolated into a GraphQL query like this:\n\
         query {{\n  {query_name}(where: {{ id: \"...\" }}) {{\n    {field}${{ui.query}}\n  }}\n}}",
        path = field_path,
        query_name = item_query_name(&field_path.list),
        field = field_path.field,
    )
}
