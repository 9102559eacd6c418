//! Form field value objects

use serde::{Deserialize, Serialize};

/// Attributes of a field that form preparation may rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAttribute {
    ShowOn,
    FormSource,
}

impl FieldAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldAttribute::ShowOn => "showon",
            FieldAttribute::FormSource => "formsource",
        }
    }
}

/// Name and label of a field set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSetInfo {
    pub name: String,
    pub label: Option<String>,
}

/// A single form field as seen by showon processing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    /// Control name, e.g. `jform[com_fields][tour-dates]`
    #[serde(default)]
    pub name: String,
    /// Name declared when the field was defined
    pub fieldname: String,
    /// Raw showon expression; empty when the field always shows
    #[serde(default)]
    pub showon: String,
    /// Raw definition of a nested subform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formsource: Option<String>,
}

impl Field {
    /// Create a new field without conditions
    pub fn new(fieldname: &str) -> Self {
        Self {
            name: String::new(),
            fieldname: fieldname.to_string(),
            showon: String::new(),
            formsource: None,
        }
    }

    /// Set the control name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the showon expression
    pub fn with_showon(mut self, showon: &str) -> Self {
        self.showon = showon.to_string();
        self
    }

    /// Attach a subform definition
    pub fn with_formsource(mut self, source: &str) -> Self {
        self.formsource = Some(source.to_string());
        self
    }

    /// Whether the field carries a non-blank showon expression
    pub fn has_showon(&self) -> bool {
        !self.showon.trim().is_empty()
    }

    /// Last bracketed segment of the control name (`jform[a][b]` -> `b`).
    /// Falls back to the declared name when there is no control name.
    pub fn short_name(&self) -> &str {
        if self.name.is_empty() {
            return &self.fieldname;
        }
        let trimmed = self.name.trim_end_matches(']');
        let last = trimmed.rsplit(']').next().unwrap_or(trimmed);
        last.trim_start_matches('[')
    }

    pub fn attribute(&self, attribute: FieldAttribute) -> Option<&str> {
        match attribute {
            FieldAttribute::ShowOn => Some(&self.showon),
            FieldAttribute::FormSource => self.formsource.as_deref(),
        }
    }

    pub fn set_attribute(&mut self, attribute: FieldAttribute, value: &str) {
        match attribute {
            FieldAttribute::ShowOn => self.showon = value.to_string(),
            FieldAttribute::FormSource => self.formsource = Some(value.to_string()),
        }
    }
}
