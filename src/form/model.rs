//! Form model seam and an in-memory implementation

use super::field::{Field, FieldAttribute, FieldSetInfo};
use serde::{Deserialize, Serialize};

/// Group holding the custom fields of a form
pub const DEFAULT_FIELDS_GROUP: &str = "com_fields";

/// Operations showon processing needs from the host form.
///
/// Fields are addressed by their declared name within a group.
#[cfg_attr(test, mockall::automock)]
pub trait FormModel {
    /// Form name, which doubles as the context (`com_content.article`)
    fn name(&self) -> String;

    /// Field sets that contain fields of `group`, in form order
    fn field_sets(&self, group: &str) -> Vec<FieldSetInfo>;

    /// Fields currently attached to the named field set, in form order
    fn field_set(&self, name: &str) -> Vec<Field>;

    fn get_field(&self, name: &str, group: &str) -> Option<Field>;

    /// Detach a field; returns false when it was not present
    fn remove_field(&mut self, name: &str, group: &str) -> bool;

    /// Returns false when the field was not present
    fn set_field_attribute(
        &mut self,
        name: &str,
        attribute: FieldAttribute,
        value: &str,
        group: &str,
    ) -> bool;

    /// Attach a field to a field set, creating the set if needed
    fn add_field(&mut self, field: Field, group: &str, field_set: &str);
}

fn default_group() -> String {
    DEFAULT_FIELDS_GROUP.to_string()
}

/// A named field set of an in-memory form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FieldSet {
    pub fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            group: group.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }
}

/// In-memory form, used by the demo host and by tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub name: String,
    #[serde(default)]
    pub field_sets: Vec<FieldSet>,
}

impl Form {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_sets: Vec::new(),
        }
    }

    pub fn with_field_set(mut self, set: FieldSet) -> Self {
        self.field_sets.push(set);
        self
    }

    /// Declared names of all fields, in form order
    pub fn field_names(&self) -> Vec<&str> {
        self.field_sets
            .iter()
            .flat_map(|set| set.fields.iter().map(|f| f.fieldname.as_str()))
            .collect()
    }

    fn find_mut(&mut self, name: &str, group: &str) -> Option<&mut Field> {
        self.field_sets
            .iter_mut()
            .filter(|set| set.group == group)
            .flat_map(|set| set.fields.iter_mut())
            .find(|f| f.fieldname == name)
    }
}

impl FormModel for Form {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn field_sets(&self, group: &str) -> Vec<FieldSetInfo> {
        self.field_sets
            .iter()
            .filter(|set| set.group == group)
            .map(|set| FieldSetInfo {
                name: set.name.clone(),
                label: set.label.clone(),
            })
            .collect()
    }

    fn field_set(&self, name: &str) -> Vec<Field> {
        self.field_sets
            .iter()
            .filter(|set| set.name == name)
            .flat_map(|set| set.fields.iter().cloned())
            .collect()
    }

    fn get_field(&self, name: &str, group: &str) -> Option<Field> {
        self.field_sets
            .iter()
            .filter(|set| set.group == group)
            .flat_map(|set| set.fields.iter())
            .find(|f| f.fieldname == name)
            .cloned()
    }

    fn remove_field(&mut self, name: &str, group: &str) -> bool {
        for set in self.field_sets.iter_mut().filter(|set| set.group == group) {
            if let Some(index) = set.fields.iter().position(|f| f.fieldname == name) {
                set.fields.remove(index);
                return true;
            }
        }
        false
    }

    fn set_field_attribute(
        &mut self,
        name: &str,
        attribute: FieldAttribute,
        value: &str,
        group: &str,
    ) -> bool {
        match self.find_mut(name, group) {
            Some(field) => {
                field.set_attribute(attribute, value);
                true
            }
            None => false,
        }
    }

    fn add_field(&mut self, field: Field, group: &str, field_set: &str) {
        let existing = self
            .field_sets
            .iter_mut()
            .find(|set| set.name == field_set && set.group == group);

        match existing {
            Some(set) => set.fields.push(field),
            None => self
                .field_sets
                .push(FieldSet::new(field_set, group).with_fields(vec![field])),
        }
    }
}
