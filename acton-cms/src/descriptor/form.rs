//! Form and index-table definitions carried by controller descriptors
//!
//! Rendering is the view layer's job; these are the data it reads.

use crate::schema::{FieldSpec, FieldType};
use inflector::Inflector;
use serde::{Deserialize, Serialize};

/// Input widget for a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    /// Single-line text input
    Text,
    /// Checkbox / toggle
    Checkbox,
    /// Date-time picker
    DateTime,
}

impl From<FieldType> for InputKind {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => Self::Text,
            FieldType::Boolean => Self::Checkbox,
            FieldType::DateTime => Self::DateTime,
        }
    }
}

/// One form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Attribute name
    pub name: String,
    /// Human label
    pub label: String,
    /// Widget
    pub input: InputKind,
    /// Rendered once per locale
    pub translated: bool,
    /// Must be filled
    pub required: bool,
}

impl FormField {
    /// Build a field from a schema field
    #[must_use]
    pub fn from_spec(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.clone(),
            label: spec.name.to_title_case(),
            input: spec.field_type.into(),
            translated: spec.translatable,
            required: !spec.nullable,
        }
    }
}

/// An ordered list of form fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Fields in display order
    pub fields: Vec<FormField>,
}

impl Form {
    /// Empty form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    #[must_use]
    pub fn add(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Stock form: one input per schema field, in declaration order
    #[must_use]
    pub fn stock(fields: &[FieldSpec]) -> Self {
        Self {
            fields: fields.iter().map(FormField::from_spec).collect(),
        }
    }
}

/// How an index column presents its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnPresenter {
    /// Plain attribute value
    Text,
    /// Published / draft indicator
    PublishStatus,
    /// Featured star
    Featured,
    /// Link to the edit page
    EditLink,
}

/// One index-table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Attribute shown
    pub field: String,
    /// Header
    pub title: String,
    /// Whether the listing can sort on it
    pub sortable: bool,
    /// Presentation
    pub presenter: ColumnPresenter,
}

impl TableColumn {
    /// Plain text column
    #[must_use]
    pub fn text(field: &str) -> Self {
        Self {
            field: field.to_string(),
            title: field.to_title_case(),
            sortable: false,
            presenter: ColumnPresenter::Text,
        }
    }

    /// Make the column sortable
    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// Index-table column set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    /// Columns in display order
    pub columns: Vec<TableColumn>,
}

impl TableColumns {
    /// Empty column set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column
    #[must_use]
    pub fn add(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Stock columns: publish status, then the title column as an edit link
    ///
    /// The title column is `title` when the schema has one, otherwise the
    /// first declared field.
    #[must_use]
    pub fn stock(fields: &[FieldSpec]) -> Self {
        let mut columns = vec![TableColumn {
            field: "published".to_string(),
            title: "Published".to_string(),
            sortable: false,
            presenter: ColumnPresenter::PublishStatus,
        }];

        let title = fields
            .iter()
            .find(|f| f.name == "title")
            .or_else(|| fields.first());
        if let Some(title) = title {
            columns.push(TableColumn {
                field: title.name.clone(),
                title: title.name.to_title_case(),
                sortable: true,
                presenter: ColumnPresenter::EditLink,
            });
        }

        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ResourceSchema;

    #[test]
    fn test_stock_form() {
        let schema = ResourceSchema::from_shorthand(
            "events",
            &["title:string:translatable", "startsAt:dateTime:required"],
        )
        .unwrap();
        let form = Form::stock(schema.fields());

        assert_eq!(form.fields.len(), 2);
        assert!(form.fields[0].translated);
        assert_eq!(form.fields[1].label, "Starts At");
        assert_eq!(form.fields[1].input, InputKind::DateTime);
        assert!(form.fields[1].required);
    }

    #[test]
    fn test_stock_columns_prefer_title() {
        let schema = ResourceSchema::from_shorthand("events", &["venue", "title"]).unwrap();
        let columns = TableColumns::stock(schema.fields());
        assert_eq!(columns.columns[0].presenter, ColumnPresenter::PublishStatus);
        assert_eq!(columns.columns[1].field, "title");
        assert!(columns.columns[1].sortable);
    }

    #[test]
    fn test_stock_columns_fall_back_to_first_field() {
        let schema = ResourceSchema::from_shorthand("venues", &["name"]).unwrap();
        let columns = TableColumns::stock(schema.fields());
        assert_eq!(columns.columns[1].field, "name");
    }
}
