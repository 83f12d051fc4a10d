//! Shared test fixtures for the query engine

use crate::core::entity::{Entity, FieldAccess, FieldDescriptor, ValueKind};
use crate::core::field::FieldValue;
use chrono::{DateTime, TimeZone, Utc};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagModel {
    pub name: String,
}

impl FieldAccess for TagModel {
    fn field_value(&self, path: &str) -> Option<FieldValue> {
        match path {
            "name" => Some(FieldValue::String(self.name.clone())),
            _ => None,
        }
    }
}

fn tag_shape() -> &'static [FieldDescriptor] {
    static SHAPE: [FieldDescriptor; 1] = [FieldDescriptor::scalar("name", ValueKind::String)];
    &SHAPE
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChildModel {
    pub label: String,
    pub code: String,
    pub tags: Vec<TagModel>,
}

impl ChildModel {
    pub fn new(label: &str, code: &str) -> Self {
        ChildModel {
            label: label.to_string(),
            code: code.to_string(),
            tags: Vec::new(),
        }
    }
}

impl FieldAccess for ChildModel {
    fn field_value(&self, path: &str) -> Option<FieldValue> {
        match path {
            "label" => Some(FieldValue::String(self.label.clone())),
            "code" => Some(FieldValue::String(self.code.clone())),
            _ => None,
        }
    }
}

fn child_shape() -> &'static [FieldDescriptor] {
    static SHAPE: [FieldDescriptor; 3] = [
        FieldDescriptor::scalar("label", ValueKind::String),
        FieldDescriptor::scalar("code", ValueKind::String),
        FieldDescriptor::collection("tags", tag_shape),
    ];
    &SHAPE
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MockModel {
    pub id: i64,
    pub label: String,
    pub description: Option<String>,
    pub date_created: DateTime<Utc>,
    pub children: Vec<ChildModel>,
}

impl FieldAccess for MockModel {
    fn field_value(&self, path: &str) -> Option<FieldValue> {
        match path {
            "id" => Some(FieldValue::Integer(self.id)),
            "label" => Some(FieldValue::String(self.label.clone())),
            "description" => Some(match &self.description {
                Some(text) => FieldValue::String(text.clone()),
                None => FieldValue::Null,
            }),
            "date_created" => Some(FieldValue::DateTime(self.date_created)),
            _ => None,
        }
    }
}

impl Entity for MockModel {
    fn shape() -> &'static [FieldDescriptor] {
        static SHAPE: [FieldDescriptor; 5] = [
            FieldDescriptor::scalar("id", ValueKind::Integer),
            FieldDescriptor::scalar("label", ValueKind::String),
            FieldDescriptor::scalar("description", ValueKind::String),
            FieldDescriptor::scalar("date_created", ValueKind::DateTime),
            FieldDescriptor::collection("children", child_shape),
        ];
        &SHAPE
    }

    fn collection_items(&self, field: &str) -> Option<Vec<&dyn FieldAccess>> {
        match field {
            "children" => Some(
                self.children
                    .iter()
                    .map(|child| child as &dyn FieldAccess)
                    .collect(),
            ),
            _ => None,
        }
    }

    fn retain_in_collection(
        &mut self,
        field: &str,
        keep: &mut dyn FnMut(&dyn FieldAccess) -> bool,
    ) {
        if field == "children" {
            self.children.retain(|child| keep(child));
        }
    }

    fn sort_collection(
        &mut self,
        field: &str,
        cmp: &mut dyn FnMut(&dyn FieldAccess, &dyn FieldAccess) -> Ordering,
    ) {
        if field == "children" {
            self.children.sort_by(|a, b| cmp(a, b));
        }
    }
}

/// Nine rows in insertion order; the ninth label intentionally lacks the
/// word "Label" so containment filters exclude it.
pub(crate) fn fixture() -> Vec<MockModel> {
    let labels = [
        "First Label",
        "Second Label",
        "Third Label",
        "Fourth Label",
        "Fifth Label",
        "Sixth Label",
        "Seventh Label",
        "Eigth Label",
        "Nineth",
    ];

    labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let id = index as i64 + 1;
            MockModel {
                id,
                label: label.to_string(),
                description: if id < 9 {
                    Some(format!("Item {} description", id))
                } else {
                    None
                },
                date_created: Utc
                    .with_ymd_and_hms(2024, 3, 15, index as u32, 30, 0)
                    .unwrap(),
                children: vec![
                    ChildModel::new("Child One", "1"),
                    ChildModel::new("Child Two", "2"),
                    ChildModel::new("Child Three", "3"),
                ],
            }
        })
        .collect()
}
