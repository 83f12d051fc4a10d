//! Shared test entity and fixture data

use chrono::TimeZone;
use repokit::prelude::*;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct ChildModel {
    pub label: String,
    pub code: String,
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
    static SHAPE: [FieldDescriptor; 2] = [
        FieldDescriptor::scalar("label", ValueKind::String),
        FieldDescriptor::scalar("code", ValueKind::String),
    ];
    &SHAPE
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockModel {
    pub id: i64,
    pub label: String,
    pub date_created: DateTime<Utc>,
    pub children: Vec<ChildModel>,
}

impl FieldAccess for MockModel {
    fn field_value(&self, path: &str) -> Option<FieldValue> {
        match path {
            "id" => Some(FieldValue::Integer(self.id)),
            "label" => Some(FieldValue::String(self.label.clone())),
            "date_created" => Some(FieldValue::DateTime(self.date_created)),
            _ => None,
        }
    }
}

impl Entity for MockModel {
    fn shape() -> &'static [FieldDescriptor] {
        static SHAPE: [FieldDescriptor; 4] = [
            FieldDescriptor::scalar("id", ValueKind::Integer),
            FieldDescriptor::scalar("label", ValueKind::String),
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

/// Nine rows; the ninth label lacks the word "Label" on purpose.
pub fn fixture() -> Vec<MockModel> {
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
                date_created: Utc
                    .with_ymd_and_hms(2024, 3, 15, index as u32, 0, 0)
                    .unwrap(),
                children: vec![
                    ChildModel {
                        label: "Child One".to_string(),
                        code: "1".to_string(),
                    },
                    ChildModel {
                        label: "Child Two".to_string(),
                        code: "2".to_string(),
                    },
                    ChildModel {
                        label: "Child Three".to_string(),
                        code: "3".to_string(),
                    },
                ],
            }
        })
        .collect()
}

/// Fresh seeded store for one test.
pub fn seeded_repo() -> InMemoryRepository<i64, MockModel> {
    InMemoryRepository::new(|item: &MockModel| item.id).with_items(fixture())
}
