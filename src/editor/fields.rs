use std::collections::HashMap;

use crate::error::FieldError;
use crate::models::{Category, ListingDraft};

/// Value carried by a control change event
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    /// Text and number inputs report their raw text
    Text(String),
    /// Checkboxes report their checked state
    Checked(bool),
}

/// A single change coming from a form control
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub id: String,
    pub value: ControlValue,
}

impl ChangeEvent {
    pub fn text(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: ControlValue::Text(value.into()),
        }
    }

    pub fn checkbox(id: impl Into<String>, checked: bool) -> Self {
        Self {
            id: id.into(),
            value: ControlValue::Checked(checked),
        }
    }
}

/// How a control writes into the draft
#[derive(Clone, Copy)]
pub enum FieldSetter {
    Text(fn(&mut ListingDraft, String)),
    Count(fn(&mut ListingDraft, u32)),
    Amount(fn(&mut ListingDraft, f64)),
    Flag(fn(&mut ListingDraft, bool)),
    /// One of the mutually exclusive category boxes
    Category(Category),
}

impl FieldSetter {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSetter::Text(_) => FieldKind::Text,
            FieldSetter::Count(_) | FieldSetter::Amount(_) => FieldKind::Number,
            FieldSetter::Flag(_) => FieldKind::Checkbox,
            FieldSetter::Category(category) => FieldKind::Category(*category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Category(Category),
}

fn descriptors() -> [(&'static str, FieldSetter); 12] {
    [
        ("name", FieldSetter::Text(|d, v| d.name = v)),
        ("description", FieldSetter::Text(|d, v| d.description = v)),
        ("address", FieldSetter::Text(|d, v| d.address = v)),
        ("sale", FieldSetter::Category(Category::Sale)),
        ("rent", FieldSetter::Category(Category::Rent)),
        ("bedrooms", FieldSetter::Count(|d, v| d.bedrooms = v)),
        ("bathrooms", FieldSetter::Count(|d, v| d.bathrooms = v)),
        ("regularPrice", FieldSetter::Amount(|d, v| d.regular_price = v)),
        ("discountPrice", FieldSetter::Amount(|d, v| d.discount_price = v)),
        ("offer", FieldSetter::Flag(|d, v| d.has_offer = v)),
        ("parking", FieldSetter::Flag(|d, v| d.has_parking = v)),
        ("furnished", FieldSetter::Flag(|d, v| d.is_furnished = v)),
    ]
}

/// Control id → setter table, built once per editor.
///
/// Changes are applied as-is: range and business rules are checked at
/// submission. A change that cannot be applied leaves the draft untouched.
pub struct FieldTable {
    setters: HashMap<&'static str, FieldSetter>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self {
            setters: descriptors().into_iter().collect(),
        }
    }

    pub fn kind(&self, id: &str) -> Option<FieldKind> {
        self.setters.get(id).map(FieldSetter::kind)
    }

    pub fn apply(&self, draft: &mut ListingDraft, event: ChangeEvent) -> Result<(), FieldError> {
        let setter = *self
            .setters
            .get(event.id.as_str())
            .ok_or_else(|| FieldError::UnknownControl(event.id.clone()))?;

        match (setter, event.value) {
            // Clicking either category box selects it, whatever its checked state
            (FieldSetter::Category(category), _) => draft.category = category,
            (FieldSetter::Flag(set), ControlValue::Checked(checked)) => set(draft, checked),
            (FieldSetter::Text(set), ControlValue::Text(text)) => set(draft, text),
            (FieldSetter::Count(set), ControlValue::Text(text)) => {
                let count = text
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| invalid_number(&event.id, &text))?;
                set(draft, count);
            }
            (FieldSetter::Amount(set), ControlValue::Text(text)) => {
                let amount = text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid_number(&event.id, &text))?;
                set(draft, amount);
            }
            (FieldSetter::Flag(_), ControlValue::Text(_)) => {
                return Err(FieldError::WrongKind {
                    id: event.id,
                    expected: "checkbox",
                })
            }
            (_, ControlValue::Checked(_)) => {
                return Err(FieldError::WrongKind {
                    id: event.id,
                    expected: "text",
                })
            }
        }

        Ok(())
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_number(id: &str, value: &str) -> FieldError {
    FieldError::InvalidNumber {
        id: id.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boxes_are_mutually_exclusive() {
        let table = FieldTable::new();
        let mut draft = ListingDraft::default();

        table.apply(&mut draft, ChangeEvent::checkbox("sale", true)).unwrap();
        assert_eq!(draft.category, Category::Sale);

        // Unchecking the selected box still selects it
        table.apply(&mut draft, ChangeEvent::checkbox("sale", false)).unwrap();
        assert_eq!(draft.category, Category::Sale);

        table.apply(&mut draft, ChangeEvent::checkbox("rent", true)).unwrap();
        assert_eq!(draft.category, Category::Rent);
    }

    #[test]
    fn test_flags_text_and_numbers() {
        let table = FieldTable::new();
        let mut draft = ListingDraft::default();

        table.apply(&mut draft, ChangeEvent::checkbox("parking", true)).unwrap();
        table.apply(&mut draft, ChangeEvent::text("name", "Riverside backpackers")).unwrap();
        table.apply(&mut draft, ChangeEvent::text("bedrooms", " 4 ")).unwrap();
        table.apply(&mut draft, ChangeEvent::text("regularPrice", "129.5")).unwrap();

        assert!(draft.has_parking);
        assert_eq!(draft.name, "Riverside backpackers");
        assert_eq!(draft.bedrooms, 4);
        assert_eq!(draft.regular_price, 129.5);
    }

    #[test]
    fn test_bounds_are_not_checked_on_change() {
        let table = FieldTable::new();
        let mut draft = ListingDraft::default();

        table.apply(&mut draft, ChangeEvent::text("bathrooms", "0")).unwrap();
        table.apply(&mut draft, ChangeEvent::text("name", "x")).unwrap();
        assert_eq!(draft.bathrooms, 0);
        assert_eq!(draft.name, "x");
    }

    #[test]
    fn test_rejected_changes_leave_draft_untouched() {
        let table = FieldTable::new();
        let mut draft = ListingDraft::default();
        let before = draft.clone();

        assert_eq!(
            table.apply(&mut draft, ChangeEvent::text("pool", "yes")),
            Err(FieldError::UnknownControl("pool".into()))
        );
        assert!(matches!(
            table.apply(&mut draft, ChangeEvent::text("bedrooms", "two")),
            Err(FieldError::InvalidNumber { .. })
        ));
        assert!(matches!(
            table.apply(&mut draft, ChangeEvent::text("discountPrice", "NaN")),
            Err(FieldError::InvalidNumber { .. })
        ));
        assert!(matches!(
            table.apply(&mut draft, ChangeEvent::text("offer", "true")),
            Err(FieldError::WrongKind { expected: "checkbox", .. })
        ));
        assert!(matches!(
            table.apply(&mut draft, ChangeEvent::checkbox("address", true)),
            Err(FieldError::WrongKind { expected: "text", .. })
        ));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_kind_lookup() {
        let table = FieldTable::new();
        assert_eq!(table.kind("rent"), Some(FieldKind::Category(Category::Rent)));
        assert_eq!(table.kind("regularPrice"), Some(FieldKind::Number));
        assert_eq!(table.kind("furnished"), Some(FieldKind::Checkbox));
        assert_eq!(table.kind("images"), None);
    }
}
