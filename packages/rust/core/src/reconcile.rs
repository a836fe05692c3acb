//! Decide, per HEART contact, which kinds of contact information LGL lacks.

use std::collections::BTreeSet;

use contactaudit_lgl::ContactSets;
use contactaudit_shared::{CONTACT_FIELDS, FieldKind, HeartContact, MissingCategory, ReportRow};

/// Missing categories for a single contact, in Name, Email, Phone order.
///
/// A contact with no populated field is never flagged. Otherwise the name
/// tuple is checked once, then each populated email and phone field is
/// checked verbatim against its set.
pub fn missing_categories(contact: &HeartContact, sets: &ContactSets) -> BTreeSet<MissingCategory> {
    let mut missing = BTreeSet::new();

    let populated: Vec<_> = CONTACT_FIELDS
        .iter()
        .filter_map(|field| contact.populated(*field).map(|value| (*field, value)))
        .collect();

    if populated.is_empty() {
        return missing;
    }

    if !sets.contains_name(&contact.name_key()) {
        missing.insert(MissingCategory::Name);
    }

    for (field, value) in populated {
        match field.kind() {
            FieldKind::Email if !sets.contains_email(value) => {
                missing.insert(MissingCategory::Email);
            }
            FieldKind::Phone if !sets.contains_phone(value) => {
                missing.insert(MissingCategory::Phone);
            }
            _ => {}
        }
    }

    missing
}

/// Build one report row per contact with anything missing, in input order.
pub fn reconcile(contacts: &[HeartContact], sets: &ContactSets) -> Vec<ReportRow> {
    contacts
        .iter()
        .filter_map(|contact| {
            let missing = missing_categories(contact, sets);
            if missing.is_empty() {
                return None;
            }
            Some(ReportRow {
                values: CONTACT_FIELDS
                    .iter()
                    .map(|field| contact.get(*field).unwrap_or_default().to_string())
                    .collect(),
                missing: missing.into_iter().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactaudit_shared::ContactField;

    fn contact(first: &str, last: &str) -> HeartContact {
        HeartContact {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            ..HeartContact::default()
        }
    }

    fn ab_sets() -> ContactSets {
        ContactSets::builder().add_name(Some("A"), Some("B")).build()
    }

    #[test]
    fn missing_email_only() {
        let heart = HeartContact {
            email: Some("a@b.com".into()),
            ..contact("A", "B")
        };

        let rows = reconcile(&[heart], &ab_sets());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].missing_label(), "Email");
        assert_eq!(rows[0].value(ContactField::Email), "a@b.com");
        assert_eq!(rows[0].value(ContactField::HomePhone), "");
    }

    #[test]
    fn known_email_and_name_without_phone_yields_no_row() {
        let sets = ContactSets::builder()
            .add_name(Some("A"), Some("B"))
            .add_email("a@b.com")
            .build();
        let heart = HeartContact {
            email: Some("a@b.com".into()),
            ..contact("A", "B")
        };

        assert!(reconcile(&[heart], &sets).is_empty());
    }

    #[test]
    fn unknown_mobile_phone_flags_phone() {
        let heart = HeartContact {
            mobile_phone: Some("5551234567".into()),
            ..contact("A", "B")
        };

        let rows = reconcile(&[heart], &ab_sets());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].missing_label().contains("Phone"));
    }

    #[test]
    fn heart_phone_is_compared_without_normalization() {
        let sets = ContactSets::builder()
            .add_name(Some("A"), Some("B"))
            .add_phone("555-123-4567")
            .build();

        let plain = HeartContact {
            home_phone: Some("5551234567".into()),
            ..contact("A", "B")
        };
        let hyphenated = HeartContact {
            home_phone: Some("555-123-4567".into()),
            ..contact("A", "B")
        };

        assert!(missing_categories(&plain, &sets).is_empty());
        assert_eq!(
            missing_categories(&hyphenated, &sets),
            BTreeSet::from([MissingCategory::Phone])
        );
    }

    #[test]
    fn every_email_field_is_checked() {
        let sets = ContactSets::builder()
            .add_name(Some("A"), Some("B"))
            .add_email("a@b.com")
            .build();
        let heart = HeartContact {
            email: Some("a@b.com".into()),
            home_email: Some("home@b.com".into()),
            ..contact("A", "B")
        };

        let rows = reconcile(&[heart], &sets);
        assert_eq!(rows[0].missing, [MissingCategory::Email]);
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let sets = ContactSets::builder()
            .add_name(Some("A"), Some("B"))
            .add_email("a@b.com")
            .build();
        let heart = HeartContact {
            email: Some("A@b.com".into()),
            ..contact("A", "B")
        };

        assert_eq!(reconcile(&[heart], &sets)[0].missing_label(), "Email");
    }

    #[test]
    fn unknown_name_with_everything_missing() {
        let heart = HeartContact {
            email: Some("x@y.com".into()),
            alternate_email: Some("alt@y.com".into()),
            mobile_phone: Some("1".into()),
            home_phone: Some("2".into()),
            ..contact("X", "Y")
        };

        let rows = reconcile(&[heart], &ab_sets());
        assert_eq!(rows[0].missing_label(), "Name, Email, Phone");
    }

    #[test]
    fn name_only_contact_is_checked_for_name() {
        let rows = reconcile(&[contact("X", "Y"), contact("A", "B")], &ab_sets());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value(ContactField::FirstName), "X");
        assert_eq!(rows[0].missing_label(), "Name");
    }

    #[test]
    fn empty_contact_is_never_flagged() {
        let blank = HeartContact {
            first_name: Some(String::new()),
            email: Some(String::new()),
            ..HeartContact::default()
        };
        assert!(reconcile(&[blank, HeartContact::default()], &ContactSets::default()).is_empty());
    }

    #[test]
    fn missing_last_name_matches_only_missing_last_name() {
        let sets = ContactSets::builder().add_name(Some("Cher"), None).build();

        let no_last = HeartContact {
            first_name: Some("Cher".into()),
            ..HeartContact::default()
        };
        let empty_last = HeartContact {
            last_name: Some(String::new()),
            ..no_last.clone()
        };

        assert!(missing_categories(&no_last, &sets).is_empty());
        assert_eq!(
            missing_categories(&empty_last, &sets),
            BTreeSet::from([MissingCategory::Name])
        );
    }

    #[test]
    fn rows_keep_input_order_and_are_idempotent() {
        let contacts = vec![
            HeartContact {
                email: Some("1@x.com".into()),
                ..contact("One", "X")
            },
            contact("A", "B"),
            HeartContact {
                mobile_phone: Some("999".into()),
                ..contact("Three", "X")
            },
        ];
        let sets = ab_sets();

        let first = reconcile(&contacts, &sets);
        let second = reconcile(&contacts, &sets);
        assert_eq!(first, second);

        let names: Vec<&str> = first
            .iter()
            .map(|r| r.value(ContactField::FirstName))
            .collect();
        assert_eq!(names, ["One", "Three"]);
    }
}
