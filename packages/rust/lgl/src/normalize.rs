//! Fold constituent details into the three comparison sets.
//!
//! Values are stored exactly as LGL returns them, except that phone numbers
//! lose their hyphens. Nothing is case-folded or trimmed, so membership is a
//! byte-exact comparison against these forms.

use std::collections::HashSet;

use tracing::{info, instrument};

use contactaudit_shared::{ConstituentDetail, NameKey, Result};

use crate::client::LglApi;
use crate::walker::{list_all_constituents, resolve};

/// Strip hyphens from a phone number. Every other character is kept.
pub fn normalize_phone(number: &str) -> String {
    number.replace('-', "")
}

// ---------------------------------------------------------------------------
// ContactSets
// ---------------------------------------------------------------------------

/// Names, emails, and phones known to LGL. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSets {
    names: HashSet<NameKey>,
    emails: HashSet<String>,
    phones: HashSet<String>,
}

impl ContactSets {
    pub fn builder() -> ContactSetsBuilder {
        ContactSetsBuilder::default()
    }

    pub fn contains_name(&self, name: &NameKey) -> bool {
        self.names.contains(name)
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    /// `phone` is compared as given; it is not normalized first.
    pub fn contains_phone(&self, phone: &str) -> bool {
        self.phones.contains(phone)
    }

    pub fn names(&self) -> &HashSet<NameKey> {
        &self.names
    }

    pub fn emails(&self) -> &HashSet<String> {
        &self.emails
    }

    pub fn phones(&self) -> &HashSet<String> {
        &self.phones
    }
}

/// Single writer for [`ContactSets`].
#[derive(Debug, Default)]
pub struct ContactSetsBuilder {
    sets: ContactSets,
}

impl ContactSetsBuilder {
    /// Add one constituent's name, emails, and phones.
    pub fn add_constituent(&mut self, detail: &ConstituentDetail) -> &mut Self {
        self.sets.names.insert(detail.name_key());
        for address in detail.email_addresses.iter().filter_map(|e| e.address.as_ref()) {
            self.sets.emails.insert(address.clone());
        }
        for number in detail.phone_numbers.iter().filter_map(|p| p.number.as_deref()) {
            self.sets.phones.insert(normalize_phone(number));
        }
        self
    }

    pub fn add_name(&mut self, first: Option<&str>, last: Option<&str>) -> &mut Self {
        self.sets
            .names
            .insert((first.map(str::to_string), last.map(str::to_string)));
        self
    }

    pub fn add_email(&mut self, address: &str) -> &mut Self {
        self.sets.emails.insert(address.to_string());
        self
    }

    /// Hyphens are stripped, as for constituent phone numbers.
    pub fn add_phone(&mut self, number: &str) -> &mut Self {
        self.sets.phones.insert(normalize_phone(number));
        self
    }

    pub fn build(&mut self) -> ContactSets {
        std::mem::take(&mut self.sets)
    }
}

// ---------------------------------------------------------------------------
// Full pull
// ---------------------------------------------------------------------------

/// List every constituent, fetch each one's detail in turn, and build the sets.
///
/// `on_progress(current, total)` fires after each detail record is folded in.
/// The first failed call aborts the pull.
#[instrument(skip_all)]
pub async fn collect_contact_sets<A, F>(api: &A, mut on_progress: F) -> Result<ContactSets>
where
    A: LglApi + Sync,
    F: FnMut(usize, usize),
{
    let constituents = list_all_constituents(api).await?;
    let total = constituents.len();
    let mut builder = ContactSets::builder();

    for (i, summary) in constituents.iter().enumerate() {
        let detail = resolve(api, summary).await?;
        builder.add_constituent(&detail);
        on_progress(i + 1, total);
    }

    let sets = builder.build();
    info!(
        constituents = total,
        names = sets.names.len(),
        emails = sets.emails.len(),
        phones = sets.phones.len(),
        "LGL comparison sets built"
    );
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactaudit_shared::{EmailAddress, PhoneNumber};

    fn detail(emails: &[&str], phones: &[&str]) -> ConstituentDetail {
        ConstituentDetail {
            id: 1,
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email_addresses: emails
                .iter()
                .map(|a| EmailAddress {
                    address: Some(a.to_string()),
                })
                .collect(),
            phone_numbers: phones
                .iter()
                .map(|n| PhoneNumber {
                    number: Some(n.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn emails_are_case_sensitive() {
        let sets = ContactSets::builder()
            .add_constituent(&detail(&["a@x.com", "A@x.com"], &[]))
            .build();
        assert_eq!(sets.emails().len(), 2);
        assert!(sets.contains_email("a@x.com"));
        assert!(sets.contains_email("A@x.com"));
    }

    #[test]
    fn emails_are_not_trimmed() {
        let sets = ContactSets::builder()
            .add_constituent(&detail(&[" a@x.com"], &[]))
            .build();
        assert!(!sets.contains_email("a@x.com"));
        assert!(sets.contains_email(" a@x.com"));
    }

    #[test]
    fn phone_normalization_only_removes_hyphens() {
        assert_eq!(normalize_phone("555-123-4567"), "5551234567");
        assert_eq!(normalize_phone("(555) 123-4567"), "(555) 1234567");
        assert_eq!(normalize_phone("(555) 123 4567"), "(555) 123 4567");
        assert_eq!(normalize_phone("+1 555.123.4567"), "+1 555.123.4567");
        assert_eq!(normalize_phone("--"), "");
    }

    #[test]
    fn phone_normalization_keeps_every_non_hyphen_char() {
        let samples = [
            "555-123-4567",
            "(555) 123-4567",
            "+44 20-7946-0958",
            "ext. 12-3",
            "５５５-１２３",
            "",
        ];
        for input in samples {
            let out = normalize_phone(input);
            assert!(!out.contains('-'));
            let expected: String = input.chars().filter(|c| *c != '-').collect();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn constituent_fills_all_three_sets() {
        let sets = ContactSets::builder()
            .add_constituent(&detail(&["ada@example.org"], &["555-123-4567", "(555) 987-6543"]))
            .build();

        assert!(sets.contains_name(&(Some("Ada".into()), Some("Lovelace".into()))));
        assert!(!sets.contains_name(&(Some("Ada".into()), None)));
        assert!(sets.contains_phone("5551234567"));
        assert!(sets.contains_phone("(555) 9876543"));
        assert!(!sets.contains_phone("555-123-4567"));
        assert_eq!(sets.phones().len(), 2);
    }

    #[test]
    fn null_entries_are_skipped() {
        let mut with_nulls = detail(&["a@x.com"], &["555-000-1111"]);
        with_nulls.email_addresses.push(EmailAddress { address: None });
        with_nulls.phone_numbers.push(PhoneNumber { number: None });

        let sets = ContactSets::builder().add_constituent(&with_nulls).build();
        assert_eq!(sets.emails().len(), 1);
        assert_eq!(sets.phones().len(), 1);
        assert!(sets.contains_email("a@x.com"));
        assert!(sets.contains_phone("5550001111"));
    }

    #[test]
    fn builder_helpers_match_constituent_path() {
        let from_detail = ContactSets::builder()
            .add_constituent(&detail(&["ada@example.org"], &["555-123-4567"]))
            .build();
        let by_hand = ContactSets::builder()
            .add_name(Some("Ada"), Some("Lovelace"))
            .add_email("ada@example.org")
            .add_phone("555-123-4567")
            .build();
        assert_eq!(from_detail, by_hand);
    }

    #[tokio::test]
    async fn collect_runs_listing_then_details_with_progress() {
        use crate::client::LglClient;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents"))
            .and(header("Authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": 1}, {"id": 2}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "first_name": "A",
                "last_name": "B",
                "email_addresses": [{"address": "a@b.com"}],
                "phone_numbers": [{"number": "555-000-1111"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2,
                "first_name": "C",
                "last_name": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LglClient::new(&format!("{}/api/v1/", server.uri()), "t")
            .unwrap()
            .with_delay(std::time::Duration::ZERO);

        let mut seen = Vec::new();
        let sets = collect_contact_sets(&client, |current, total| seen.push((current, total)))
            .await
            .unwrap();

        assert_eq!(seen, [(1, 2), (2, 2)]);
        assert_eq!(sets.names().len(), 2);
        assert!(sets.contains_name(&(Some("C".into()), None)));
        assert!(sets.contains_email("a@b.com"));
        assert!(sets.contains_phone("5550001111"));
    }

    #[tokio::test]
    async fn collect_paces_every_page_and_detail_call() {
        use crate::client::LglClient;
        use std::time::{Duration, Instant};
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": 3}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": 1}, {"id": 2}],
                "next_link": format!("{}/api/v1/constituents?offset=2", server.uri())
            })))
            .expect(1)
            .mount(&server)
            .await;

        for id in 1..=3 {
            Mock::given(method("GET"))
                .and(path(format!("/api/v1/constituents/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "id": id,
                    "first_name": format!("F{id}")
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let delay = Duration::from_millis(50);
        let client = LglClient::new(&format!("{}/api/v1/", server.uri()), "t")
            .unwrap()
            .with_delay(delay);

        let start = Instant::now();
        let sets = collect_contact_sets(&client, |_, _| {}).await.unwrap();
        let elapsed = start.elapsed();

        // 2 pages + 3 details, each followed by its own pause.
        assert_eq!(server.received_requests().await.unwrap().len(), 5);
        assert!(elapsed >= delay * 5);
        assert_eq!(sets.names().len(), 3);
    }

    #[tokio::test]
    async fn collect_aborts_on_failed_detail() {
        use crate::client::LglClient;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": 9}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/constituents/9"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = LglClient::new(&format!("{}/api/v1/", server.uri()), "t")
            .unwrap()
            .with_delay(std::time::Duration::ZERO);

        let err = collect_contact_sets(&client, |_, _| {}).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
