//! Core domain types for the contact audit.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LGL constituents
// ---------------------------------------------------------------------------

/// One page of the `constituents` listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstituentPage {
    /// Summary records on this page, in server order.
    #[serde(default)]
    pub items: Vec<ConstituentSummary>,
    /// Cursor URL for the next page. Absent, null, or empty ends the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// List-level constituent record. Carries no contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituentSummary {
    pub id: u64,
}

/// Full constituent record from `constituents/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstituentDetail {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
}

impl ConstituentDetail {
    /// The `(first, last)` tuple used for name membership.
    pub fn name_key(&self) -> NameKey {
        (self.first_name.clone(), self.last_name.clone())
    }
}

/// A null or missing `address` is kept as `None` and never matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default)]
    pub number: Option<String>,
}

/// `(first, last)` name tuple. Absent parts stay `None` and only match `None`.
pub type NameKey = (Option<String>, Option<String>);

// ---------------------------------------------------------------------------
// HEART contacts
// ---------------------------------------------------------------------------

/// What a HEART contact field holds, for reconciliation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Email,
    Phone,
}

/// The HEART Contact fields pulled for the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    AlternateEmail,
    HomeEmail,
    MobilePhone,
    HomePhone,
}

/// Every audited field, in query and report-column order.
pub const CONTACT_FIELDS: [ContactField; 7] = [
    ContactField::FirstName,
    ContactField::LastName,
    ContactField::Email,
    ContactField::AlternateEmail,
    ContactField::HomeEmail,
    ContactField::MobilePhone,
    ContactField::HomePhone,
];

impl ContactField {
    /// Salesforce API name, as used in SOQL and in query results.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::FirstName => "FirstName",
            Self::LastName => "LastName",
            Self::Email => "Email",
            Self::AlternateEmail => "npe01__AlternateEmail__c",
            Self::HomeEmail => "npe01__HomeEmail__c",
            Self::MobilePhone => "MobilePhone",
            Self::HomePhone => "HomePhone",
        }
    }

    /// Column header in the CSV report.
    pub fn column(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Email => "Email",
            Self::AlternateEmail => "Alternate Email",
            Self::HomeEmail => "Home Email",
            Self::MobilePhone => "Mobile Phone",
            Self::HomePhone => "Home Phone",
        }
    }

    /// Kind is read off the API name: anything mentioning "email" or
    /// "phone" (case-insensitive) is compared against that set.
    pub fn kind(self) -> FieldKind {
        let name = self.api_name().to_ascii_lowercase();
        if name.contains("email") {
            FieldKind::Email
        } else if name.contains("phone") {
            FieldKind::Phone
        } else {
            FieldKind::Name
        }
    }
}

/// A HEART Contact record restricted to the audited fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartContact {
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "npe01__AlternateEmail__c", default)]
    pub alternate_email: Option<String>,
    #[serde(rename = "npe01__HomeEmail__c", default)]
    pub home_email: Option<String>,
    #[serde(rename = "MobilePhone", default)]
    pub mobile_phone: Option<String>,
    #[serde(rename = "HomePhone", default)]
    pub home_phone: Option<String>,
}

impl HeartContact {
    /// Raw value of a field.
    pub fn get(&self, field: ContactField) -> Option<&str> {
        let value = match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::AlternateEmail => &self.alternate_email,
            ContactField::HomeEmail => &self.home_email,
            ContactField::MobilePhone => &self.mobile_phone,
            ContactField::HomePhone => &self.home_phone,
        };
        value.as_deref()
    }

    /// Value of a field if it is present and non-empty.
    pub fn populated(&self, field: ContactField) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn name_key(&self) -> NameKey {
        (self.first_name.clone(), self.last_name.clone())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A class of contact information not found in LGL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MissingCategory {
    Name,
    Email,
    Phone,
}

impl MissingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
        }
    }
}

impl std::fmt::Display for MissingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged HEART contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Display values aligned with [`CONTACT_FIELDS`]; absent values are empty.
    pub values: Vec<String>,
    /// Missing categories, sorted and never empty.
    pub missing: Vec<MissingCategory>,
}

impl ReportRow {
    /// Header row: every field's column name followed by `Missing`.
    pub fn header() -> Vec<&'static str> {
        CONTACT_FIELDS
            .iter()
            .map(|f| f.column())
            .chain(std::iter::once("Missing"))
            .collect()
    }

    /// Display value of a single field.
    pub fn value(&self, field: ContactField) -> &str {
        CONTACT_FIELDS
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The `Missing` column, e.g. `"Name, Email"`.
    pub fn missing_label(&self) -> String {
        self.missing
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The full CSV record for this row.
    pub fn record(&self) -> Vec<String> {
        let mut record = self.values.clone();
        record.push(self.missing_label());
        record
    }
}
