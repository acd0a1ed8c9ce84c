use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::account::AccountParams;
use super::address::Address;
use super::ids::Id;
use super::lead::Lead;
use super::opportunity::Opportunity;
use super::permission::{Access, AccessRequest, Asset};
use super::user::User;
use crate::error::{CrmError, FieldErrors};

/// Where the first name goes when rendering a full name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FullNameFormat {
    /// "First Last"
    #[default]
    Before,
    /// "Last, First"
    After,
}

impl FullNameFormat {
    /// `None` and `"before"` mean first-name-first; any other token flips it.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            None | Some("before") => FullNameFormat::Before,
            Some(_) => FullNameFormat::After,
        }
    }
}

/// Supported listing orders. Serialized as the order string, e.g.
/// `"last_name ASC"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContactSort {
    FirstNameAsc,
    LastNameAsc,
    #[default]
    CreatedAtDesc,
    UpdatedAtDesc,
}

impl ContactSort {
    pub const ALL: &'static [ContactSort] = &[
        ContactSort::FirstNameAsc,
        ContactSort::LastNameAsc,
        ContactSort::CreatedAtDesc,
        ContactSort::UpdatedAtDesc,
    ];

    pub fn from_order_str(s: &str) -> Option<Self> {
        match s.trim() {
            "first_name ASC" => Some(ContactSort::FirstNameAsc),
            "last_name ASC" => Some(ContactSort::LastNameAsc),
            "created_at DESC" => Some(ContactSort::CreatedAtDesc),
            "updated_at DESC" => Some(ContactSort::UpdatedAtDesc),
            _ => None,
        }
    }

    pub fn to_order_str(&self) -> &'static str {
        match self {
            ContactSort::FirstNameAsc => "first_name ASC",
            ContactSort::LastNameAsc => "last_name ASC",
            ContactSort::CreatedAtDesc => "created_at DESC",
            ContactSort::UpdatedAtDesc => "updated_at DESC",
        }
    }
}

impl TryFrom<String> for ContactSort {
    type Error = CrmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ContactSort::from_order_str(&value).ok_or(CrmError::UnknownSort(value))
    }
}

impl From<ContactSort> for String {
    fn from(sort: ContactSort) -> Self {
        sort.to_order_str().to_string()
    }
}

/// A person associated with a CRM account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub id: Option<Id<Contact>>,
    pub user_id: Option<Id<User>>,
    pub lead_id: Option<Id<Lead>>,
    pub assigned_to: Option<Id<User>>,
    pub reports_to: Option<Id<Contact>>,
    pub first_name: String,
    pub last_name: String,
    pub access: Access,
    pub title: Option<String>,
    pub department: Option<String>,
    pub source: Option<String>,
    pub email: Option<String>,
    pub alt_email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub fax: Option<String>,
    pub blog: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub do_not_call: bool,
    pub background_info: Option<String>,
    /// Exclusively owned; written and destroyed together with the contact.
    pub business_address: Option<Address>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    /// Soft-delete marker.
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub errors: FieldErrors,
}

impl Contact {
    pub fn create(first_name: String, last_name: String) -> Self {
        Self {
            first_name,
            last_name,
            ..Self::default()
        }
    }

    /// Builds an unsaved contact from a lead, field by field. Ownership,
    /// access and relationships are left for the caller.
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id,
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            title: lead.title.clone(),
            source: lead.source.clone(),
            email: lead.email.clone(),
            alt_email: lead.alt_email.clone(),
            phone: lead.phone.clone(),
            mobile: lead.mobile.clone(),
            blog: lead.blog.clone(),
            linkedin: lead.linkedin.clone(),
            facebook: lead.facebook.clone(),
            twitter: lead.twitter.clone(),
            do_not_call: lead.do_not_call,
            background_info: lead.background_info.clone(),
            business_address: lead.business_address.as_ref().map(Address::copy_as_business),
            ..Self::default()
        }
    }

    pub fn full_name(&self, format: Option<&str>) -> String {
        self.full_name_as(FullNameFormat::from_token(format))
    }

    pub fn full_name_as(&self, format: FullNameFormat) -> String {
        match format {
            FullNameFormat::Before => format!("{} {}", self.first_name, self.last_name),
            FullNameFormat::After => format!("{}, {}", self.last_name, self.first_name),
        }
    }

    pub fn name(&self) -> String {
        self.full_name(None)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Checks required names and that a shared contact has at least one
    /// grant. `grant_count` is the number of grants the contact will carry
    /// once saved.
    pub fn validate(&self, grant_count: usize) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.first_name.trim().is_empty() {
            errors.add("first_name", "missing_first_name");
        }
        if self.last_name.trim().is_empty() {
            errors.add("last_name", "missing_last_name");
        }
        if self.access == Access::Shared && grant_count == 0 {
            errors.add("access", "share_contact");
        }
        errors
    }
}

impl Asset for Contact {
    const ASSET_TYPE: &'static str = "Contact";

    fn asset_id(&self) -> Option<i64> {
        self.id.map(|id| id.value)
    }

    fn access(&self) -> Access {
        self.access
    }
}

/// Editable contact fields as submitted by the edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactAttributes {
    pub first_name: String,
    pub last_name: String,
    pub access: Access,
    pub assigned_to: Option<Id<User>>,
    pub reports_to: Option<Id<Contact>>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub source: Option<String>,
    pub email: Option<String>,
    pub alt_email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub fax: Option<String>,
    pub blog: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub do_not_call: bool,
    pub background_info: Option<String>,
    /// `None` removes the current business address.
    pub business_address: Option<Address>,
}

impl ContactAttributes {
    /// Snapshot of a contact's editable fields, for building edit forms.
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            access: contact.access,
            assigned_to: contact.assigned_to,
            reports_to: contact.reports_to,
            title: contact.title.clone(),
            department: contact.department.clone(),
            source: contact.source.clone(),
            email: contact.email.clone(),
            alt_email: contact.alt_email.clone(),
            phone: contact.phone.clone(),
            mobile: contact.mobile.clone(),
            fax: contact.fax.clone(),
            blog: contact.blog.clone(),
            linkedin: contact.linkedin.clone(),
            facebook: contact.facebook.clone(),
            twitter: contact.twitter.clone(),
            born_on: contact.born_on,
            do_not_call: contact.do_not_call,
            background_info: contact.background_info.clone(),
            business_address: contact.business_address.clone(),
        }
    }

    pub fn apply_to(&self, contact: &mut Contact) {
        contact.first_name = self.first_name.clone();
        contact.last_name = self.last_name.clone();
        contact.access = self.access;
        contact.assigned_to = self.assigned_to;
        contact.reports_to = self.reports_to;
        contact.title = self.title.clone();
        contact.department = self.department.clone();
        contact.source = self.source.clone();
        contact.email = self.email.clone();
        contact.alt_email = self.alt_email.clone();
        contact.phone = self.phone.clone();
        contact.mobile = self.mobile.clone();
        contact.fax = self.fax.clone();
        contact.blog = self.blog.clone();
        contact.linkedin = self.linkedin.clone();
        contact.facebook = self.facebook.clone();
        contact.twitter = self.twitter.clone();
        contact.born_on = self.born_on;
        contact.do_not_call = self.do_not_call;
        contact.background_info = self.background_info.clone();

        // Keep the existing row id so the address is updated in place.
        let existing_id = contact.business_address.as_ref().and_then(|a| a.id);
        contact.business_address = self.business_address.as_ref().map(|a| Address {
            id: a.id.or(existing_id),
            ..a.copy_as_business()
        });
    }
}

/// Parameters of the create/update contact forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactParams {
    pub account: AccountParams,
    /// Users to share with when access is Shared.
    pub users: Vec<Id<User>>,
    /// Opportunity to attach on create.
    pub opportunity: Option<Id<Opportunity>>,
    /// Field values; used by update only.
    pub contact: ContactAttributes,
}

/// Parameters of the lead conversion form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionParams {
    /// Owner and assignee of the converted records come from here.
    pub account: AccountParams,
    pub access: AccessRequest,
    pub users: Vec<Id<User>>,
}
