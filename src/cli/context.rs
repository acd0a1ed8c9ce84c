use rusqlite::Connection;

use crate::config::{ContactSettings, Outline};
use crate::db::account_repo;
use crate::error::CrmResult;
use crate::model::Contact;

pub struct CLIContext {
    pub conn: Connection,
    pub settings: ContactSettings,
}

impl CLIContext {
    pub fn new(conn: Connection, settings: ContactSettings) -> Self {
        Self { conn, settings }
    }

    pub fn display_name(&self, contact: &Contact) -> String {
        contact.full_name_as(self.settings.first_name_position)
    }

    /// One listing line, shaped by the configured outline.
    pub fn format_line(&self, contact: &Contact) -> CrmResult<String> {
        let id = contact.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let name = self.display_name(contact);
        let line = match self.settings.outline {
            Outline::Brief => format!("#{} {}", id, name),
            Outline::Long => {
                let mut parts = Vec::new();
                if let Some(title) = &contact.title {
                    parts.push(title.clone());
                }
                if let Some(contact_id) = contact.id {
                    if let Some(account) = account_repo::find_for_contact(&self.conn, contact_id)? {
                        parts.push(format!("at {}", account.name));
                    }
                }
                if let Some(email) = &contact.email {
                    parts.push(email.clone());
                }
                if let Some(phone) = contact.phone.as_ref().or(contact.mobile.as_ref()) {
                    parts.push(phone.clone());
                }
                if parts.is_empty() {
                    format!("#{} {}", id, name)
                } else {
                    format!("#{} {} | {}", id, name, parts.join(" | "))
                }
            }
        };
        Ok(line)
    }
}
