use std::io::Write;
use std::path::Path;

use log::info;

use crate::error::CrmResult;
use crate::model::Contact;

/// Column labels, in export order.
pub const CSV_HEADERS: [&str; 15] = [
    "First name",
    "Last name",
    "Email",
    "Phone",
    "Title",
    "Department",
    "Alternative email",
    "Mobile",
    "Address",
    "Fax",
    "Do not call",
    "Website/Blog",
    "LinkedIn",
    "Facebook",
    "Twitter",
];

pub fn csv_row(contact: &Contact) -> [String; 15] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        contact.first_name.clone(),
        contact.last_name.clone(),
        text(&contact.email),
        text(&contact.phone),
        text(&contact.title),
        text(&contact.department),
        text(&contact.alt_email),
        text(&contact.mobile),
        contact
            .business_address
            .as_ref()
            .map(|a| a.full_address_without_line_breaks())
            .unwrap_or_default(),
        text(&contact.fax),
        contact.do_not_call.to_string(),
        text(&contact.blog),
        text(&contact.linkedin),
        text(&contact.facebook),
        text(&contact.twitter),
    ]
}

/// Writes a header row followed by one row per contact.
pub fn write_csv<W: Write>(writer: W, contacts: &[Contact]) -> CrmResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;
    for contact in contacts {
        wtr.write_record(csv_row(contact))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_file(path: &Path, contacts: &[Contact]) -> CrmResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(file, contacts)?;
    info!(
        "event=contacts_export status=ok rows={} path={}",
        contacts.len(),
        path.display()
    );
    Ok(())
}
