pub mod context;
pub mod contact_commands;

use std::path::Path;

use crate::config::ContactSettings;
use crate::db::schema;
use crate::error::CrmResult;
use crate::model::{Contact, ContactSort, Id};
use context::CLIContext;

/// A single command-line action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { page: u32, sort: Option<ContactSort> },
    Search { query: String },
    Show { id: Id<Contact> },
    Delete { id: Id<Contact> },
    Export { path: String },
}

/// Opens the database and runs one command against it.
pub fn run(db_path: &Path, settings: ContactSettings, command: Command) -> CrmResult<()> {
    let conn = schema::open(db_path)?;
    let ctx = CLIContext::new(conn, settings);

    match command {
        Command::List { page, sort } => contact_commands::list(&ctx, page, sort),
        Command::Search { query } => contact_commands::search(&ctx, &query),
        Command::Show { id } => contact_commands::show(&ctx, id),
        Command::Delete { id } => contact_commands::delete(&ctx, id),
        Command::Export { path } => contact_commands::export(&ctx, Path::new(&path)),
    }
}
