use std::path::Path;

use crate::cli::context::CLIContext;
use crate::db::contact_repo;
use crate::error::{CrmError, CrmResult};
use crate::export;
use crate::model::{Contact, ContactSort, Id};
use crate::ops::{comment_ops, contact_ops};
use crate::queries::contact_queries;

pub fn list(ctx: &CLIContext, page: u32, sort: Option<ContactSort>) -> CrmResult<()> {
    let sort = sort.unwrap_or(ctx.settings.sort);
    let listing = contact_queries::list(&ctx.conn, sort, page, ctx.settings.per_page)?;

    if listing.items.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    println!(
        "Contacts (page {} of {}, {} total):",
        listing.page,
        listing.total_pages(),
        listing.total
    );
    for contact in &listing.items {
        println!("  {}", ctx.format_line(contact)?);
    }
    if listing.has_next() {
        println!("More: --page {}", listing.page + 1);
    }
    Ok(())
}

pub fn search(ctx: &CLIContext, query: &str) -> CrmResult<()> {
    let found = contact_queries::search(&ctx.conn, query, ctx.settings.sort)?;
    if found.is_empty() {
        println!("No contacts match '{}'", query);
        return Ok(());
    }
    println!("{} match(es):", found.len());
    for contact in &found {
        println!("  {}", ctx.format_line(contact)?);
    }
    Ok(())
}

pub fn show(ctx: &CLIContext, id: Id<Contact>) -> CrmResult<()> {
    let contact = contact_queries::get_contact(&ctx.conn, id)?
        .ok_or_else(|| CrmError::not_found("Contact", id))?;

    println!("{}", ctx.display_name(&contact));
    let fields = [
        ("Title", &contact.title),
        ("Department", &contact.department),
        ("Email", &contact.email),
        ("Alternative email", &contact.alt_email),
        ("Phone", &contact.phone),
        ("Mobile", &contact.mobile),
        ("Fax", &contact.fax),
        ("Website/Blog", &contact.blog),
        ("LinkedIn", &contact.linkedin),
        ("Facebook", &contact.facebook),
        ("Twitter", &contact.twitter),
        ("Background", &contact.background_info),
    ];
    for (label, value) in fields {
        if let Some(v) = value {
            println!("  {}: {}", label, v);
        }
    }
    if let Some(born_on) = contact.born_on {
        println!("  Born on: {}", born_on);
    }
    if contact.do_not_call {
        println!("  Do not call");
    }
    println!("  Access: {}", contact.access.to_db_str());
    if let Some(address) = &contact.business_address {
        println!("  Address: {}", address.full_address_without_line_breaks());
    }

    if let Some(account) = contact_queries::account_for(&ctx.conn, &contact)? {
        println!("  Account: {}", account.name);
    }

    let opportunities = contact_queries::opportunities_for(&ctx.conn, &contact)?;
    if !opportunities.is_empty() {
        println!("  Opportunities:");
        for opportunity in &opportunities {
            println!("    {}", opportunity.name);
        }
    }

    let tasks = contact_queries::tasks_for(&ctx.conn, &contact)?;
    if !tasks.is_empty() {
        println!("  Tasks:");
        for task in &tasks {
            println!("    {}", task.name);
        }
    }

    let comments = comment_ops::comments_for(&ctx.conn, &contact)?;
    if !comments.is_empty() {
        println!("  Comments:");
        for comment in &comments {
            println!("    {}", comment.comment);
        }
    }

    let activities = contact_queries::activities_for(&ctx.conn, &contact)?;
    if let Some(latest) = activities.first() {
        let when = latest
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("  Last activity: {} {}", latest.action, when);
    }
    Ok(())
}

pub fn delete(ctx: &CLIContext, id: Id<Contact>) -> CrmResult<()> {
    let mut contact = contact_queries::get_contact(&ctx.conn, id)?
        .ok_or_else(|| CrmError::not_found("Contact", id))?;
    contact_ops::destroy(&ctx.conn, &mut contact)?;
    println!("Deleted {}", ctx.display_name(&contact));
    Ok(())
}

pub fn export(ctx: &CLIContext, path: &Path) -> CrmResult<()> {
    let contacts = contact_repo::find_all(&ctx.conn, ctx.settings.sort)?;
    export::export_to_file(path, &contacts)?;
    println!("Exported {} contacts to {}", contacts.len(), path.display());
    Ok(())
}
