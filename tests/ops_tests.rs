use crm::db::*;
use crm::error::CrmError;
use crm::model::*;
use crm::ops::*;
use crm::queries::*;

fn setup() -> (rusqlite::Connection, Id<User>, Id<User>) {
    let conn = schema::test_connection();

    let mut owner = User::create("aaron".into(), "aaron@example.com".into());
    user_repo::insert(&conn, &mut owner).unwrap();
    let mut colleague = User::create("bea".into(), "bea@example.com".into());
    user_repo::insert(&conn, &mut colleague).unwrap();

    (conn, owner.id.unwrap(), colleague.id.unwrap())
}

fn new_contact(owner: Id<User>, first: &str, last: &str) -> Contact {
    let mut contact = Contact::create(first.into(), last.into());
    contact.user_id = Some(owner);
    contact
}

fn saved_opportunity(conn: &rusqlite::Connection, owner: Id<User>, name: &str) -> Opportunity {
    let mut opportunity = Opportunity::create(name.into());
    opportunity.user_id = Some(owner);
    opportunity_repo::insert(conn, &mut opportunity).unwrap();
    opportunity
}

fn saved_account(conn: &rusqlite::Connection, owner: Id<User>, name: &str) -> Account {
    let mut account = Account::create(name.into());
    account.user_id = Some(owner);
    account_repo::insert(conn, &mut account).unwrap();
    account
}

fn full_lead(owner: Id<User>) -> Lead {
    Lead {
        user_id: Some(owner),
        first_name: "Lena".into(),
        last_name: "Hart".into(),
        title: Some("CTO".into()),
        company: Some("Hart Labs".into()),
        source: Some("conference".into()),
        email: Some("lena@hartlabs.io".into()),
        alt_email: Some("lena@example.com".into()),
        phone: Some("555-0100".into()),
        mobile: Some("555-0101".into()),
        blog: Some("https://hartlabs.io/blog".into()),
        linkedin: Some("lenahart".into()),
        facebook: Some("lena.hart".into()),
        twitter: Some("@lenahart".into()),
        do_not_call: true,
        background_info: Some("Met at RustConf".into()),
        business_address: Some(Address {
            street1: Some("1 Harbor Way".into()),
            street2: Some("Suite 4".into()),
            city: Some("Portland".into()),
            state: Some("OR".into()),
            zipcode: Some("97201".into()),
            country: Some("USA".into()),
            full_address: Some("1 Harbor Way\nSuite 4\nPortland, OR 97201".into()),
            ..Address::business()
        }),
        ..Lead::default()
    }
}

fn conversion_params(owner: Id<User>, access: AccessRequest, users: Vec<Id<User>>) -> ConversionParams {
    ConversionParams {
        account: AccountParams {
            user_id: Some(owner),
            assigned_to: Some(owner),
            ..AccountParams::default()
        },
        access,
        users,
    }
}

// ==========================================================================
// VALIDATION
// ==========================================================================

#[test]
fn save_without_first_name_fails() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "", "Jones");

    let err = permission_ops::save_with_permissions(&conn, &mut contact, &[]).unwrap_err();

    assert_eq!(err.field_errors().unwrap().on("first_name"), vec!["missing_first_name"]);
    assert_eq!(contact.errors.on("first_name"), vec!["missing_first_name"]);
    assert!(contact.id.is_none());
}

#[test]
fn save_without_last_name_fails() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "   ");

    let result = permission_ops::save_with_permissions(&conn, &mut contact, &[]);

    assert!(matches!(result, Err(CrmError::Invalid { .. })));
    assert_eq!(contact.errors.on("last_name"), vec!["missing_last_name"]);
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
}

#[test]
fn shared_contact_without_grants_fails() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.access = Access::Shared;

    let result = permission_ops::save_with_permissions(&conn, &mut contact, &[]);

    assert!(result.is_err());
    assert_eq!(contact.errors.on("access"), vec!["share_contact"]);
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
}

#[test]
fn shared_contact_with_a_grant_saves() {
    let (conn, owner, colleague) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.access = Access::Shared;

    permission_ops::save_with_permissions(&conn, &mut contact, &[colleague]).unwrap();

    assert!(contact.id.is_some());
    assert!(contact.errors.is_empty());
    assert_eq!(permission_ops::granted_users(&conn, &contact).unwrap(), vec![colleague]);
}

#[test]
fn users_are_ignored_unless_shared() {
    let (conn, owner, colleague) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.access = Access::Public;

    permission_ops::save_with_permissions(&conn, &mut contact, &[colleague]).unwrap();

    assert!(permission_ops::granted_users(&conn, &contact).unwrap().is_empty());
}

// ==========================================================================
// CREATE WITH ACCOUNT AND PERMISSIONS
// ==========================================================================

#[test]
fn create_links_selected_account() {
    let (conn, owner, _) = setup();
    let account = saved_account(&conn, owner, "Acme");
    let mut contact = new_contact(owner, "Ann", "Lee");
    let params = ContactParams {
        account: AccountParams::existing(account.id.unwrap()),
        ..ContactParams::default()
    };

    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    let contact_id = contact.id.unwrap();
    assert_eq!(account_repo::count_links_for_contact(&conn, contact_id).unwrap(), 1);
    let linked = contact_queries::account_for(&conn, &contact).unwrap().unwrap();
    assert_eq!(linked.id, account.id);
    assert_eq!(linked.name, "Acme");
}

#[test]
fn create_makes_a_new_account_from_params() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    let params = ContactParams {
        account: AccountParams::new_account("Globex", owner),
        ..ContactParams::default()
    };

    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    assert_eq!(account_repo::count(&conn).unwrap(), 1);
    let linked = contact_queries::account_for(&conn, &contact).unwrap().unwrap();
    assert_eq!(linked.name, "Globex");
    assert_eq!(linked.user_id, Some(owner));
}

#[test]
fn create_without_account_name_saves_unlinked_contact() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");

    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &ContactParams::default())
        .unwrap();

    assert!(contact.id.is_some());
    assert_eq!(account_repo::count(&conn).unwrap(), 0);
    assert!(contact_queries::account_for(&conn, &contact).unwrap().is_none());
}

#[test]
fn create_with_unknown_account_id_fails() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    let params = ContactParams {
        account: AccountParams::existing(Id::new(999)),
        ..ContactParams::default()
    };

    let result = contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params);

    assert!(matches!(result, Err(CrmError::NotFound { .. })));
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
}

#[test]
fn create_attaches_requested_opportunity() {
    let (conn, owner, _) = setup();
    let deal = saved_opportunity(&conn, owner, "Big deal");
    let mut contact = new_contact(owner, "Ann", "Lee");
    let params = ContactParams {
        opportunity: deal.id,
        ..ContactParams::default()
    };

    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    let opportunities = contact_queries::opportunities_for(&conn, &contact).unwrap();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].id, deal.id);
}

#[test]
fn opportunity_list_stays_distinct_and_id_descending() {
    let (conn, owner, _) = setup();
    let first = saved_opportunity(&conn, owner, "First");
    let second = saved_opportunity(&conn, owner, "Second");
    let third = saved_opportunity(&conn, owner, "Third");
    let mut contact = new_contact(owner, "Ann", "Lee");
    let params = ContactParams {
        opportunity: first.id,
        ..ContactParams::default()
    };
    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    let contact_id = contact.id.unwrap();
    for opportunity in [&third, &first, &second, &third] {
        opportunity_repo::link_contact(&conn, contact_id, opportunity.id.unwrap()).unwrap();
    }

    let ids: Vec<_> = contact_queries::opportunities_for(&conn, &contact)
        .unwrap()
        .into_iter()
        .map(|o| o.id.unwrap())
        .collect();
    assert_eq!(ids, vec![third.id.unwrap(), second.id.unwrap(), first.id.unwrap()]);
}

#[test]
fn create_with_unknown_opportunity_fails() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    let params = ContactParams {
        opportunity: Some(Id::new(404)),
        ..ContactParams::default()
    };

    let result = contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params);

    assert!(result.is_err());
    assert!(contact.id.is_none());
}

#[test]
fn failed_create_rolls_back_new_account() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "", "Lee");
    let params = ContactParams {
        account: AccountParams::new_account("Initech", owner),
        ..ContactParams::default()
    };

    let result = contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params);

    assert!(matches!(result, Err(CrmError::Invalid { .. })));
    assert_eq!(contact.errors.on("first_name"), vec!["missing_first_name"]);
    assert!(contact.id.is_none());
    assert_eq!(account_repo::count(&conn).unwrap(), 0);
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
}

#[test]
fn create_shares_with_listed_users() {
    let (conn, owner, colleague) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.access = Access::Shared;
    let params = ContactParams {
        users: vec![colleague],
        ..ContactParams::default()
    };

    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    assert_eq!(permission_ops::granted_users(&conn, &contact).unwrap(), vec![colleague]);
}

#[test]
fn create_records_an_activity() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");

    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &ContactParams::default())
        .unwrap();

    let activities = contact_queries::activities_for(&conn, &contact).unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].action, "created");
    assert_eq!(activities[0].user_id, Some(owner));
}

// ==========================================================================
// UPDATE WITH ACCOUNT AND PERMISSIONS
// ==========================================================================

fn created_contact(conn: &rusqlite::Connection, owner: Id<User>, params: &ContactParams) -> Contact {
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.access = params.contact.access;
    contact_ops::create_with_account_and_permissions(conn, &mut contact, params).unwrap();
    contact
}

#[test]
fn update_applies_fields_and_links_account() {
    let (conn, owner, _) = setup();
    let mut contact = created_contact(&conn, owner, &ContactParams::default());
    let account = saved_account(&conn, owner, "Acme");

    let mut attributes = ContactAttributes::from_contact(&contact);
    attributes.first_name = "Annie".into();
    attributes.title = Some("VP Sales".into());
    let params = ContactParams {
        account: AccountParams::existing(account.id.unwrap()),
        contact: attributes,
        ..ContactParams::default()
    };

    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    let stored = contact_repo::find_by_id(&conn, contact.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.first_name, "Annie");
    assert_eq!(stored.title, Some("VP Sales".into()));
    assert_eq!(contact_queries::account_for(&conn, &stored).unwrap().unwrap().id, account.id);
}

#[test]
fn update_replaces_previous_account_link() {
    let (conn, owner, _) = setup();
    let first = saved_account(&conn, owner, "First Co");
    let second = saved_account(&conn, owner, "Second Co");
    let mut contact = created_contact(
        &conn,
        owner,
        &ContactParams {
            account: AccountParams::existing(first.id.unwrap()),
            ..ContactParams::default()
        },
    );

    let params = ContactParams {
        account: AccountParams::existing(second.id.unwrap()),
        contact: ContactAttributes::from_contact(&contact),
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    let contact_id = contact.id.unwrap();
    assert_eq!(account_repo::count_links_for_contact(&conn, contact_id).unwrap(), 1);
    assert_eq!(contact_queries::account_for(&conn, &contact).unwrap().unwrap().id, second.id);
}

#[test]
fn update_leaves_opportunities_alone() {
    let (conn, owner, _) = setup();
    let deal = saved_opportunity(&conn, owner, "Deal");
    let mut contact = created_contact(
        &conn,
        owner,
        &ContactParams {
            opportunity: deal.id,
            ..ContactParams::default()
        },
    );

    let other = saved_opportunity(&conn, owner, "Other");
    let params = ContactParams {
        opportunity: other.id,
        contact: ContactAttributes::from_contact(&contact),
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    let opportunities = contact_queries::opportunities_for(&conn, &contact).unwrap();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].id, deal.id);
}

#[test]
fn update_to_private_drops_grants() {
    let (conn, owner, colleague) = setup();
    let mut contact = created_contact(
        &conn,
        owner,
        &ContactParams {
            users: vec![colleague],
            contact: ContactAttributes {
                access: Access::Shared,
                ..ContactAttributes::default()
            },
            ..ContactParams::default()
        },
    );
    assert_eq!(permission_ops::granted_users(&conn, &contact).unwrap(), vec![colleague]);

    let mut attributes = ContactAttributes::from_contact(&contact);
    attributes.access = Access::Private;
    let params = ContactParams {
        users: vec![colleague],
        contact: attributes,
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    assert!(permission_ops::granted_users(&conn, &contact).unwrap().is_empty());
}

#[test]
fn update_shared_without_users_keeps_existing_grants() {
    let (conn, owner, colleague) = setup();
    let mut contact = created_contact(
        &conn,
        owner,
        &ContactParams {
            users: vec![colleague],
            contact: ContactAttributes {
                access: Access::Shared,
                ..ContactAttributes::default()
            },
            ..ContactParams::default()
        },
    );

    let params = ContactParams {
        contact: ContactAttributes::from_contact(&contact),
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    assert_eq!(permission_ops::granted_users(&conn, &contact).unwrap(), vec![colleague]);
}

#[test]
fn update_shared_replaces_grants_with_listed_users() {
    let (conn, owner, colleague) = setup();
    let mut contact = created_contact(
        &conn,
        owner,
        &ContactParams {
            users: vec![colleague],
            contact: ContactAttributes {
                access: Access::Shared,
                ..ContactAttributes::default()
            },
            ..ContactParams::default()
        },
    );

    let params = ContactParams {
        users: vec![owner],
        contact: ContactAttributes::from_contact(&contact),
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    assert_eq!(permission_ops::granted_users(&conn, &contact).unwrap(), vec![owner]);
}

#[test]
fn update_to_shared_without_any_grant_is_rejected() {
    let (conn, owner, _) = setup();
    let mut contact = created_contact(&conn, owner, &ContactParams::default());

    let mut attributes = ContactAttributes::from_contact(&contact);
    attributes.access = Access::Shared;
    attributes.last_name = "Changed".into();
    let params = ContactParams {
        contact: attributes,
        ..ContactParams::default()
    };
    let result = contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params);

    assert!(matches!(result, Err(CrmError::Invalid { .. })));
    assert_eq!(contact.errors.on("access"), vec!["share_contact"]);
    let stored = contact_repo::find_by_id(&conn, contact.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.last_name, "Lee");
    assert_eq!(stored.access, Access::Private);
}

#[test]
fn update_can_remove_business_address() {
    let (conn, owner, _) = setup();
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.business_address = Some(Address {
        city: Some("Oslo".into()),
        ..Address::business()
    });
    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &ContactParams::default())
        .unwrap();
    let contact_id = contact.id.unwrap();
    assert_eq!(address_repo::count_for(&conn, "Contact", contact_id.value).unwrap(), 1);

    let mut attributes = ContactAttributes::from_contact(&contact);
    attributes.business_address = None;
    let params = ContactParams {
        contact: attributes,
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &params).unwrap();

    assert_eq!(address_repo::count_for(&conn, "Contact", contact_id.value).unwrap(), 0);
}

#[test]
fn failed_update_forgets_address_row_and_retry_stores_it() {
    let (conn, owner, colleague) = setup();
    let mut contact = created_contact(&conn, owner, &ContactParams::default());
    let contact_id = contact.id.unwrap();

    let mut attributes = ContactAttributes::from_contact(&contact);
    attributes.access = Access::Shared;
    attributes.business_address = Some(Address {
        city: Some("Lyon".into()),
        ..Address::business()
    });
    let failing = ContactParams {
        users: vec![Id::new(999)],
        contact: attributes.clone(),
        ..ContactParams::default()
    };
    let result = contact_ops::update_with_account_and_permissions(&conn, &mut contact, &failing);

    assert!(matches!(result, Err(CrmError::Database(_))));
    assert_eq!(contact.business_address.as_ref().unwrap().id, None);
    assert_eq!(address_repo::count_for(&conn, "Contact", contact_id.value).unwrap(), 0);

    let retry = ContactParams {
        users: vec![colleague],
        contact: attributes,
        ..ContactParams::default()
    };
    contact_ops::update_with_account_and_permissions(&conn, &mut contact, &retry).unwrap();

    assert_eq!(address_repo::count_for(&conn, "Contact", contact_id.value).unwrap(), 1);
    let stored = contact_repo::find_by_id(&conn, contact_id).unwrap().unwrap();
    let address = stored.business_address.unwrap();
    assert_eq!(address.city, Some("Lyon".into()));
    assert_eq!(Some(address.id.unwrap()), contact.business_address.unwrap().id);
}

// ==========================================================================
// CREATE FOR (LEAD CONVERSION)
// ==========================================================================

#[test]
fn create_for_copies_lead_fields_and_address() {
    let (conn, owner, _) = setup();
    let mut lead = full_lead(owner);
    lead_repo::insert(&conn, &mut lead).unwrap();
    let account = saved_account(&conn, owner, "Hart Labs");
    let deal = saved_opportunity(&conn, owner, "Hart Labs pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Public, vec![]),
    )
    .unwrap();

    assert!(contact.errors.is_empty());
    let stored = contact_repo::find_by_id(&conn, contact.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.lead_id, lead.id);
    assert_eq!(stored.user_id, Some(owner));
    assert_eq!(stored.assigned_to, Some(owner));
    assert_eq!(stored.access, Access::Public);
    assert_eq!(stored.first_name, lead.first_name);
    assert_eq!(stored.last_name, lead.last_name);
    assert_eq!(stored.title, lead.title);
    assert_eq!(stored.source, lead.source);
    assert_eq!(stored.email, lead.email);
    assert_eq!(stored.alt_email, lead.alt_email);
    assert_eq!(stored.phone, lead.phone);
    assert_eq!(stored.mobile, lead.mobile);
    assert_eq!(stored.blog, lead.blog);
    assert_eq!(stored.linkedin, lead.linkedin);
    assert_eq!(stored.facebook, lead.facebook);
    assert_eq!(stored.twitter, lead.twitter);
    assert_eq!(stored.do_not_call, lead.do_not_call);
    assert_eq!(stored.background_info, lead.background_info);

    let lead_address = lead.business_address.as_ref().unwrap();
    let address = stored.business_address.unwrap();
    assert_eq!(address.address_type, AddressType::Business);
    assert_ne!(address.id, lead_address.id);
    assert_eq!(address.street1, lead_address.street1);
    assert_eq!(address.street2, lead_address.street2);
    assert_eq!(address.city, lead_address.city);
    assert_eq!(address.state, lead_address.state);
    assert_eq!(address.zipcode, lead_address.zipcode);
    assert_eq!(address.country, lead_address.country);
    assert_eq!(address.full_address, lead_address.full_address);
    assert_eq!(address_repo::count_for(&conn, "Lead", lead.id.unwrap().value).unwrap(), 1);
}

#[test]
fn create_for_links_account_and_opportunity() {
    let (conn, owner, _) = setup();
    let mut lead = full_lead(owner);
    lead_repo::insert(&conn, &mut lead).unwrap();
    let account = saved_account(&conn, owner, "Hart Labs");
    let deal = saved_opportunity(&conn, owner, "Pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Private, vec![]),
    )
    .unwrap();

    assert_eq!(contact_queries::account_for(&conn, &contact).unwrap().unwrap().id, account.id);
    let opportunities = contact_queries::opportunities_for(&conn, &contact).unwrap();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].id, deal.id);
}

#[test]
fn create_for_skips_unsaved_account_and_opportunity() {
    let (conn, owner, _) = setup();
    let mut lead = full_lead(owner);
    lead_repo::insert(&conn, &mut lead).unwrap();

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &Account::create("Not saved".into()),
        &Opportunity::create("Not saved".into()),
        &conversion_params(owner, AccessRequest::Private, vec![]),
    )
    .unwrap();

    assert!(contact.id.is_some());
    assert!(contact_queries::account_for(&conn, &contact).unwrap().is_none());
    assert!(contact_queries::opportunities_for(&conn, &contact).unwrap().is_empty());
}

#[test]
fn create_for_with_account_errors_returns_unsaved_contact() {
    let (conn, owner, _) = setup();
    let lead = full_lead(owner);
    let mut account = Account::create(String::new());
    account.errors.add("name", "missing_account_name");
    let deal = saved_opportunity(&conn, owner, "Pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Private, vec![]),
    )
    .unwrap();

    assert!(contact.id.is_none());
    assert_eq!(contact.first_name, "Lena");
    assert_eq!(contact.business_address.as_ref().unwrap().address_type, AddressType::Business);
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
}

#[test]
fn create_for_with_opportunity_errors_returns_unsaved_contact() {
    let (conn, owner, _) = setup();
    let lead = full_lead(owner);
    let account = saved_account(&conn, owner, "Hart Labs");
    let mut deal = Opportunity::create(String::new());
    deal.errors.add("name", "missing_opportunity_name");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Private, vec![]),
    )
    .unwrap();

    assert!(contact.id.is_none());
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
    assert_eq!(address_repo::count_for(&conn, "Contact", 1).unwrap(), 0);
}

#[test]
fn create_for_reports_contact_validation_errors() {
    let (conn, owner, _) = setup();
    let mut lead = full_lead(owner);
    lead.last_name = String::new();
    let account = saved_account(&conn, owner, "Hart Labs");
    let deal = saved_opportunity(&conn, owner, "Pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Shared, vec![]),
    )
    .unwrap();

    assert!(contact.id.is_none());
    assert!(contact.business_address.as_ref().unwrap().id.is_none());
    assert_eq!(contact.errors.on("last_name"), vec!["missing_last_name"]);
    assert_eq!(contact.errors.on("access"), vec!["share_contact"]);
    assert_eq!(contact_repo::count(&conn).unwrap(), 0);
}

#[test]
fn create_for_shared_grants_listed_users() {
    let (conn, owner, colleague) = setup();
    let mut lead = full_lead(owner);
    lead_repo::insert(&conn, &mut lead).unwrap();
    let account = saved_account(&conn, owner, "Hart Labs");
    let deal = saved_opportunity(&conn, owner, "Pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Shared, vec![colleague]),
    )
    .unwrap();

    assert_eq!(contact.access, Access::Shared);
    assert_eq!(permission_ops::granted_users(&conn, &contact).unwrap(), vec![colleague]);
}

#[test]
fn create_for_same_as_lead_copies_lead_sharing() {
    let (conn, owner, colleague) = setup();
    let mut lead = full_lead(owner);
    lead.access = Access::Shared;
    lead_repo::insert(&conn, &mut lead).unwrap();
    permission_repo::grant(&conn, colleague, "Lead", lead.id.unwrap().value).unwrap();
    let account = saved_account(&conn, owner, "Hart Labs");
    let deal = saved_opportunity(&conn, owner, "Pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Lead, vec![owner]),
    )
    .unwrap();

    let stored = contact_repo::find_by_id(&conn, contact.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.access, Access::Shared);
    assert_eq!(permission_ops::granted_users(&conn, &stored).unwrap(), vec![colleague]);
}

#[test]
fn create_for_same_as_private_lead_is_private() {
    let (conn, owner, _) = setup();
    let mut lead = full_lead(owner);
    lead_repo::insert(&conn, &mut lead).unwrap();
    let account = saved_account(&conn, owner, "Hart Labs");
    let deal = saved_opportunity(&conn, owner, "Pilot");

    let contact = contact_ops::create_for(
        &conn,
        &lead,
        &account,
        &deal,
        &conversion_params(owner, AccessRequest::Lead, vec![]),
    )
    .unwrap();

    assert_eq!(contact.access, Access::Private);
    assert!(contact.id.is_some());
}

#[test]
fn lead_access_for_new_account_follows_context() {
    let (conn, owner, colleague) = setup();
    let mut lead = full_lead(owner);
    lead.access = Access::Shared;
    lead_repo::insert(&conn, &mut lead).unwrap();
    permission_repo::grant(&conn, colleague, "Lead", lead.id.unwrap().value).unwrap();

    let params = AccountParams {
        name: Some("Hart Labs".into()),
        user_id: Some(owner),
        access: AccessRequest::Lead,
        ..AccountParams::default()
    };
    let account = account_ops::create_or_select_for(&conn, Some(&lead), &params, &[]).unwrap();

    assert_eq!(account.access, Access::Shared);
    assert_eq!(permission_ops::granted_users(&conn, &account).unwrap(), vec![colleague]);
}

#[test]
fn invalid_new_account_is_returned_with_errors() {
    let (conn, owner, _) = setup();
    let params = AccountParams {
        name: Some("  ".into()),
        user_id: Some(owner),
        ..AccountParams::default()
    };

    let account = account_ops::create_or_select_for::<Contact>(&conn, None, &params, &[]).unwrap();

    assert!(account.id.is_none());
    assert_eq!(account.errors.on("name"), vec!["missing_account_name"]);
}

// ==========================================================================
// DELETE / DESTROY
// ==========================================================================

#[test]
fn soft_delete_hides_contact_and_restore_brings_it_back() {
    let (conn, owner, _) = setup();
    let contact = created_contact(&conn, owner, &ContactParams::default());
    let contact_id = contact.id.unwrap();

    let deleted = contact_ops::soft_delete(&conn, contact_id).unwrap();
    assert!(deleted.is_deleted());
    assert!(contact_repo::find_by_id(&conn, contact_id).unwrap().is_none());
    assert!(contact_repo::find_with_deleted(&conn, contact_id).unwrap().unwrap().deleted_at.is_some());

    let restored = contact_ops::restore(&conn, contact_id).unwrap();
    assert!(!restored.is_deleted());
    assert!(contact_repo::find_by_id(&conn, contact_id).unwrap().is_some());
}

#[test]
fn soft_delete_unknown_contact_fails() {
    let (conn, _, _) = setup();
    let result = contact_ops::soft_delete(&conn, Id::new(77));
    assert!(matches!(result, Err(CrmError::NotFound { .. })));
}

#[test]
fn destroy_removes_dependents_and_keeps_activities() {
    let (conn, owner, colleague) = setup();
    let account = saved_account(&conn, owner, "Acme");
    let deal = saved_opportunity(&conn, owner, "Deal");
    let mut contact = new_contact(owner, "Ann", "Lee");
    contact.access = Access::Shared;
    contact.business_address = Some(Address {
        street1: Some("2 Main St".into()),
        ..Address::business()
    });
    let params = ContactParams {
        account: AccountParams::existing(account.id.unwrap()),
        users: vec![colleague],
        opportunity: deal.id,
        ..ContactParams::default()
    };
    contact_ops::create_with_account_and_permissions(&conn, &mut contact, &params).unwrap();
    task_ops::add_task(&conn, &contact, owner, "Call back").unwrap();
    comment_ops::add_comment(&conn, &contact, colleague, "Prefers email").unwrap();

    let contact_id = contact.id.unwrap();
    contact_ops::destroy(&conn, &mut contact).unwrap();

    assert!(contact.is_deleted());
    assert!(contact_repo::find_by_id(&conn, contact_id).unwrap().is_none());
    assert_eq!(address_repo::count_for(&conn, "Contact", contact_id.value).unwrap(), 0);
    assert_eq!(account_repo::count_links_for_contact(&conn, contact_id).unwrap(), 0);
    assert_eq!(opportunity_repo::count_links_for_contact(&conn, contact_id).unwrap(), 0);
    assert!(task_repo::find_tasks_for(&conn, "Contact", contact_id.value).unwrap().is_empty());
    assert!(comment_repo::find_for(&conn, "Contact", contact_id.value).unwrap().is_empty());
    assert!(permission_repo::find_for(&conn, "Contact", contact_id.value).unwrap().is_empty());

    // The account and opportunity themselves survive.
    assert!(account_repo::find_by_id(&conn, account.id.unwrap()).unwrap().is_some());
    assert!(opportunity_repo::find_by_id(&conn, deal.id.unwrap()).unwrap().is_some());

    let actions: Vec<String> = task_repo::find_activities_for(&conn, "Contact", contact_id.value)
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect();
    assert_eq!(actions, vec!["deleted".to_string(), "created".to_string()]);
}

// ==========================================================================
// COMMENTS AND TASKS
// ==========================================================================

#[test]
fn comments_are_listed_newest_first() {
    let (conn, owner, colleague) = setup();
    let contact = created_contact(&conn, owner, &ContactParams::default());

    comment_ops::add_comment(&conn, &contact, owner, "First").unwrap();
    comment_ops::add_comment(&conn, &contact, colleague, "Second").unwrap();

    let texts: Vec<String> = comment_ops::comments_for(&conn, &contact)
        .unwrap()
        .into_iter()
        .map(|c| c.comment)
        .collect();
    assert_eq!(texts, vec!["Second".to_string(), "First".to_string()]);
}

#[test]
fn blank_comment_is_rejected() {
    let (conn, owner, _) = setup();
    let contact = created_contact(&conn, owner, &ContactParams::default());
    assert!(comment_ops::add_comment(&conn, &contact, owner, "   ").is_err());
}

#[test]
fn comment_on_unsaved_contact_is_rejected() {
    let (conn, owner, _) = setup();
    let contact = new_contact(owner, "Ann", "Lee");
    assert!(comment_ops::add_comment(&conn, &contact, owner, "Hello").is_err());
}

#[test]
fn tasks_are_listed_newest_first() {
    let (conn, owner, _) = setup();
    let contact = created_contact(&conn, owner, &ContactParams::default());

    task_ops::add_task(&conn, &contact, owner, "Send proposal").unwrap();
    task_ops::add_task(&conn, &contact, owner, "Follow up").unwrap();

    let names: Vec<String> = contact_queries::tasks_for(&conn, &contact)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Follow up".to_string(), "Send proposal".to_string()]);
}
