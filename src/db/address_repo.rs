use log::warn;
use rusqlite::{params, Connection};

use crate::error::{CrmError, CrmResult};
use crate::model::{Address, AddressType, Id};

pub fn insert(
    conn: &Connection,
    addressable_type: &str,
    addressable_id: i64,
    address: &mut Address,
) -> CrmResult<()> {
    conn.execute(
        "INSERT INTO addresses (addressable_type, addressable_id, address_type, street1, street2,
         city, state, zipcode, country, full_address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            addressable_type,
            addressable_id,
            address.address_type.to_db_str(),
            address.street1,
            address.street2,
            address.city,
            address.state,
            address.zipcode,
            address.country,
            address.full_address,
        ],
    )?;
    address.id = Some(Id::new(conn.last_insert_rowid()));
    Ok(())
}

/// Rewrites a stored address. Fails with `NotFound` when no row has its id.
pub fn update(conn: &Connection, address: &Address) -> CrmResult<()> {
    let id = address
        .id
        .ok_or_else(|| CrmError::Other("Cannot update an unsaved address".into()))?;
    let changed = conn.execute(
        "UPDATE addresses SET address_type = ?1, street1 = ?2, street2 = ?3, city = ?4, state = ?5,
         zipcode = ?6, country = ?7, full_address = ?8 WHERE id = ?9",
        params![
            address.address_type.to_db_str(),
            address.street1,
            address.street2,
            address.city,
            address.state,
            address.zipcode,
            address.country,
            address.full_address,
            id.value,
        ],
    )?;
    if changed == 0 {
        return Err(CrmError::not_found("Address", id));
    }
    Ok(())
}

/// Writes the business address of an owner: updates it in place, inserts it,
/// or removes the stored one when `address` is `None`. An address whose id
/// no longer exists is inserted as a new row.
pub fn save_business(
    conn: &Connection,
    addressable_type: &str,
    addressable_id: i64,
    address: Option<&mut Address>,
) -> CrmResult<()> {
    let Some(address) = address else {
        return delete_business(conn, addressable_type, addressable_id);
    };

    if let Some(id) = address.id {
        match update(conn, address) {
            Err(CrmError::NotFound { .. }) => {
                warn!(
                    "event=address_update status=missing address_id={} owner={}:{}",
                    id, addressable_type, addressable_id
                );
                address.id = None;
            }
            result => return result,
        }
    }

    delete_business(conn, addressable_type, addressable_id)?;
    insert(conn, addressable_type, addressable_id, address)
}

pub fn find_business(
    conn: &Connection,
    addressable_type: &str,
    addressable_id: i64,
) -> CrmResult<Option<Address>> {
    let mut stmt = conn.prepare(
        "SELECT id, address_type, street1, street2, city, state, zipcode, country, full_address
         FROM addresses
         WHERE addressable_type = ?1 AND addressable_id = ?2 AND address_type = 'Business'
         ORDER BY id DESC LIMIT 1",
    )?;

    let result = stmt.query_row(params![addressable_type, addressable_id], |row| {
        let address_type: String = row.get(1)?;
        Ok((
            Address {
                id: Some(Id::new(row.get(0)?)),
                street1: row.get(2)?,
                street2: row.get(3)?,
                city: row.get(4)?,
                state: row.get(5)?,
                zipcode: row.get(6)?,
                country: row.get(7)?,
                full_address: row.get(8)?,
                address_type: AddressType::default(),
            },
            address_type,
        ))
    });

    match result {
        Ok((mut address, type_str)) => {
            address.address_type = AddressType::from_db_str(&type_str).ok_or_else(|| {
                CrmError::Other(format!("Unknown address type: {}", type_str))
            })?;
            Ok(Some(address))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_business(conn: &Connection, addressable_type: &str, addressable_id: i64) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM addresses
         WHERE addressable_type = ?1 AND addressable_id = ?2 AND address_type = 'Business'",
        params![addressable_type, addressable_id],
    )?;
    Ok(())
}

pub fn count_for(conn: &Connection, addressable_type: &str, addressable_id: i64) -> CrmResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM addresses WHERE addressable_type = ?1 AND addressable_id = ?2",
        params![addressable_type, addressable_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
