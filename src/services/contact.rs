use crate::database::DbPool;
use crate::models::contact::{Contact, ContactWithPerson};
use crate::utils::error::{AppError, AppResult};

pub async fn add_contact(pool: &DbPool, owner_id: String, person_id: String) -> AppResult<Contact> {
    let contact = Contact::new(owner_id, person_id);

    sqlx::query("INSERT INTO contacts (id, owner_id, person_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(&contact.id)
        .bind(&contact.owner_id)
        .bind(&contact.person_id)
        .bind(&contact.created_at)
        .execute(pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Contact already exists".to_string()),
            other => other,
        })?;

    tracing::debug!("User {} added contact {}", contact.owner_id, contact.person_id);

    Ok(contact)
}

pub async fn get_contacts(pool: &DbPool, owner_id: &str) -> AppResult<Vec<ContactWithPerson>> {
    let contacts = sqlx::query_as::<_, ContactWithPerson>(
        "SELECT c.*, u.username as person_username
         FROM contacts c
         JOIN users u ON u.id = c.person_id
         WHERE c.owner_id = ?
         ORDER BY u.username ASC",
    )
    .bind(owner_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(contacts)
}

pub async fn remove_contact(pool: &DbPool, contact_id: &str, owner_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ? AND owner_id = ?")
        .bind(contact_id)
        .bind(owner_id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Contact not found".to_string()));
    }

    Ok(())
}
