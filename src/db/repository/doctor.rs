use rusqlite::{params, Connection};

use crate::db::sqlite::write_transaction;
use crate::db::DatabaseError;
use crate::models::*;

fn doctor_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        doctor_id: row.get(0)?,
        full_name: row.get(1)?,
        specialization: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// All doctors ordered by name.
pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id, full_name, specialization, phone, email, created_at
         FROM doctors ORDER BY full_name COLLATE NOCASE, doctor_id",
    )?;
    let rows = stmt
        .query_map([], doctor_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_doctor(conn: &Connection, doctor_id: i64) -> Result<Doctor, DatabaseError> {
    conn.query_row(
        "SELECT doctor_id, full_name, specialization, phone, email, created_at
         FROM doctors WHERE doctor_id = ?1",
        params![doctor_id],
        doctor_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::not_found("Doctor", doctor_id),
        other => other.into(),
    })
}

pub fn insert_doctor(conn: &Connection, input: &DoctorInput) -> Result<Doctor, DatabaseError> {
    let input = input.validate()?;
    let tx = write_transaction(conn)?;
    tx.execute(
        "INSERT INTO doctors (full_name, specialization, phone, email) VALUES (?1, ?2, ?3, ?4)",
        params![input.full_name, input.specialization, input.phone, input.email],
    )?;
    let doctor_id = tx.last_insert_rowid();
    super::log_activity(
        &tx,
        ActivityAction::CreateDoctor,
        EntityType::Doctor,
        Some(doctor_id),
        &format!("Added doctor {}", input.full_name),
    )?;
    let doctor = get_doctor(&tx, doctor_id)?;
    tx.commit()?;
    Ok(doctor)
}
