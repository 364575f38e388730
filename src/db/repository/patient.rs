use rusqlite::{params, Connection, OptionalExtension};

use crate::db::sqlite::write_transaction;
use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str =
    "patient_id, full_name, date_of_birth, gender, phone, email, address, created_at";

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        full_name: row.get(1)?,
        date_of_birth: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        address: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// All patients, newest registrations first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, patient_id DESC"
    ))?;
    let rows = stmt
        .query_map([], patient_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_patient(conn: &Connection, patient_id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?1"),
            params![patient_id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn get_patient(conn: &Connection, patient_id: i64) -> Result<Patient, DatabaseError> {
    find_patient(conn, patient_id)?.ok_or_else(|| DatabaseError::not_found("Patient", patient_id))
}

pub fn insert_patient(conn: &Connection, record: &PatientRecord) -> Result<Patient, DatabaseError> {
    let tx = write_transaction(conn)?;
    tx.execute(
        "INSERT INTO patients (full_name, date_of_birth, gender, phone, email, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.full_name,
            record.date_of_birth,
            record.gender,
            record.phone,
            record.email,
            record.address,
        ],
    )?;
    let patient_id = tx.last_insert_rowid();
    super::log_activity(
        &tx,
        ActivityAction::CreatePatient,
        EntityType::Patient,
        Some(patient_id),
        &format!("Registered patient {}", record.full_name),
    )?;
    let patient = get_patient(&tx, patient_id)?;
    tx.commit()?;
    Ok(patient)
}

/// Apply a partial update. An empty update returns the stored patient
/// untouched and writes no activity entry.
pub fn update_patient(
    conn: &Connection,
    patient_id: i64,
    update: &PatientUpdate,
) -> Result<Patient, DatabaseError> {
    let tx = write_transaction(conn)?;
    let current = get_patient(&tx, patient_id)?;
    if update.is_empty() {
        return Ok(current);
    }
    let record = update.apply(&current)?;
    tx.execute(
        "UPDATE patients
         SET full_name = ?1, date_of_birth = ?2, gender = ?3, phone = ?4, email = ?5, address = ?6
         WHERE patient_id = ?7",
        params![
            record.full_name,
            record.date_of_birth,
            record.gender,
            record.phone,
            record.email,
            record.address,
            patient_id,
        ],
    )?;
    super::log_activity(
        &tx,
        ActivityAction::UpdatePatient,
        EntityType::Patient,
        Some(patient_id),
        &format!("Updated patient {}", record.full_name),
    )?;
    let patient = get_patient(&tx, patient_id)?;
    tx.commit()?;
    Ok(patient)
}

/// Delete a patient with no orders. Patients referenced by orders are
/// kept and reported as in use.
pub fn delete_patient(conn: &Connection, patient_id: i64) -> Result<(), DatabaseError> {
    let tx = write_transaction(conn)?;
    let patient = get_patient(&tx, patient_id)?;
    let orders: i64 = tx.query_row(
        "SELECT COUNT(*) FROM test_orders WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    if orders > 0 {
        return Err(DatabaseError::InUse {
            entity_type: "Patient".into(),
            id: patient_id,
            referenced_by: format!("{orders} order(s)"),
        });
    }
    tx.execute("DELETE FROM patients WHERE patient_id = ?1", params![patient_id])?;
    super::log_activity(
        &tx,
        ActivityAction::DeletePatient,
        EntityType::Patient,
        Some(patient_id),
        &format!("Deleted patient {}", patient.full_name),
    )?;
    tx.commit()?;
    Ok(())
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?)
}
