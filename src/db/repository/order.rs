use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::sqlite::write_transaction;
use crate::db::DatabaseError;
use crate::lab::lifecycle::{parse_display_status, status_after_results};
use crate::lab::patient::age_on;
use crate::lab::reference::{applicable_bounds, Bounds};
use crate::models::patient::non_empty;
use crate::models::*;

use super::catalog::{find_catalog_test, get_reference_ranges, CatalogTest};

/// Orders newest first with their line counts.
pub fn list_orders(conn: &Connection) -> Result<Vec<OrderListItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT o.order_id, p.full_name, o.order_date, o.priority, o.status,
                (SELECT COUNT(*) FROM test_order_tests t WHERE t.order_id = o.order_id)
         FROM test_orders o
         JOIN patients p ON p.patient_id = o.patient_id
         ORDER BY o.order_date DESC, o.order_id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let priority: Priority = row.get(3)?;
            let status: OrderStatus = row.get(4)?;
            Ok(OrderListItem {
                order_id: row.get(0)?,
                patient_name: row.get(1)?,
                order_date: row.get(2)?,
                priority: priority.display(),
                status: status.display(),
                tests_count: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Completed orders, newest first.
pub fn list_reports(conn: &Connection) -> Result<Vec<ReportListItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT o.order_id, p.full_name, o.order_date, o.priority, o.status, o.total_amount
         FROM test_orders o
         JOIN patients p ON p.patient_id = o.patient_id
         WHERE o.status = 'REPORT_READY'
         ORDER BY o.order_date DESC, o.order_id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let priority: Priority = row.get(3)?;
            let status: OrderStatus = row.get(4)?;
            Ok(ReportListItem {
                order_id: row.get(0)?,
                patient_name: row.get(1)?,
                order_date: row.get(2)?,
                priority: priority.display(),
                status: status.display(),
                total_amount: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Bounds that apply to `patient` for `test`, from its reference ranges
/// or the test's own limits.
fn bounds_for(
    conn: &Connection,
    test: &CatalogTest,
    gender: Option<Gender>,
    age: Option<i32>,
) -> Result<Option<Bounds>, DatabaseError> {
    let ranges = get_reference_ranges(conn, test.test_id)?;
    Ok(applicable_bounds(
        &ranges,
        gender,
        age,
        test.normal_min,
        test.normal_max,
        test.unit.as_deref(),
    ))
}

/// Create an order with one line per distinct test. Each line snapshots
/// the unit and the normal range that applies to the patient today.
pub fn create_order(
    conn: &Connection,
    payload: &CreateOrderPayload,
    today: NaiveDate,
) -> Result<CreatedOrder, DatabaseError> {
    let mut test_ids: Vec<i64> = Vec::with_capacity(payload.test_ids.len());
    for id in &payload.test_ids {
        if !test_ids.contains(id) {
            test_ids.push(*id);
        }
    }
    if test_ids.is_empty() {
        return Err(DatabaseError::invalid("At least one test is required"));
    }

    let tx = write_transaction(conn)?;
    let patient = super::find_patient(&tx, payload.patient_id)?.ok_or_else(|| {
        DatabaseError::invalid(format!("Unknown patient: {}", payload.patient_id))
    })?;
    if let Some(doctor_id) = payload.doctor_id {
        super::get_doctor(&tx, doctor_id).map_err(|e| match e {
            DatabaseError::NotFound { .. } => {
                DatabaseError::invalid(format!("Unknown doctor: {doctor_id}"))
            }
            other => other,
        })?;
    }

    let mut tests = Vec::with_capacity(test_ids.len());
    for id in &test_ids {
        match find_catalog_test(&tx, *id)? {
            Some(test) if test.is_active => tests.push(test),
            _ => return Err(DatabaseError::invalid(format!("Unknown test: {id}"))),
        }
    }

    let priority = payload
        .priority
        .as_deref()
        .map(Priority::from_input)
        .unwrap_or(Priority::Normal);
    let total: f64 = tests.iter().map(|t| t.price).sum();

    tx.execute(
        "INSERT INTO test_orders (patient_id, doctor_id, priority, status, total_amount, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.patient_id,
            payload.doctor_id,
            priority,
            OrderStatus::Pending,
            total,
            non_empty(payload.notes.as_deref()),
        ],
    )?;
    let order_id = tx.last_insert_rowid();

    let age = age_on(patient.date_of_birth, today);
    for test in &tests {
        let range_text = bounds_for(&tx, test, patient.gender, age)?.and_then(|b| b.text());
        tx.execute(
            "INSERT INTO test_order_tests (order_id, test_id, unit, normal_range_text)
             VALUES (?1, ?2, ?3, ?4)",
            params![order_id, test.test_id, test.unit, range_text],
        )?;
    }

    super::log_activity(
        &tx,
        ActivityAction::CreateOrder,
        EntityType::Order,
        Some(order_id),
        &format!(
            "Created order #{order_id} for {} ({} test(s))",
            patient.full_name,
            tests.len()
        ),
    )?;
    tx.commit()?;

    tracing::debug!(order_id, tests = tests.len(), "Order created");
    Ok(CreatedOrder { order_id })
}

fn order_lines(conn: &Connection, order_id: i64) -> Result<Vec<OrderTestItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT l.test_id, t.test_name, l.unit, l.normal_range_text,
                l.result_value, l.result_flag, l.result_entered_at, t.price
         FROM test_order_tests l
         JOIN tests t ON t.test_id = l.test_id
         WHERE l.order_id = ?1
         ORDER BY l.id",
    )?;
    let rows = stmt
        .query_map(params![order_id], |row| {
            Ok(OrderTestItem {
                test_id: row.get(0)?,
                test_name: row.get(1)?,
                unit: row.get(2)?,
                normal_range_text: row.get(3)?,
                result_value: row.get(4)?,
                result_flag: row.get(5)?,
                result_entered_at: row.get(6)?,
                price: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_order_detail(conn: &Connection, order_id: i64) -> Result<OrderDetail, DatabaseError> {
    let detail = conn
        .query_row(
            "SELECT o.order_id, o.order_date, o.priority, o.status, o.total_amount, o.notes,
                    p.patient_id, p.full_name, p.date_of_birth, p.gender,
                    d.doctor_id, d.full_name, d.specialization,
                    o.sample_collected_at, o.results_entered_at, o.report_ready_at
             FROM test_orders o
             JOIN patients p ON p.patient_id = o.patient_id
             LEFT JOIN doctors d ON d.doctor_id = o.doctor_id
             WHERE o.order_id = ?1",
            params![order_id],
            |row| {
                let priority: Priority = row.get(2)?;
                let status: OrderStatus = row.get(3)?;
                Ok(OrderDetail {
                    order_id: row.get(0)?,
                    order_date: row.get(1)?,
                    priority: priority.display(),
                    status: status.display(),
                    total_amount: row.get(4)?,
                    notes: row.get(5)?,
                    patient_id: row.get(6)?,
                    patient_name: row.get(7)?,
                    patient_dob: row.get(8)?,
                    patient_gender: row.get(9)?,
                    doctor_id: row.get(10)?,
                    doctor_name: row.get(11)?,
                    doctor_specialization: row.get(12)?,
                    sample_collected_at: row.get(13)?,
                    results_entered_at: row.get(14)?,
                    report_ready_at: row.get(15)?,
                    tests: Vec::new(),
                })
            },
        )
        .optional()?;
    let mut detail = detail.ok_or_else(|| DatabaseError::not_found("Order", order_id))?;
    detail.tests = order_lines(conn, order_id)?;
    Ok(detail)
}

fn stored_status(conn: &Connection, order_id: i64) -> Result<OrderStatus, DatabaseError> {
    conn.query_row(
        "SELECT status FROM test_orders WHERE order_id = ?1",
        params![order_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| DatabaseError::not_found("Order", order_id))
}

/// Move an order to `status`, stamping the stage column on first entry.
fn set_status(conn: &Connection, order_id: i64, status: OrderStatus) -> Result<(), DatabaseError> {
    match status.timestamp_column() {
        Some(column) => conn.execute(
            &format!(
                "UPDATE test_orders SET status = ?1, {column} = COALESCE({column}, CURRENT_TIMESTAMP)
                 WHERE order_id = ?2"
            ),
            params![status, order_id],
        )?,
        None => conn.execute(
            "UPDATE test_orders SET status = ?1 WHERE order_id = ?2",
            params![status, order_id],
        )?,
    };
    Ok(())
}

/// Update priority, status and notes. Blank priority or status are
/// ignored; an empty notes string clears the notes.
pub fn update_order(
    conn: &Connection,
    order_id: i64,
    payload: &UpdateOrderPayload,
) -> Result<OrderDetail, DatabaseError> {
    let priority = non_empty(payload.priority.as_deref()).map(|p| Priority::from_input(&p));
    let status = match non_empty(payload.status.as_deref()) {
        Some(s) => Some(parse_display_status(&s)?),
        None => None,
    };
    if priority.is_none() && status.is_none() && payload.notes.is_none() {
        return Err(DatabaseError::invalid("Nothing to update"));
    }

    let tx = write_transaction(conn)?;
    let current = stored_status(&tx, order_id)?;
    let mut changes = Vec::new();

    if let Some(priority) = priority {
        tx.execute(
            "UPDATE test_orders SET priority = ?1 WHERE order_id = ?2",
            params![priority, order_id],
        )?;
        changes.push(format!("priority {}", priority.display()));
    }
    if let Some(status) = status {
        // in-progress maps to RESULTS_ENTERED; an order already there
        // or further keeps its stage unless explicitly moved.
        if status.display() != current.display() {
            set_status(&tx, order_id, status)?;
        }
        changes.push(format!("status {}", status.display()));
    }
    if let Some(notes) = &payload.notes {
        tx.execute(
            "UPDATE test_orders SET notes = ?1 WHERE order_id = ?2",
            params![non_empty(Some(notes)), order_id],
        )?;
        changes.push("notes".to_string());
    }

    super::log_activity(
        &tx,
        ActivityAction::UpdateOrder,
        EntityType::Order,
        Some(order_id),
        &format!("Updated order #{order_id}: {}", changes.join(", ")),
    )?;
    let detail = get_order_detail(&tx, order_id)?;
    tx.commit()?;
    Ok(detail)
}

/// Record result values for tests of an order. Tests not on the order
/// are reported back as skipped. Flags use the same bounds the order's
/// range snapshot was built from.
pub fn record_results(
    conn: &Connection,
    order_id: i64,
    payload: &UpdateResultsPayload,
    today: NaiveDate,
) -> Result<ResultsUpdate, DatabaseError> {
    let tx = write_transaction(conn)?;
    let current = stored_status(&tx, order_id)?;
    let (gender, dob): (Option<Gender>, Option<NaiveDate>) = tx.query_row(
        "SELECT p.gender, p.date_of_birth
         FROM test_orders o JOIN patients p ON p.patient_id = o.patient_id
         WHERE o.order_id = ?1",
        params![order_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let age = age_on(dob, today);

    let on_order: Vec<i64> = {
        let mut stmt = tx.prepare("SELECT test_id FROM test_order_tests WHERE order_id = ?1")?;
        let ids = stmt
            .query_map(params![order_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids
    };

    let mut bounds: HashMap<i64, Option<Bounds>> = HashMap::new();
    let mut updated = 0;
    let mut skipped = Vec::new();

    for item in &payload.results {
        if !on_order.contains(&item.test_id) {
            skipped.push(item.test_id);
            continue;
        }
        let flag = match item.value {
            Some(value) => {
                if !bounds.contains_key(&item.test_id) {
                    let found = match find_catalog_test(&tx, item.test_id)? {
                        Some(test) => bounds_for(&tx, &test, gender, age)?,
                        None => None,
                    };
                    bounds.insert(item.test_id, found);
                }
                bounds
                    .get(&item.test_id)
                    .and_then(|b| b.as_ref())
                    .and_then(|b| b.flag(value))
            }
            None => None,
        };
        tx.execute(
            "UPDATE test_order_tests
             SET result_value = ?1,
                 result_flag = ?2,
                 result_entered_at = CASE WHEN ?1 IS NULL THEN NULL ELSE CURRENT_TIMESTAMP END
             WHERE order_id = ?3 AND test_id = ?4",
            params![item.value, flag, order_id, item.test_id],
        )?;
        updated += 1;
    }

    let next = status_after_results(current, payload.mark_completed);
    if next != current {
        set_status(&tx, order_id, next)?;
    }

    super::log_activity(
        &tx,
        ActivityAction::UpdateResults,
        EntityType::Order,
        Some(order_id),
        &format!("Entered {updated} result(s) for order #{order_id}"),
    )?;
    tx.commit()?;

    if !skipped.is_empty() {
        tracing::warn!(order_id, ?skipped, "Results for tests not on the order were ignored");
    }
    Ok(ResultsUpdate {
        updated,
        skipped,
        status: next.display(),
    })
}

pub fn count_orders(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM test_orders", [], |row| row.get(0))?)
}
