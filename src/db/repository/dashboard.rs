use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

fn count(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(sql, params, |row| row.get::<_, Option<i64>>(0))?.unwrap_or(0))
}

/// Dashboard counters relative to `today`, plus one entry per day for
/// the last seven days (zero-filled, oldest first).
pub fn dashboard(conn: &Connection, today: NaiveDate) -> Result<DashboardResponse, DatabaseError> {
    let yesterday = today - Duration::days(1);
    let week_start = today - Duration::days(6);
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    let (today_s, yesterday_s, week_s) = (fmt(today), fmt(yesterday), fmt(week_start));

    let orders_on = "SELECT COUNT(*) FROM test_orders WHERE DATE(order_date) = ?1";
    let completed_on = "SELECT COUNT(*) FROM test_orders
                        WHERE status = 'REPORT_READY'
                          AND DATE(COALESCE(report_ready_at, order_date)) = ?1";

    let stats = DashboardStats {
        orders_today: count(conn, orders_on, params![today_s])?,
        orders_yesterday: count(conn, orders_on, params![yesterday_s])?,
        pending_reports: count(conn, "SELECT COUNT(*) FROM test_orders WHERE status = 'PENDING'", [])?,
        urgent_pending_reports: count(
            conn,
            "SELECT COUNT(*) FROM test_orders WHERE status = 'PENDING' AND priority = 'URGENT'",
            [],
        )?,
        completed_reports: count(conn, completed_on, params![today_s])?,
        completed_yesterday: count(conn, completed_on, params![yesterday_s])?,
        total_patients: count(conn, "SELECT COUNT(*) FROM patients", [])?,
        new_patients_this_week: count(
            conn,
            "SELECT COUNT(*) FROM patients WHERE DATE(created_at) >= ?1",
            params![week_s],
        )?,
    };

    let mut stmt = conn.prepare(
        "SELECT DATE(order_date), COUNT(*) FROM test_orders
         WHERE DATE(order_date) BETWEEN ?1 AND ?2
         GROUP BY DATE(order_date)",
    )?;
    let counts = stmt
        .query_map(params![week_s, today_s], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<std::collections::HashMap<_, _>, _>>()?;

    let orders_last_7_days = (0..7)
        .map(|offset| {
            let date = fmt(week_start + Duration::days(offset));
            let count = counts.get(&date).copied().unwrap_or(0);
            DailyOrderCount { date, count }
        })
        .collect();

    Ok(DashboardResponse {
        stats,
        orders_last_7_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw_order(conn: &Connection, patient_id: i64, date: &str, priority: &str, status: &str) {
        conn.execute(
            "INSERT INTO test_orders (patient_id, order_date, priority, status, total_amount)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![patient_id, date, priority, status],
        )
        .unwrap();
    }

    #[test]
    fn empty_database_has_zero_filled_week() {
        let conn = open_memory_database().unwrap();
        let response = dashboard(&conn, day(2026, 10, 19)).unwrap();
        assert_eq!(response.stats, DashboardStats::default());
        assert_eq!(response.orders_last_7_days.len(), 7);
        assert_eq!(response.orders_last_7_days[0].date, "2026-10-13");
        assert_eq!(response.orders_last_7_days[6].date, "2026-10-19");
        assert!(response.orders_last_7_days.iter().all(|d| d.count == 0));
    }

    #[test]
    fn counts_orders_by_day_and_state() {
        let conn = open_memory_database().unwrap();
        let patient = fixtures::patient(&conn, "Kiran Das", "M", None);
        let id = patient.patient_id;
        raw_order(&conn, id, "2026-10-19 08:00:00", "URGENT", "PENDING");
        raw_order(&conn, id, "2026-10-19 09:30:00", "NORMAL", "PENDING");
        raw_order(&conn, id, "2026-10-19 10:00:00", "NORMAL", "REPORT_READY");
        raw_order(&conn, id, "2026-10-18 11:00:00", "NORMAL", "REPORT_READY");
        raw_order(&conn, id, "2026-10-15 11:00:00", "URGENT", "RESULTS_ENTERED");
        raw_order(&conn, id, "2026-10-01 11:00:00", "NORMAL", "REPORT_READY");

        let response = dashboard(&conn, day(2026, 10, 19)).unwrap();
        let stats = &response.stats;
        assert_eq!(stats.orders_today, 3);
        assert_eq!(stats.orders_yesterday, 1);
        assert_eq!(stats.pending_reports, 2);
        assert_eq!(stats.urgent_pending_reports, 1);
        assert_eq!(stats.completed_reports, 1);
        assert_eq!(stats.completed_yesterday, 1);
        assert_eq!(stats.total_patients, 1);

        let counts: Vec<i64> = response.orders_last_7_days.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 0, 1, 3]);
    }

    #[test]
    fn completion_counts_use_report_ready_time() {
        let conn = open_memory_database().unwrap();
        let patient = fixtures::patient(&conn, "Kiran Das", "M", None);
        raw_order(&conn, patient.patient_id, "2026-10-17 08:00:00", "NORMAL", "REPORT_READY");
        conn.execute(
            "UPDATE test_orders SET report_ready_at = '2026-10-19 12:00:00'",
            [],
        )
        .unwrap();

        let stats = dashboard(&conn, day(2026, 10, 19)).unwrap().stats;
        assert_eq!(stats.completed_reports, 1);
        assert_eq!(stats.orders_today, 0);
    }
}
