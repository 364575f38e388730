use std::collections::BTreeMap;

use rusqlite::{params, Connection};

use crate::db::sqlite::write_transaction;
use crate::db::DatabaseError;
use crate::models::*;

pub fn get_settings(conn: &Connection) -> Result<LabSettings, DatabaseError> {
    let mut stmt = conn.prepare("SELECT setting_key, setting_value FROM app_settings")?;
    let settings = stmt
        .query_map([], |row| {
            let key: String = row.get(0)?;
            let value: Option<String> = row.get(1)?;
            Ok((key, value.unwrap_or_default()))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(LabSettings { settings })
}

/// Upsert every key of `update`. Blank keys are rejected; keys not in
/// `update` are left as they are.
pub fn update_settings(conn: &Connection, update: &LabSettings) -> Result<LabSettings, DatabaseError> {
    if update.settings.keys().any(|k| k.trim().is_empty()) {
        return Err(DatabaseError::invalid("Setting keys must not be empty"));
    }

    let tx = write_transaction(conn)?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO app_settings (setting_key, setting_value) VALUES (?1, ?2)
             ON CONFLICT(setting_key) DO UPDATE SET setting_value = excluded.setting_value",
        )?;
        for (key, value) in &update.settings {
            stmt.execute(params![key.trim(), value])?;
        }
    }
    super::log_activity(
        &tx,
        ActivityAction::UpdateSettings,
        EntityType::Settings,
        None,
        &format!("Updated {} setting(s)", update.settings.len()),
    )?;
    let settings = get_settings(&tx)?;
    tx.commit()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::list_activity;
    use crate::db::sqlite::open_memory_database;

    fn settings(pairs: &[(&str, &str)]) -> LabSettings {
        LabSettings {
            settings: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn upsert_keeps_other_keys() {
        let conn = open_memory_database().unwrap();
        update_settings(&conn, &settings(&[(LAB_NAME, "City Diagnostics"), (LAB_PHONE, "080-1234")]))
            .unwrap();
        let merged = update_settings(&conn, &settings(&[(LAB_NAME, "Metro Labs")])).unwrap();

        assert_eq!(merged.get(LAB_NAME), Some("Metro Labs"));
        assert_eq!(merged.get(LAB_PHONE), Some("080-1234"));
        assert_eq!(get_settings(&conn).unwrap(), merged);

        let feed = list_activity(&conn, 5).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].entity_type, "SETTINGS");
    }

    #[test]
    fn blank_key_rejected() {
        let conn = open_memory_database().unwrap();
        assert!(update_settings(&conn, &settings(&[(" ", "x")])).is_err());
        assert!(get_settings(&conn).unwrap().settings.is_empty());
    }
}
