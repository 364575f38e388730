use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::sqlite::write_transaction;
use crate::db::DatabaseError;
use crate::lab::reference::RangeTexts;
use crate::models::*;

/// Catalog test with the raw columns needed for order snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTest {
    pub test_id: i64,
    pub test_name: String,
    pub unit: Option<String>,
    pub normal_min: Option<f64>,
    pub normal_max: Option<f64>,
    pub price: f64,
    pub is_active: bool,
}

fn range_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReferenceRange> {
    Ok(ReferenceRange {
        gender: row.get(0)?,
        age_min: row.get(1)?,
        age_max: row.get(2)?,
        normal_min: row.get(3)?,
        normal_max: row.get(4)?,
        unit: row.get(5)?,
    })
}

/// Active tests by name, each with its per-gender range texts.
pub fn list_tests(conn: &Connection) -> Result<Vec<TestItem>, DatabaseError> {
    let mut ranges: HashMap<i64, Vec<ReferenceRange>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT test_id, gender, age_min, age_max, normal_min, normal_max, unit
             FROM test_reference_ranges ORDER BY test_id, range_id",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let test_id: i64 = row.get(0)?;
            let range = ReferenceRange {
                gender: row.get(1)?,
                age_min: row.get(2)?,
                age_max: row.get(3)?,
                normal_min: row.get(4)?,
                normal_max: row.get(5)?,
                unit: row.get(6)?,
            };
            ranges.entry(test_id).or_default().push(range);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT t.test_id, t.test_name, t.sample_type, t.unit, t.price, c.category_name
         FROM tests t
         LEFT JOIN test_categories c ON c.category_id = t.category_id
         WHERE t.is_active = 1
         ORDER BY t.test_name COLLATE NOCASE, t.test_id",
    )?;
    let tests = stmt
        .query_map([], |row| {
            Ok(TestItem {
                test_id: row.get(0)?,
                test_name: row.get(1)?,
                sample_type: row.get(2)?,
                unit: row.get(3)?,
                price: row.get(4)?,
                category_name: row.get(5)?,
                any_range_text: None,
                male_range_text: None,
                female_range_text: None,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tests
        .into_iter()
        .map(|mut item| {
            if let Some(test_ranges) = ranges.get(&item.test_id) {
                let texts = RangeTexts::from_ranges(test_ranges, item.unit.as_deref());
                item.any_range_text = texts.any;
                item.male_range_text = texts.male;
                item.female_range_text = texts.female;
            }
            item
        })
        .collect())
}

pub fn get_test_item(conn: &Connection, test_id: i64) -> Result<TestItem, DatabaseError> {
    list_tests(conn)?
        .into_iter()
        .find(|t| t.test_id == test_id)
        .ok_or_else(|| DatabaseError::not_found("Test", test_id))
}

pub fn find_catalog_test(conn: &Connection, test_id: i64) -> Result<Option<CatalogTest>, DatabaseError> {
    let test = conn
        .query_row(
            "SELECT test_id, test_name, unit, normal_min, normal_max, price, is_active
             FROM tests WHERE test_id = ?1",
            params![test_id],
            |row| {
                Ok(CatalogTest {
                    test_id: row.get(0)?,
                    test_name: row.get(1)?,
                    unit: row.get(2)?,
                    normal_min: row.get(3)?,
                    normal_max: row.get(4)?,
                    price: row.get(5)?,
                    is_active: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(test)
}

pub fn get_reference_ranges(conn: &Connection, test_id: i64) -> Result<Vec<ReferenceRange>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT gender, age_min, age_max, normal_min, normal_max, unit
         FROM test_reference_ranges WHERE test_id = ?1 ORDER BY range_id",
    )?;
    let rows = stmt
        .query_map(params![test_id], range_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_reference_range(
    conn: &Connection,
    test_id: i64,
    range: &ReferenceRange,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO test_reference_ranges (test_id, gender, age_min, age_max, normal_min, normal_max, unit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            test_id,
            range.gender,
            range.age_min,
            range.age_max,
            range.normal_min,
            range.normal_max,
            range.unit,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Add a test to the catalog. When both bounds are given an `ANY`
/// reference range is stored alongside.
pub fn insert_test(conn: &Connection, input: &TestInput) -> Result<TestItem, DatabaseError> {
    let input = input.validate()?;
    let tx = write_transaction(conn)?;
    if let Some(category_id) = input.category_id {
        if find_category(&tx, category_id)?.is_none() {
            return Err(DatabaseError::invalid(format!(
                "Unknown test category: {category_id}"
            )));
        }
    }
    tx.execute(
        "INSERT INTO tests (test_name, category_id, sample_type, unit, normal_min, normal_max, price)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            input.test_name,
            input.category_id,
            input.sample_type,
            input.unit,
            input.normal_min,
            input.normal_max,
            input.price,
        ],
    )?;
    let test_id = tx.last_insert_rowid();
    let range = ReferenceRange::any(input.normal_min, input.normal_max, input.unit.as_deref());
    if range.has_bounds() {
        insert_reference_range(&tx, test_id, &range)?;
    }
    super::log_activity(
        &tx,
        ActivityAction::CreateTest,
        EntityType::Test,
        Some(test_id),
        &format!("Added test {}", input.test_name),
    )?;
    let item = get_test_item(&tx, test_id)?;
    tx.commit()?;
    Ok(item)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<TestCategory>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT category_id, category_name, description
         FROM test_categories ORDER BY category_name COLLATE NOCASE",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TestCategory {
                category_id: row.get(0)?,
                category_name: row.get(1)?,
                description: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_category(conn: &Connection, category_id: i64) -> Result<Option<TestCategory>, DatabaseError> {
    let category = conn
        .query_row(
            "SELECT category_id, category_name, description FROM test_categories WHERE category_id = ?1",
            params![category_id],
            |row| {
                Ok(TestCategory {
                    category_id: row.get(0)?,
                    category_name: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(category)
}

pub fn insert_category(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> Result<TestCategory, DatabaseError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DatabaseError::invalid("Category name is required"));
    }
    conn.execute(
        "INSERT INTO test_categories (category_name, description) VALUES (?1, ?2)",
        params![name, description],
    )?;
    Ok(TestCategory {
        category_id: conn.last_insert_rowid(),
        category_name: name.to_string(),
        description: description.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{fixtures, list_activity};
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn created_test_gets_any_range() {
        let conn = open_memory_database().unwrap();
        let item = fixtures::test(&conn, "HbA1c", "%", 4.0, 5.6, 400.0);
        assert_eq!(item.any_range_text.as_deref(), Some("4 - 5.6 %"));
        assert_eq!(item.male_range_text, None);

        let ranges = get_reference_ranges(&conn, item.test_id).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].gender, RangeGender::Any);
        assert_eq!(list_activity(&conn, 5).unwrap()[0].action, "CREATE_TEST");
    }

    #[test]
    fn single_bound_stores_no_range() {
        let conn = open_memory_database().unwrap();
        let item = insert_test(
            &conn,
            &TestInput {
                test_name: "Total Cholesterol".into(),
                unit: Some("mg/dL".into()),
                normal_max: Some(200.0),
                price: 300.0,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(get_reference_ranges(&conn, item.test_id).unwrap().is_empty());
        assert_eq!(item.any_range_text, None);

        let raw = find_catalog_test(&conn, item.test_id).unwrap().unwrap();
        assert_eq!(raw.normal_max, Some(200.0));
        assert!(raw.is_active);
    }

    #[test]
    fn tests_listed_by_name_with_category() {
        let conn = open_memory_database().unwrap();
        let category = insert_category(&conn, "Biochemistry", Some("Blood chemistry")).unwrap();
        insert_test(
            &conn,
            &TestInput {
                test_name: "Urea".into(),
                category_id: Some(category.category_id),
                price: 200.0,
                ..Default::default()
            },
        )
        .unwrap();
        fixtures::hemoglobin(&conn);

        let tests = list_tests(&conn).unwrap();
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].test_name, "Hemoglobin (Hb)");
        assert_eq!(tests[0].male_range_text.as_deref(), Some("13 - 17 g/dL"));
        assert_eq!(tests[0].female_range_text.as_deref(), Some("12 - 15 g/dL"));
        assert_eq!(tests[1].category_name.as_deref(), Some("Biochemistry"));
    }

    #[test]
    fn inactive_tests_hidden() {
        let conn = open_memory_database().unwrap();
        let item = fixtures::test(&conn, "Lipase", "U/L", 13.0, 60.0, 700.0);
        conn.execute("UPDATE tests SET is_active = 0 WHERE test_id = ?1", [item.test_id])
            .unwrap();
        assert!(list_tests(&conn).unwrap().is_empty());
        assert!(matches!(
            get_test_item(&conn, item.test_id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_category_rejected() {
        let conn = open_memory_database().unwrap();
        let err = insert_test(
            &conn,
            &TestInput {
                test_name: "Urea".into(),
                category_id: Some(42),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown test category"));
        assert!(list_tests(&conn).unwrap().is_empty());
    }

    #[test]
    fn categories_sorted_by_name() {
        let conn = open_memory_database().unwrap();
        insert_category(&conn, "Hematology", None).unwrap();
        insert_category(&conn, "Biochemistry", None).unwrap();
        let names: Vec<_> = list_categories(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.category_name)
            .collect();
        assert_eq!(names, vec!["Biochemistry", "Hematology"]);
        assert!(insert_category(&conn, " ", None).is_err());
    }
}
