//! Demo data for a fresh laboratory database.
//!
//! Seeding only runs against a database with no patients, so it is safe
//! to call on every start. Passing a seeded `StdRng` makes the generated
//! patients and orders reproducible.

use chrono::{Duration, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Connection};

use super::repository::{count_patients, get_reference_ranges, log_activity};
use super::sqlite::write_transaction;
use super::DatabaseError;
use crate::lab::patient::age_on;
use crate::lab::reference::applicable_bounds;
use crate::models::*;

const CATEGORIES: &[(&str, &str)] = &[
    ("Hematology", "Blood cell counts and related tests"),
    ("Clinical Chemistry", "Blood chemistry and metabolic tests"),
    ("Lipid Profile", "Cholesterol and lipid tests"),
    ("Diabetes Panel", "Blood sugar and diabetes tests"),
    ("Kidney Function", "Renal function tests"),
    ("Liver Function", "Hepatic function tests"),
    ("Thyroid Function", "Thyroid hormone tests"),
    ("Urine Analysis", "Urine tests"),
    ("Radiology", "Imaging tests"),
    ("Serology", "Antibody and antigen tests"),
];

struct SeedTest {
    name: &'static str,
    category: usize,
    sample: &'static str,
    unit: Option<&'static str>,
    min: Option<f64>,
    max: Option<f64>,
    price: f64,
}

const fn t(
    name: &'static str,
    category: usize,
    sample: &'static str,
    unit: Option<&'static str>,
    min: Option<f64>,
    max: Option<f64>,
    price: f64,
) -> SeedTest {
    SeedTest {
        name,
        category,
        sample,
        unit,
        min,
        max,
        price,
    }
}

#[rustfmt::skip]
const TESTS: &[SeedTest] = &[
    t("Complete Blood Count (CBC)", 0, "Blood", None, None, None, 400.0),
    t("Hemoglobin (Hb)", 0, "Blood", Some("g/dL"), None, None, 250.0),
    t("Total Leukocyte Count (TLC)", 0, "Blood", Some("cells/µL"), Some(4000.0), Some(11000.0), 200.0),
    t("Platelet Count", 0, "Blood", Some("lakh/µL"), Some(1.5), Some(4.5), 220.0),
    t("ESR (Erythrocyte Sedimentation Rate)", 0, "Blood", Some("mm/hr"), Some(0.0), Some(20.0), 180.0),
    t("Blood Urea", 1, "Blood", Some("mg/dL"), Some(15.0), Some(40.0), 220.0),
    t("Serum Creatinine", 1, "Blood", Some("mg/dL"), None, None, 300.0),
    t("Uric Acid", 1, "Blood", Some("mg/dL"), Some(3.5), Some(7.2), 280.0),
    t("Serum Calcium", 1, "Blood", Some("mg/dL"), Some(8.5), Some(10.5), 300.0),
    t("Serum Sodium", 1, "Blood", Some("mEq/L"), Some(135.0), Some(145.0), 250.0),
    t("Serum Potassium", 1, "Blood", Some("mEq/L"), Some(3.5), Some(5.5), 250.0),
    t("Lipid Profile", 2, "Blood", Some("mg/dL"), None, None, 800.0),
    t("Total Cholesterol", 2, "Blood", Some("mg/dL"), Some(0.0), Some(200.0), 350.0),
    t("HDL Cholesterol", 2, "Blood", Some("mg/dL"), None, None, 350.0),
    t("LDL Cholesterol", 2, "Blood", Some("mg/dL"), Some(0.0), Some(100.0), 350.0),
    t("Triglycerides", 2, "Blood", Some("mg/dL"), Some(0.0), Some(150.0), 350.0),
    t("VLDL Cholesterol", 2, "Blood", Some("mg/dL"), Some(5.0), Some(40.0), 300.0),
    t("Fasting Blood Sugar", 3, "Blood", Some("mg/dL"), Some(70.0), Some(100.0), 200.0),
    t("Fasting Blood Glucose (FBS)", 3, "Blood", Some("mg/dL"), Some(70.0), Some(99.0), 180.0),
    t("Postprandial Blood Sugar (PPBS)", 3, "Blood", Some("mg/dL"), Some(80.0), Some(140.0), 200.0),
    t("HbA1c", 3, "Blood", Some("%"), Some(4.0), Some(5.6), 400.0),
    t("Random Blood Sugar (RBS)", 3, "Blood", Some("mg/dL"), Some(70.0), Some(140.0), 150.0),
    t("Blood Urea Nitrogen (BUN)", 4, "Blood", Some("mg/dL"), Some(7.0), Some(20.0), 250.0),
    t("eGFR (Estimated GFR)", 4, "Blood", Some("mL/min"), Some(90.0), Some(120.0), 400.0),
    t("Microalbumin Urine", 4, "Urine", Some("mg/L"), Some(0.0), Some(30.0), 500.0),
    t("SGPT / ALT", 5, "Blood", Some("U/L"), Some(7.0), Some(56.0), 280.0),
    t("SGOT / AST", 5, "Blood", Some("U/L"), Some(10.0), Some(40.0), 280.0),
    t("Alkaline Phosphatase", 5, "Blood", Some("U/L"), Some(30.0), Some(120.0), 300.0),
    t("Bilirubin Total", 5, "Blood", Some("mg/dL"), Some(0.3), Some(1.2), 280.0),
    t("Bilirubin Direct", 5, "Blood", Some("mg/dL"), Some(0.0), Some(0.3), 280.0),
    t("Total Protein", 5, "Blood", Some("g/dL"), Some(6.0), Some(8.0), 250.0),
    t("Albumin", 5, "Blood", Some("g/dL"), Some(3.5), Some(5.5), 250.0),
    t("TSH (Thyroid Stimulating Hormone)", 6, "Blood", Some("µIU/mL"), Some(0.27), Some(4.2), 450.0),
    t("T3 (Triiodothyronine)", 6, "Blood", Some("ng/dL"), Some(80.0), Some(200.0), 400.0),
    t("T4 (Thyroxine)", 6, "Blood", Some("µg/dL"), Some(4.5), Some(12.0), 400.0),
    t("Free T3", 6, "Blood", Some("pg/mL"), Some(2.0), Some(4.4), 500.0),
    t("Free T4", 6, "Blood", Some("ng/dL"), Some(0.8), Some(1.8), 500.0),
    t("Urine Routine", 7, "Urine", None, None, None, 250.0),
    t("Urine Culture", 7, "Urine", None, None, None, 600.0),
    t("24-Hour Urine Protein", 7, "Urine", Some("mg/24h"), Some(0.0), Some(150.0), 450.0),
    t("Chest X-Ray", 8, "Imaging", None, None, None, 1000.0),
    t("Ultrasound Abdomen", 8, "Imaging", None, None, None, 1500.0),
    t("ECG", 8, "Cardiac", None, None, None, 300.0),
    t("Vitamin D", 9, "Blood", Some("ng/mL"), Some(30.0), Some(100.0), 1200.0),
    t("Vitamin B12", 9, "Blood", Some("pg/mL"), Some(200.0), Some(900.0), 800.0),
    t("Iron Studies", 9, "Blood", Some("µg/dL"), Some(60.0), Some(170.0), 600.0),
];

/// (test name, gender, min, max, unit, notes)
#[rustfmt::skip]
const RANGES: &[(&str, RangeGender, f64, f64, &str, &str)] = &[
    ("Hemoglobin (Hb)", RangeGender::Male, 13.0, 17.0, "g/dL", "Normal range for adult males"),
    ("Hemoglobin (Hb)", RangeGender::Female, 12.0, 15.0, "g/dL", "Normal range for adult females"),
    ("HDL Cholesterol", RangeGender::Male, 40.0, 999.0, "mg/dL", "Higher is better for males"),
    ("HDL Cholesterol", RangeGender::Female, 50.0, 999.0, "mg/dL", "Higher is better for females"),
    ("Serum Creatinine", RangeGender::Male, 0.7, 1.3, "mg/dL", "Normal range for males"),
    ("Serum Creatinine", RangeGender::Female, 0.6, 1.1, "mg/dL", "Normal range for females"),
    ("ESR (Erythrocyte Sedimentation Rate)", RangeGender::Male, 0.0, 15.0, "mm/hr", "Males"),
    ("ESR (Erythrocyte Sedimentation Rate)", RangeGender::Female, 0.0, 20.0, "mm/hr", "Females"),
    ("Uric Acid", RangeGender::Male, 3.5, 7.2, "mg/dL", "Males"),
    ("Uric Acid", RangeGender::Female, 2.6, 6.0, "mg/dL", "Females"),
    ("Fasting Blood Glucose (FBS)", RangeGender::Any, 70.0, 99.0, "mg/dL", "Normal fasting glucose"),
    ("Postprandial Blood Sugar (PPBS)", RangeGender::Any, 80.0, 140.0, "mg/dL", "2 hours after meal"),
    ("HbA1c", RangeGender::Any, 4.0, 5.6, "%", "Normal glycemic control"),
    ("Total Cholesterol", RangeGender::Any, 0.0, 200.0, "mg/dL", "Desirable level"),
    ("Triglycerides", RangeGender::Any, 0.0, 150.0, "mg/dL", "Normal level"),
    ("TSH (Thyroid Stimulating Hormone)", RangeGender::Any, 0.27, 4.2, "µIU/mL", "Normal thyroid function"),
    ("Total Leukocyte Count (TLC)", RangeGender::Any, 4000.0, 11000.0, "cells/µL", "Normal WBC count"),
    ("Platelet Count", RangeGender::Any, 1.5, 4.5, "lakh/µL", "Normal platelet count"),
];

#[rustfmt::skip]
const DOCTORS: &[(&str, &str, &str, &str)] = &[
    ("Dr. Ramesh Kumar", "General Physician", "+91-9845012345", "dr.ramesh@medlab.com"),
    ("Dr. Sunita Sharma", "Cardiologist", "+91-9845012346", "dr.sunita@medlab.com"),
    ("Dr. Arun Reddy", "Endocrinologist", "+91-9845012347", "dr.arun@medlab.com"),
    ("Dr. Kavita Iyer", "Nephrologist", "+91-9845012348", "dr.kavita@medlab.com"),
    ("Dr. Vijay Patel", "Pathologist", "+91-9845012349", "dr.vijay@medlab.com"),
    ("Dr. Anjali Rao", "Radiologist", "+91-9845012350", "dr.anjali@medlab.com"),
    ("Dr. Manoj Singh", "General Surgeon", "+91-9845012351", "dr.manoj@medlab.com"),
    ("Dr. Priya Nair", "Pediatrician", "+91-9845012352", "dr.priya@medlab.com"),
    ("Dr. Suresh Gupta", "Gastroenterologist", "+91-9845012353", "dr.suresh@medlab.com"),
    ("Dr. Lakshmi Desai", "Gynecologist", "+91-9845012354", "dr.lakshmi@medlab.com"),
];

const SETTINGS: &[(&str, &str)] = &[
    (LAB_NAME, "MedLAB+ Diagnostic Center"),
    (LAB_ADDRESS, "123 Medical Complex, Mysuru, Karnataka - 570001"),
    (LAB_PHONE, "+91-821-2345678"),
    (LAB_EMAIL, "contact@medlabplus.com"),
    (LAB_LICENSE, "KA-MYS-LAB-2024-12345"),
    (REPORT_HEADER, "Accredited Laboratory - ISO 9001:2015 Certified"),
    (REPORT_FOOTER, "This report is computer generated and does not require signature"),
];

const MALE_NAMES: &[&str] = &[
    "Rajesh", "Amit", "Suresh", "Vikram", "Rahul", "Anil", "Deepak", "Manoj", "Kiran", "Sachin",
];
const FEMALE_NAMES: &[&str] = &[
    "Priya", "Anjali", "Sneha", "Kavita", "Pooja", "Rekha", "Neha", "Swati", "Divya", "Meera",
];
const LAST_NAMES: &[&str] = &[
    "Kumar", "Sharma", "Reddy", "Rao", "Patel", "Singh", "Iyer", "Nair", "Gupta", "Verma", "Joshi",
    "Desai",
];
const AREAS: &[&str] = &[
    "Jayanagar", "Koramangala", "Indiranagar", "Malleshwaram", "Rajajinagar", "Hebbal", "Whitefield",
];
const NOTES: &[Option<&str>] = &[
    Some("Routine checkup"),
    Some("Follow-up tests"),
    Some("Pre-employment medical"),
    Some("Annual health screening"),
    Some("Doctor referral"),
    None,
];

pub const SEED_PATIENTS: usize = 50;
pub const SEED_ORDERS: usize = 100;

/// Row counts written by a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub tests: usize,
    pub reference_ranges: usize,
    pub patients: usize,
    pub doctors: usize,
    pub orders: usize,
    pub settings: usize,
}

fn pick<'a, T, R: Rng>(items: &'a [T], rng: &mut R) -> Result<&'a T, DatabaseError> {
    items
        .choose(rng)
        .ok_or_else(|| DatabaseError::invalid("Seed table is empty"))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Populate an empty database with the demo catalog, patients, doctors,
/// orders and lab settings. Returns `None` when patients already exist.
pub fn seed_demo_data<R: Rng>(
    conn: &Connection,
    rng: &mut R,
    now: NaiveDateTime,
) -> Result<Option<SeedSummary>, DatabaseError> {
    if count_patients(conn)? > 0 {
        tracing::info!("Database already has patients, skipping demo seed");
        return Ok(None);
    }

    let tx = write_transaction(conn)?;
    let mut summary = SeedSummary::default();

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        tx.execute(
            "INSERT INTO test_categories (category_name, description) VALUES (?1, ?2)",
            params![name, description],
        )?;
        category_ids.push(tx.last_insert_rowid());
    }
    summary.categories = category_ids.len();

    let mut test_ids = Vec::with_capacity(TESTS.len());
    for test in TESTS {
        tx.execute(
            "INSERT INTO tests (test_name, category_id, sample_type, unit, normal_min, normal_max, price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                test.name,
                category_ids.get(test.category),
                test.sample,
                test.unit,
                test.min,
                test.max,
                test.price,
            ],
        )?;
        test_ids.push(tx.last_insert_rowid());
    }
    summary.tests = test_ids.len();

    for (name, gender, min, max, unit, notes) in RANGES {
        let Some(index) = TESTS.iter().position(|t| t.name == *name) else {
            continue;
        };
        tx.execute(
            "INSERT INTO test_reference_ranges (test_id, gender, normal_min, normal_max, unit, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![test_ids[index], gender, min, max, unit, notes],
        )?;
        summary.reference_ranges += 1;
    }

    let today = now.date();
    let mut patients = Vec::with_capacity(SEED_PATIENTS);
    for _ in 0..SEED_PATIENTS {
        let gender = if rng.gen_bool(0.5) { Gender::Male } else { Gender::Female };
        let first = pick(if gender == Gender::Male { MALE_NAMES } else { FEMALE_NAMES }, rng)?;
        let last = pick(LAST_NAMES, rng)?;
        let age_days = rng.gen_range(18..=80) * 365 + rng.gen_range(0..=365);
        let dob = today - Duration::days(age_days);
        let phone = format!("+91-{}", rng.gen_range(7_000_000_000u64..=9_999_999_999));
        let email = format!("{}.{}@email.com", first.to_lowercase(), last.to_lowercase());
        let address = format!(
            "{}, {}, Mysuru, Karnataka",
            rng.gen_range(1..=999),
            pick(AREAS, rng)?
        );
        tx.execute(
            "INSERT INTO patients (full_name, date_of_birth, gender, phone, email, address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![format!("{first} {last}"), dob, gender, phone, email, address],
        )?;
        patients.push((tx.last_insert_rowid(), gender, dob));
    }
    summary.patients = patients.len();

    let mut doctor_ids = Vec::with_capacity(DOCTORS.len());
    for (name, specialization, phone, email) in DOCTORS {
        tx.execute(
            "INSERT INTO doctors (full_name, specialization, phone, email) VALUES (?1, ?2, ?3, ?4)",
            params![name, specialization, phone, email],
        )?;
        doctor_ids.push(tx.last_insert_rowid());
    }
    summary.doctors = doctor_ids.len();

    let statuses = [
        OrderStatus::Pending,
        OrderStatus::SampleCollected,
        OrderStatus::ResultsEntered,
        OrderStatus::ReportReady,
    ];
    let catalog: Vec<usize> = (0..TESTS.len()).collect();

    for _ in 0..SEED_ORDERS {
        let &(patient_id, gender, dob) = pick(&patients, rng)?;
        let doctor_id = if rng.gen_bool(0.8) {
            Some(*pick(&doctor_ids, rng)?)
        } else {
            None
        };
        let order_date = now - Duration::days(rng.gen_range(0..=30));
        let priority = if rng.gen_bool(0.5) { Priority::Urgent } else { Priority::Normal };
        let status = *pick(&statuses, rng)?;
        let notes = *pick(NOTES, rng)?;
        let count = rng.gen_range(1..=5);
        let selected: Vec<usize> = catalog.choose_multiple(rng, count).copied().collect();
        let total: f64 = selected.iter().map(|&i| TESTS[i].price).sum();

        let stamp = |hours: i64| order_date + Duration::hours(hours);
        let reached = |stage: OrderStatus| {
            statuses.iter().position(|s| *s == status) >= statuses.iter().position(|s| *s == stage)
        };
        let sample_collected_at = reached(OrderStatus::SampleCollected).then(|| stamp(1));
        let results_entered_at = reached(OrderStatus::ResultsEntered).then(|| stamp(6));
        let report_ready_at = reached(OrderStatus::ReportReady).then(|| stamp(8));

        tx.execute(
            "INSERT INTO test_orders
                (patient_id, doctor_id, order_date, priority, status, total_amount, notes,
                 sample_collected_at, results_entered_at, report_ready_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                patient_id,
                doctor_id,
                order_date,
                priority,
                status,
                total,
                notes,
                sample_collected_at,
                results_entered_at,
                report_ready_at,
            ],
        )?;
        let order_id = tx.last_insert_rowid();

        let age = age_on(Some(dob), order_date.date());
        for &index in &selected {
            let test = &TESTS[index];
            let test_id = test_ids[index];
            let ranges = get_reference_ranges(&tx, test_id)?;
            let bounds = applicable_bounds(&ranges, Some(gender), age, test.min, test.max, test.unit);

            let mut value = None;
            let mut flag = None;
            let mut entered_at = None;
            if let (Some(b), Some(entered)) = (&bounds, results_entered_at) {
                if let (Some(min), Some(max)) = (b.min, b.max) {
                    let roll: f64 = rng.gen();
                    let v = if roll < 0.7 || min <= 0.0 {
                        rng.gen_range(min..=max)
                    } else if roll < 0.85 {
                        rng.gen_range(min * 0.5..=min * 0.95)
                    } else {
                        rng.gen_range(max * 1.05..=max * 1.5)
                    };
                    let v = round2(v);
                    value = Some(v);
                    flag = b.flag(v);
                    entered_at = Some(entered);
                }
            }

            tx.execute(
                "INSERT INTO test_order_tests
                    (order_id, test_id, unit, normal_range_text, result_value, result_flag, result_entered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    order_id,
                    test_id,
                    test.unit,
                    bounds.as_ref().and_then(|b| b.text()),
                    value,
                    flag,
                    entered_at,
                ],
            )?;
        }

        log_activity(
            &tx,
            ActivityAction::CreateOrder,
            EntityType::Order,
            Some(order_id),
            "Order created by demo seed",
        )?;
        summary.orders += 1;
    }

    for (key, value) in SETTINGS {
        tx.execute(
            "INSERT INTO app_settings (setting_key, setting_value) VALUES (?1, ?2)
             ON CONFLICT(setting_key) DO NOTHING",
            params![key, value],
        )?;
        summary.settings += 1;
    }

    tx.commit()?;
    tracing::info!(
        patients = summary.patients,
        orders = summary.orders,
        tests = summary.tests,
        "Seeded demo data"
    );
    Ok(Some(summary))
}
