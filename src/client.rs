//! Typed HTTP client for the laboratory API.
//!
//! One method per endpoint. Non-success responses surface as
//! [`ClientError::Status`] carrying the response body, so callers can show
//! the server's `detail` message as is.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::api::endpoints::health::HealthResponse;
use crate::api::endpoints::orders::ResultsResponse;
use crate::api::endpoints::StatusResponse;
use crate::lab::dashboard::DashboardView;
use crate::lab::patient::filter_patients;
use crate::lab::search::{filter_doctors, order_total, test_choices, OrderFilter, TestChoice};
use crate::lab::sql_guard;
use crate::models::{
    ActivityLogItem, CreateOrderPayload, CreatedOrder, DashboardResponse, Doctor, DoctorInput,
    Gender, LabSettings, OrderDetail, OrderListItem, Patient, PatientInput, PatientUpdate,
    ReportListItem, SqlQueryPayload, SqlQueryResult, TestCategory, TestInput, TestItem,
    UpdateOrderPayload, UpdateResultsPayload,
};
use crate::report::ReportDocument;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{context} failed: {status} {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("Only SELECT queries are allowed.")]
    SelectOnly,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Async client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct LabClient {
    base_url: String,
    client: reqwest::Client,
}

impl LabClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client for `Config::api_url`.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, ClientError> {
        Self::new(&config.api_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send().await?;
        Ok(ensure_success(response, context).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
        context: &'static str,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Ok(ensure_success(response, context).await?.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("/health", "Health check").await
    }

    // Patients

    pub async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        self.get_json("/patients", "Patients fetch").await
    }

    pub async fn get_patient(&self, id: i64) -> Result<Patient, ClientError> {
        self.get_json(&format!("/patients/{id}"), "Fetch patient").await
    }

    pub async fn create_patient(&self, input: &PatientInput) -> Result<Patient, ClientError> {
        self.send_json(reqwest::Method::POST, "/patients", input, "Create patient")
            .await
    }

    pub async fn update_patient(
        &self,
        id: i64,
        update: &PatientUpdate,
    ) -> Result<Patient, ClientError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/patients/{id}"),
            update,
            "Update patient",
        )
        .await
    }

    pub async fn delete_patient(&self, id: i64) -> Result<StatusResponse, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/patients/{id}")))
            .send()
            .await?;
        Ok(ensure_success(response, "Delete patient").await?.json().await?)
    }

    // Catalog and directory

    pub async fn list_tests(&self) -> Result<Vec<TestItem>, ClientError> {
        self.get_json("/tests", "Tests fetch").await
    }

    pub async fn create_test(&self, input: &TestInput) -> Result<TestItem, ClientError> {
        self.send_json(reqwest::Method::POST, "/tests", input, "Create test")
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<TestCategory>, ClientError> {
        self.get_json("/test-categories", "Categories fetch").await
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ClientError> {
        self.get_json("/doctors", "Doctors fetch").await
    }

    pub async fn create_doctor(&self, input: &DoctorInput) -> Result<Doctor, ClientError> {
        self.send_json(reqwest::Method::POST, "/doctors", input, "Create doctor")
            .await
    }

    // Orders

    pub async fn list_orders(&self) -> Result<Vec<OrderListItem>, ClientError> {
        self.get_json("/orders", "Orders fetch").await
    }

    pub async fn create_order(
        &self,
        payload: &CreateOrderPayload,
    ) -> Result<CreatedOrder, ClientError> {
        self.send_json(reqwest::Method::POST, "/orders", payload, "Create order")
            .await
    }

    pub async fn get_order(&self, id: i64) -> Result<OrderDetail, ClientError> {
        self.get_json(&format!("/orders/{id}"), "Fetch order detail")
            .await
    }

    pub async fn update_order(
        &self,
        id: i64,
        payload: &UpdateOrderPayload,
    ) -> Result<StatusResponse, ClientError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/orders/{id}"),
            payload,
            "Update order",
        )
        .await
    }

    pub async fn update_results(
        &self,
        id: i64,
        payload: &UpdateResultsPayload,
    ) -> Result<ResultsResponse, ClientError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/orders/{id}/results"),
            payload,
            "Update results",
        )
        .await
    }

    // Reports

    pub async fn list_reports(&self) -> Result<Vec<ReportListItem>, ClientError> {
        self.get_json("/reports", "Reports fetch").await
    }

    /// Raw PDF bytes of an order report.
    pub async fn report_pdf(&self, id: i64) -> Result<Vec<u8>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/reports/{id}/pdf")))
            .send()
            .await?;
        let bytes = ensure_success(response, "Report download").await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    // Dashboard, activity, settings

    pub async fn dashboard(&self) -> Result<DashboardResponse, ClientError> {
        self.get_json("/dashboard", "Dashboard fetch").await
    }

    pub async fn activity(&self, limit: Option<i64>) -> Result<Vec<ActivityLogItem>, ClientError> {
        let path = match limit {
            Some(limit) => format!("/activity?limit={limit}"),
            None => "/activity".to_string(),
        };
        self.get_json(&path, "Activity fetch").await
    }

    pub async fn settings(&self) -> Result<LabSettings, ClientError> {
        self.get_json("/settings", "Settings fetch").await
    }

    pub async fn update_settings(
        &self,
        settings: &LabSettings,
    ) -> Result<StatusResponse, ClientError> {
        self.send_json(reqwest::Method::PUT, "/settings", settings, "Update settings")
            .await
    }

    /// Run a console query. Anything not starting with `select` is refused
    /// before a request is made.
    pub async fn run_sql(&self, query: &str) -> Result<SqlQueryResult, ClientError> {
        if !sql_guard::starts_with_select(query) {
            return Err(ClientError::SelectOnly);
        }
        let payload = SqlQueryPayload {
            query: query.to_string(),
        };
        self.send_json(reqwest::Method::POST, "/sql-demo", &payload, "SQL demo")
            .await
    }
}

/// Page-level views computed from API responses.
impl LabClient {
    /// Registry search by name or phone.
    pub async fn search_patients(&self, term: &str) -> Result<Vec<Patient>, ClientError> {
        let patients = self.list_patients().await?;
        Ok(filter_patients(&patients, term).into_iter().cloned().collect())
    }

    pub async fn search_doctors(&self, term: &str) -> Result<Vec<Doctor>, ClientError> {
        let doctors = self.list_doctors().await?;
        Ok(filter_doctors(&doctors, term).into_iter().cloned().collect())
    }

    /// Tests offered on the new-order form, with the range for the
    /// selected patient's gender.
    pub async fn test_choices(
        &self,
        term: &str,
        gender: Option<Gender>,
    ) -> Result<Vec<TestChoice>, ClientError> {
        let tests = self.list_tests().await?;
        Ok(test_choices(&tests, term, gender))
    }

    /// Price of an order before it is placed.
    pub async fn order_quote(&self, test_ids: &[i64]) -> Result<f64, ClientError> {
        let tests = self.list_tests().await?;
        Ok(order_total(&tests, test_ids))
    }

    pub async fn filtered_orders(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderListItem>, ClientError> {
        let orders = self.list_orders().await?;
        Ok(filter.apply(&orders).into_iter().cloned().collect())
    }

    pub async fn dashboard_view(&self) -> Result<DashboardView, ClientError> {
        Ok(DashboardView::from_response(&self.dashboard().await?))
    }

    /// Report of an order as shown on screen; `render_text` prints it.
    pub async fn report_document(
        &self,
        id: i64,
        today: chrono::NaiveDate,
    ) -> Result<ReportDocument, ClientError> {
        let detail = self.get_order(id).await?;
        let settings = self.settings().await?;
        Ok(ReportDocument::build(&detail, &settings, today))
    }
}

async fn ensure_success(response: Response, context: &'static str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = if body.is_empty() {
        reason(status)
    } else {
        body
    };
    tracing::debug!(context, status = status.as_u16(), "API request rejected");
    Err(ClientError::Status {
        context,
        status: status.as_u16(),
        body,
    })
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use super::*;
    use crate::api::{start_server, ApiContext, ApiServer};
    use crate::db;
    use crate::models::{DisplayStatus, TestResultItem};

    struct Harness {
        _dir: tempfile::TempDir,
        server: ApiServer,
        client: LabClient,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("lab.db");
        db::open_database(&db_path).unwrap();

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        let server = start_server(ApiContext::new(&db_path), addr).await.unwrap();
        let client = LabClient::new(&server.session.base_url()).unwrap();
        Harness {
            _dir: dir,
            server,
            client,
        }
    }

    async fn stop(mut h: Harness) {
        h.server.shutdown();
        h.server.stopped().await;
    }

    fn patient_input(name: &str, gender: &str) -> PatientInput {
        PatientInput {
            full_name: name.into(),
            date_of_birth: Some("1988-03-14".into()),
            gender: Some(gender.into()),
            ..Default::default()
        }
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = LabClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/health"), "http://localhost:8000/api/health");
    }

    #[test]
    fn status_error_message_names_context() {
        let err = ClientError::Status {
            context: "Create patient",
            status: 400,
            body: "bad".into(),
        };
        assert_eq!(err.to_string(), "Create patient failed: 400 bad");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn health_reports_version() {
        let h = harness().await;
        let health = h.client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, crate::config::APP_VERSION);
        stop(h).await;
    }

    #[tokio::test]
    async fn patient_round_trip_through_api() {
        let h = harness().await;
        let created = h
            .client
            .create_patient(&patient_input("Meera Iyer", "female"))
            .await
            .unwrap();
        assert_eq!(created.full_name, "Meera Iyer");

        let updated = h
            .client
            .update_patient(
                created.patient_id,
                &PatientUpdate {
                    phone: Some("080-2222".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("080-2222"));

        let listed = h.client.list_patients().await.unwrap();
        assert_eq!(listed.len(), 1);

        let ack = h.client.delete_patient(created.patient_id).await.unwrap();
        assert_eq!(ack, StatusResponse::ok());

        let err = h.client.get_patient(created.patient_id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        stop(h).await;
    }

    #[tokio::test]
    async fn validation_failure_carries_server_detail() {
        let h = harness().await;
        let err = h
            .client
            .create_patient(&patient_input("  ", "M"))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Create patient failed: 400"), "{message}");
        assert!(message.contains("Full name is required"), "{message}");
        stop(h).await;
    }

    #[tokio::test]
    async fn order_flow_reaches_reports() {
        let h = harness().await;
        let patient = h
            .client
            .create_patient(&patient_input("Rahul Nair", "M"))
            .await
            .unwrap();
        let doctor = h
            .client
            .create_doctor(&DoctorInput {
                full_name: "Dr. Kavita Shah".into(),
                specialization: Some("Pathology".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let test = h
            .client
            .create_test(&TestInput {
                test_name: "Fasting Glucose".into(),
                unit: Some("mg/dL".into()),
                normal_min: Some(70.0),
                normal_max: Some(99.0),
                price: 150.0,
                ..Default::default()
            })
            .await
            .unwrap();

        let created = h
            .client
            .create_order(&CreateOrderPayload {
                patient_id: patient.patient_id,
                doctor_id: Some(doctor.doctor_id),
                priority: Some("urgent".into()),
                notes: None,
                test_ids: vec![test.test_id],
            })
            .await
            .unwrap();

        let orders = h.client.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, DisplayStatus::Pending);

        let ack = h
            .client
            .update_order(
                created.order_id,
                &UpdateOrderPayload {
                    status: Some("in-progress".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ack.status, "ok");

        let results = h
            .client
            .update_results(
                created.order_id,
                &UpdateResultsPayload {
                    results: vec![
                        TestResultItem {
                            test_id: test.test_id,
                            value: Some(130.0),
                        },
                        TestResultItem {
                            test_id: 9999,
                            value: Some(1.0),
                        },
                    ],
                    mark_completed: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(results.updated, 1);
        assert_eq!(results.skipped, vec![9999]);
        assert_eq!(results.order_status, DisplayStatus::Completed);

        let detail = h.client.get_order(created.order_id).await.unwrap();
        assert_eq!(detail.tests[0].result_value, Some(130.0));
        assert_eq!(detail.doctor_name.as_deref(), Some("Dr. Kavita Shah"));

        let reports = h.client.list_reports().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].total_amount, 150.0);

        let pdf = h.client.report_pdf(created.order_id).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let feed = h.client.activity(Some(2)).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].action, "UPDATE_RESULTS");

        let dashboard = h.client.dashboard().await.unwrap();
        assert_eq!(dashboard.stats.orders_today, 1);
        assert_eq!(dashboard.orders_last_7_days.len(), 7);
        stop(h).await;
    }

    #[tokio::test]
    async fn empty_order_rejected() {
        let h = harness().await;
        let patient = h
            .client
            .create_patient(&patient_input("Asha Menon", "F"))
            .await
            .unwrap();
        let err = h
            .client
            .create_order(&CreateOrderPayload {
                patient_id: patient.patient_id,
                doctor_id: None,
                priority: None,
                notes: None,
                test_ids: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("At least one test is required"));
        stop(h).await;
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let h = harness().await;
        let mut settings = LabSettings::default();
        settings
            .settings
            .insert("lab_name".into(), "City Diagnostics".into());
        let ack = h.client.update_settings(&settings).await.unwrap();
        assert_eq!(ack, StatusResponse::ok());

        let stored = h.client.settings().await.unwrap();
        assert_eq!(stored.get("lab_name"), Some("City Diagnostics"));
        stop(h).await;
    }

    #[tokio::test]
    async fn sql_console_checks_prefix_locally() {
        let h = harness().await;
        let err = h.client.run_sql("DELETE FROM patients").await.unwrap_err();
        assert!(matches!(err, ClientError::SelectOnly));

        let result = h
            .client
            .run_sql("select count(*) as n from patients")
            .await
            .unwrap();
        assert_eq!(result.columns, vec!["n"]);
        assert_eq!(result.rows[0][0], serde_json::json!(0));

        // Passes the prefix check, rejected by the server
        let err = h
            .client
            .run_sql("select 1; drop table patients")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        stop(h).await;
    }

    #[tokio::test]
    async fn derived_views_filter_and_summarise() {
        let h = harness().await;
        let meera = h
            .client
            .create_patient(&patient_input("Meera Iyer", "F"))
            .await
            .unwrap();
        h.client
            .create_patient(&patient_input("Rahul Nair", "M"))
            .await
            .unwrap();
        h.client
            .create_doctor(&DoctorInput {
                full_name: "Dr. Kavita Shah".into(),
                specialization: Some("Pathology".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let sugar = h
            .client
            .create_test(&TestInput {
                test_name: "Fasting Glucose".into(),
                sample_type: Some("Blood".into()),
                unit: Some("mg/dL".into()),
                normal_min: Some(70.0),
                normal_max: Some(99.0),
                price: 150.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let lipid = h
            .client
            .create_test(&TestInput {
                test_name: "Lipid Profile".into(),
                sample_type: Some("Blood".into()),
                price: 700.0,
                ..Default::default()
            })
            .await
            .unwrap();

        let found = h.client.search_patients("meera").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].patient_id, meera.patient_id);
        assert_eq!(h.client.search_doctors("patho").await.unwrap().len(), 1);

        let choices = h
            .client
            .test_choices("glucose", Some(Gender::Female))
            .await
            .unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].range_text, "70 - 99 mg/dL");

        let quote = h
            .client
            .order_quote(&[sugar.test_id, lipid.test_id])
            .await
            .unwrap();
        assert_eq!(quote, 850.0);

        let created = h
            .client
            .create_order(&CreateOrderPayload {
                patient_id: meera.patient_id,
                doctor_id: None,
                priority: Some("urgent".into()),
                notes: None,
                test_ids: vec![sugar.test_id, lipid.test_id],
            })
            .await
            .unwrap();
        h.client
            .update_results(
                created.order_id,
                &UpdateResultsPayload {
                    results: vec![TestResultItem {
                        test_id: sugar.test_id,
                        value: Some(120.0),
                    }],
                    mark_completed: false,
                },
            )
            .await
            .unwrap();

        let urgent = h
            .client
            .filtered_orders(&OrderFilter::from_selection("all", "urgent"))
            .await
            .unwrap();
        assert_eq!(urgent.len(), 1);
        let done = h
            .client
            .filtered_orders(&OrderFilter::from_selection("completed", "all"))
            .await
            .unwrap();
        assert!(done.is_empty());

        let view = h.client.dashboard_view().await.unwrap();
        assert_eq!(view.cards[0].title, "Orders Today");
        assert_eq!(view.cards[0].value, 1);
        assert_eq!(view.scale, 1);

        let today = chrono::Utc::now().date_naive();
        let report = h
            .client
            .report_document(created.order_id, today)
            .await
            .unwrap();
        assert_eq!(report.flagged().count(), 1);
        assert!(report.render_text().contains("Abnormal: Fasting Glucose (HIGH)"));
        stop(h).await;
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        let client = LabClient::with_timeout("http://127.0.0.1:9", 2).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
