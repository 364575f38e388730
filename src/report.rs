//! Printable order reports.
//!
//! A `ReportDocument` is assembled from an order detail and the lab
//! settings, then rendered either as plain text (terminals, logs) or as
//! an A4 PDF via `printpdf`.

use std::io::BufWriter;

use chrono::NaiveDate;
use printpdf::*;
use thiserror::Error;

use crate::lab::patient::{age_on, gender_label};
use crate::lab::reference::format_number;
use crate::models::{
    LabSettings, OrderDetail, ResultFlag, LAB_ADDRESS, LAB_EMAIL, LAB_LICENSE, LAB_NAME, LAB_PHONE,
    REPORT_FOOTER, REPORT_HEADER,
};

const DEFAULT_TITLE: &str = "Laboratory Report";
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 25.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// One printed test line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub test_name: String,
    pub result: String,
    pub unit: String,
    pub normal_range: String,
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub lab_name: String,
    pub lab_address: Option<String>,
    pub lab_contact: Option<String>,
    pub lab_license: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub order_id: i64,
    pub order_date: String,
    pub priority: String,
    pub status: String,
    pub patient_name: String,
    pub age_gender: String,
    pub doctor: String,
    pub rows: Vec<ReportRow>,
    pub total_amount: f64,
}

impl ReportDocument {
    pub fn build(detail: &OrderDetail, settings: &LabSettings, today: NaiveDate) -> Self {
        let owned = |key: &str| settings.get(key).map(str::to_string);

        let contact: Vec<&str> = [settings.get(LAB_PHONE), settings.get(LAB_EMAIL)]
            .into_iter()
            .flatten()
            .collect();

        let age = age_on(detail.patient_dob, today)
            .map(|a| format!("{a} Y"))
            .unwrap_or_else(|| "-".into());

        let doctor = match (&detail.doctor_name, &detail.doctor_specialization) {
            (Some(name), Some(spec)) => format!("{name} ({spec})"),
            (Some(name), None) => name.clone(),
            _ => "-".into(),
        };

        let rows = detail
            .tests
            .iter()
            .map(|t| ReportRow {
                test_name: t.test_name.clone(),
                result: t.result_value.map(format_number).unwrap_or_else(|| "-".into()),
                unit: t.unit.clone().unwrap_or_default(),
                normal_range: t.normal_range_text.clone().unwrap_or_else(|| "-".into()),
                flag: t.result_flag.map(|f| f.to_string()).unwrap_or_default(),
            })
            .collect();

        ReportDocument {
            lab_name: owned(LAB_NAME).unwrap_or_else(|| DEFAULT_TITLE.into()),
            lab_address: owned(LAB_ADDRESS),
            lab_contact: (!contact.is_empty()).then(|| contact.join(" | ")),
            lab_license: owned(LAB_LICENSE),
            header: owned(REPORT_HEADER),
            footer: owned(REPORT_FOOTER),
            order_id: detail.order_id,
            order_date: detail
                .order_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            priority: detail.priority.to_string(),
            status: detail.status.to_string(),
            patient_name: detail.patient_name.clone(),
            age_gender: format!("{age} / {}", gender_label(detail.patient_gender)),
            doctor,
            rows,
            total_amount: detail.total_amount,
        }
    }

    /// Abnormal rows, for summaries.
    pub fn flagged(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows
            .iter()
            .filter(|r| r.flag == ResultFlag::Low.as_str() || r.flag == ResultFlag::High.as_str())
    }

    pub fn file_name(&self) -> String {
        format!("report-{}.pdf", self.order_id)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.lab_name);
        out.push('\n');
        for line in [&self.lab_address, &self.lab_contact, &self.header]
            .into_iter()
            .flatten()
        {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&format!("Order #{}    Date: {}\n", self.order_id, self.order_date));
        out.push_str(&format!("Patient: {}    Age/Gender: {}\n", self.patient_name, self.age_gender));
        out.push_str(&format!("Referred by: {}\n", self.doctor));
        out.push_str(&format!("Priority: {}    Status: {}\n\n", self.priority, self.status));

        out.push_str(&format!(
            "{:<36} {:>10} {:<10} {:<22} {}\n",
            "Test", "Result", "Unit", "Normal Range", "Flag"
        ));
        for row in &self.rows {
            out.push_str(&format!(
                "{:<36} {:>10} {:<10} {:<22} {}\n",
                row.test_name, row.result, row.unit, row.normal_range, row.flag
            ));
        }
        let abnormal: Vec<String> = self
            .flagged()
            .map(|r| format!("{} ({})", r.test_name, r.flag))
            .collect();
        if !abnormal.is_empty() {
            out.push_str(&format!("\nAbnormal: {}\n", abnormal.join(", ")));
        }
        out.push_str(&format!("\nTotal: {:.2}\n", self.total_amount));
        if let Some(footer) = &self.footer {
            out.push('\n');
            out.push_str(footer);
            out.push('\n');
        }
        out
    }

    /// Render as an A4 PDF. Long test lists continue on new pages.
    pub fn render_pdf(&self) -> Result<Vec<u8>, ReportError> {
        let title = format!("{} - Order #{}", self.lab_name, self.order_id);
        let (doc, page1, layer1) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let mut layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

        let mut y = Mm(TOP);

        // Lab header
        layer.use_text(&self.lab_name, 16.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for line in [&self.lab_address, &self.lab_contact, &self.lab_license]
            .into_iter()
            .flatten()
        {
            layer.use_text(line, 9.0, Mm(20.0), y, &font);
            y -= Mm(4.5);
        }
        if let Some(header) = &self.header {
            y -= Mm(1.5);
            layer.use_text(header, 9.0, Mm(20.0), y, &bold);
            y -= Mm(4.5);
        }
        y -= Mm(6.0);

        // Patient block
        let info = [
            ("Patient:", self.patient_name.as_str(), "Order:", format!("#{}", self.order_id)),
            ("Age/Gender:", self.age_gender.as_str(), "Date:", self.order_date.clone()),
            ("Referred by:", self.doctor.as_str(), "Priority:", self.priority.clone()),
        ];
        for (left_label, left, right_label, right) in &info {
            layer.use_text(*left_label, 10.0, Mm(20.0), y, &bold);
            layer.use_text(*left, 10.0, Mm(45.0), y, &font);
            layer.use_text(*right_label, 10.0, Mm(130.0), y, &bold);
            layer.use_text(right.as_str(), 10.0, Mm(150.0), y, &font);
            y -= Mm(5.5);
        }
        y -= Mm(6.0);

        let columns = [20.0, 95.0, 120.0, 145.0, 185.0];
        let heading = ["Test", "Result", "Unit", "Normal Range", "Flag"];
        let draw_heading = |layer: &PdfLayerReference, y: Mm| {
            for (x, text) in columns.iter().zip(heading) {
                layer.use_text(text, 10.0, Mm(*x), y, &bold);
            }
        };
        draw_heading(&layer, y);
        y -= Mm(6.0);

        for row in &self.rows {
            if y < Mm(BOTTOM) {
                let (page, layer_index) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                layer = doc.get_page(page).get_layer(layer_index);
                y = Mm(TOP);
                draw_heading(&layer, y);
                y -= Mm(6.0);
            }
            let cells = [&row.test_name, &row.result, &row.unit, &row.normal_range, &row.flag];
            for (i, (x, text)) in columns.iter().zip(cells).enumerate() {
                let face = if i == 4 && !text.is_empty() { &bold } else { &font };
                layer.use_text(text.as_str(), 9.0, Mm(*x), y, face);
            }
            y -= Mm(5.0);
        }

        y -= Mm(4.0);
        layer.use_text(
            format!("Total: {:.2}", self.total_amount),
            10.0,
            Mm(145.0),
            y,
            &bold,
        );

        if let Some(footer) = &self.footer {
            layer.use_text(footer, 8.0, Mm(20.0), Mm(12.0), &font);
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::{DisplayPriority, DisplayStatus, Gender, OrderTestItem};

    fn detail(lines: usize) -> OrderDetail {
        let tests = (0..lines)
            .map(|i| OrderTestItem {
                test_id: i as i64 + 1,
                test_name: format!("Test {i}"),
                unit: Some("mg/dL".into()),
                normal_range_text: Some("70 - 99 mg/dL".into()),
                result_value: if i == 0 { Some(126.0) } else { None },
                result_flag: if i == 0 { Some(ResultFlag::High) } else { None },
                result_entered_at: None,
                price: 150.0,
            })
            .collect();
        OrderDetail {
            order_id: 12,
            order_date: NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(9, 15, 0),
            priority: DisplayPriority::Urgent,
            status: DisplayStatus::Completed,
            total_amount: 150.0 * lines as f64,
            notes: None,
            patient_id: 1,
            patient_name: "Sneha Reddy".into(),
            patient_dob: NaiveDate::from_ymd_opt(1990, 10, 20),
            patient_gender: Some(Gender::Female),
            doctor_id: Some(2),
            doctor_name: Some("Dr. Arun Reddy".into()),
            doctor_specialization: Some("Endocrinologist".into()),
            sample_collected_at: None,
            results_entered_at: None,
            report_ready_at: None,
            tests,
        }
    }

    fn settings() -> LabSettings {
        let mut map = BTreeMap::new();
        map.insert(LAB_NAME.to_string(), "MedLAB+ Diagnostic Center".to_string());
        map.insert(LAB_PHONE.to_string(), "+91-821-2345678".to_string());
        map.insert(LAB_EMAIL.to_string(), "contact@medlabplus.com".to_string());
        map.insert(REPORT_FOOTER.to_string(), "Computer generated report".to_string());
        map.insert(REPORT_HEADER.to_string(), "  ".to_string());
        LabSettings { settings: map }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn build_fills_patient_and_lab_fields() {
        let doc = ReportDocument::build(&detail(2), &settings(), today());
        assert_eq!(doc.lab_name, "MedLAB+ Diagnostic Center");
        assert_eq!(doc.lab_contact.as_deref(), Some("+91-821-2345678 | contact@medlabplus.com"));
        assert_eq!(doc.header, None);
        // Birthday tomorrow: still 35
        assert_eq!(doc.age_gender, "35 Y / Female");
        assert_eq!(doc.doctor, "Dr. Arun Reddy (Endocrinologist)");
        assert_eq!(doc.priority, "urgent");
        assert_eq!(doc.rows[0].result, "126");
        assert_eq!(doc.rows[0].flag, "HIGH");
        assert_eq!(doc.rows[1].result, "-");
        assert_eq!(doc.flagged().count(), 1);
        assert_eq!(doc.file_name(), "report-12.pdf");
    }

    #[test]
    fn missing_settings_fall_back_to_title() {
        let doc = ReportDocument::build(&detail(1), &LabSettings::default(), today());
        assert_eq!(doc.lab_name, "Laboratory Report");
        assert_eq!(doc.lab_contact, None);
    }

    #[test]
    fn text_lists_every_test() {
        let text = ReportDocument::build(&detail(3), &settings(), today()).render_text();
        assert!(text.starts_with("MedLAB+ Diagnostic Center\n"));
        assert!(text.contains("Patient: Sneha Reddy"));
        assert!(text.contains("Test 2"));
        assert!(text.contains("Abnormal: Test 0 (HIGH)\n"));
        assert!(text.contains("Total: 450.00"));
        assert!(text.trim_end().ends_with("Computer generated report"));
    }

    #[test]
    fn text_omits_abnormal_line_without_flags() {
        let mut order = detail(2);
        order.tests[0].result_flag = Some(ResultFlag::Normal);
        let text = ReportDocument::build(&order, &settings(), today()).render_text();
        assert!(!text.contains("Abnormal:"));
    }

    #[test]
    fn pdf_has_header_and_spans_pages() {
        let short = ReportDocument::build(&detail(2), &settings(), today())
            .render_pdf()
            .unwrap();
        assert!(short.starts_with(b"%PDF"));

        let long = ReportDocument::build(&detail(80), &settings(), today())
            .render_pdf()
            .unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }
}
