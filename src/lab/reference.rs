//! Reference ranges: display text, gender-specific selection and result flags.

use crate::models::catalog::{ReferenceRange, TestItem};
use crate::models::enums::{Gender, RangeGender, ResultFlag};

/// Format a bound the way lab sheets print them: shortest form with up to
/// six significant digits (`4000`, `0.27`, `5.6`), scientific outside
/// `1e-4..1e6`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Exponent after rounding to six significant digits, so 999999.5
    // counts as 1e+06.
    let scientific = format!("{value:.5e}");
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exp.parse().unwrap_or(0);
    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs());
    }

    let decimals = (5 - exponent).max(0) as usize;
    trim_zeros(&format!("{value:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `"{min} - {max} {unit}"`, or `None` unless both bounds are known.
pub fn range_text(min: Option<f64>, max: Option<f64>, unit: Option<&str>) -> Option<String> {
    let (min, max) = (min?, max?);
    let unit = unit.map(str::trim).filter(|u| !u.is_empty());
    Some(match unit {
        Some(u) => format!("{} - {} {u}", format_number(min), format_number(max)),
        None => format!("{} - {}", format_number(min), format_number(max)),
    })
}

/// Order in which range genders are tried for a patient.
pub fn preference(gender: Option<Gender>) -> [RangeGender; 3] {
    match gender {
        Some(Gender::Male) => [RangeGender::Male, RangeGender::Any, RangeGender::Female],
        Some(Gender::Female) => [RangeGender::Female, RangeGender::Any, RangeGender::Male],
        _ => [RangeGender::Any, RangeGender::Male, RangeGender::Female],
    }
}

/// Per-gender range texts attached to every catalog test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeTexts {
    pub any: Option<String>,
    pub male: Option<String>,
    pub female: Option<String>,
}

impl RangeTexts {
    /// Build from a test's ranges; ranges without a unit inherit the
    /// test's unit. Later rows of the same gender win.
    pub fn from_ranges(ranges: &[ReferenceRange], test_unit: Option<&str>) -> Self {
        let mut texts = RangeTexts::default();
        for range in ranges {
            let unit = range.unit.as_deref().or(test_unit);
            let Some(text) = range_text(range.normal_min, range.normal_max, unit) else {
                continue;
            };
            match range.gender {
                RangeGender::Any => texts.any = Some(text),
                RangeGender::Male => texts.male = Some(text),
                RangeGender::Female => texts.female = Some(text),
            }
        }
        texts
    }

    fn get(&self, gender: RangeGender) -> Option<&str> {
        match gender {
            RangeGender::Any => self.any.as_deref(),
            RangeGender::Male => self.male.as_deref(),
            RangeGender::Female => self.female.as_deref(),
        }
    }

    /// The text to show for a patient of the given gender.
    pub fn for_patient(&self, gender: Option<Gender>) -> Option<&str> {
        preference(gender).into_iter().find_map(|g| self.get(g))
    }

    /// Like [`for_patient`](Self::for_patient) but `"-"` when nothing applies.
    pub fn display_for(&self, gender: Option<Gender>) -> &str {
        self.for_patient(gender).unwrap_or("-")
    }
}

impl From<&TestItem> for RangeTexts {
    fn from(item: &TestItem) -> Self {
        RangeTexts {
            any: item.any_range_text.clone(),
            male: item.male_range_text.clone(),
            female: item.female_range_text.clone(),
        }
    }
}

/// Bounds that apply to one patient for one test.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: Option<String>,
}

impl Bounds {
    pub fn text(&self) -> Option<String> {
        range_text(self.min, self.max, self.unit.as_deref())
    }

    pub fn flag(&self, value: f64) -> Option<ResultFlag> {
        flag_result(value, self.min, self.max)
    }
}

/// Pick the most specific range for a patient: gender preference first,
/// then age coverage. Ranges without both bounds are ignored.
pub fn select_range(
    ranges: &[ReferenceRange],
    gender: Option<Gender>,
    age: Option<i32>,
) -> Option<&ReferenceRange> {
    preference(gender).into_iter().find_map(|wanted| {
        ranges
            .iter()
            .find(|r| r.gender == wanted && r.has_bounds() && r.covers_age(age))
    })
}

/// Bounds for a patient, falling back to the test's own normal range.
pub fn applicable_bounds(
    ranges: &[ReferenceRange],
    gender: Option<Gender>,
    age: Option<i32>,
    test_min: Option<f64>,
    test_max: Option<f64>,
    test_unit: Option<&str>,
) -> Option<Bounds> {
    if let Some(range) = select_range(ranges, gender, age) {
        return Some(Bounds {
            min: range.normal_min,
            max: range.normal_max,
            unit: range.unit.clone().or_else(|| test_unit.map(str::to_string)),
        });
    }
    if test_min.is_none() && test_max.is_none() {
        return None;
    }
    Some(Bounds {
        min: test_min,
        max: test_max,
        unit: test_unit.map(str::to_string),
    })
}

/// Flag a numeric result against its bounds; `None` when no bound is known.
pub fn flag_result(value: f64, min: Option<f64>, max: Option<f64>) -> Option<ResultFlag> {
    if min.is_none() && max.is_none() {
        return None;
    }
    if min.is_some_and(|m| value < m) {
        return Some(ResultFlag::Low);
    }
    if max.is_some_and(|m| value > m) {
        return Some(ResultFlag::High);
    }
    Some(ResultFlag::Normal)
}
