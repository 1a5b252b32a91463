//! Server-rendered HTML for the assessment form.
//!
//! Every page is the same document: status banner, upload panel, patient
//! form, and (after a submission) the summary table with the risk result.
//! All user-supplied text goes through [`escape_html`].

use std::fmt::Write;

use crate::inference::{ModelStatus, Prediction, RiskLabel};
use crate::models::patient::{Field, FieldKind, PatientRecord};
use crate::pipeline::extraction::ExtractedFields;
use crate::pipeline::normalize::Adjustment;

pub const DISCLAIMER: &str = "This prediction is for educational purposes only. Always consult \
with healthcare professionals for proper medical diagnosis and treatment.";

pub const NO_PATTERNS_WARNING: &str = "No medical data patterns found in the file.";

const SAMPLE_REPORT: &str = "Age: 45\nGender: Male\nBMI: 28.5\nHeart Rate: 75\nGlucose: 110\n\
Cholesterol: 220\nSystolic: 130\nDiastolic: 85\nSmoker: Yes\nCigarettes: 10\n\
Hypertension: No\nDiabetes: No\nStroke: No\nBP Medications: 0";

/// Result of the most recent upload, shown in the upload panel.
#[derive(Debug, Clone)]
pub enum UploadNotice {
    Extracted { filename: String },
    NoPatterns { filename: String },
    Failed { message: String },
}

/// Result of the most recent prediction request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Assessed {
        record: PatientRecord,
        adjustments: Vec<Adjustment>,
        prediction: Prediction,
    },
    /// Summary table shown, but no prediction could be made.
    NotPredicted {
        record: PatientRecord,
        message: String,
    },
    /// The submitted form could not be interpreted.
    Rejected { message: String },
}

/// Everything needed to render the page.
#[derive(Debug, Clone)]
pub struct PageView {
    pub status: ModelStatus,
    /// Values pre-filled into the form inputs.
    pub form: PatientRecord,
    pub name: String,
    pub extracted: ExtractedFields,
    pub upload: Option<UploadNotice>,
    pub outcome: Option<Outcome>,
}

impl PageView {
    pub fn new(status: ModelStatus) -> Self {
        Self {
            status,
            form: PatientRecord::baseline(),
            name: String::new(),
            extracted: ExtractedFields::new(),
            upload: None,
            outcome: None,
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_page(view: &PageView) -> String {
    let mut body = String::new();
    body.push_str(&render_status(&view.status));
    body.push_str(&render_upload_panel(view));
    body.push_str(&render_form(view));
    if let Some(outcome) = &view.outcome {
        body.push_str(&render_outcome(&view.name, outcome));
    }
    body.push_str(&render_instructions());

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Heart Disease Detection Model</title>
<style>
*,*::before,*::after{{box-sizing:border-box}}
body{{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#fafaf9;color:#1c1917;padding:24px}}
main{{max-width:880px;margin:0 auto}}
section{{background:#fff;border-radius:12px;box-shadow:0 2px 12px rgba(0,0,0,.06);padding:20px;margin-bottom:16px}}
h1{{font-size:1.6rem;margin:0 0 16px}}
h2{{font-size:1.15rem;margin:0 0 12px}}
.grid{{display:grid;grid-template-columns:1fr 1fr;gap:12px 24px}}
label{{display:block;font-size:.85rem;color:#44403c;margin-bottom:4px}}
input,select{{width:100%;padding:8px;border:1px solid #d6d3d1;border-radius:8px;font-size:.95rem}}
button{{margin-top:16px;padding:12px 20px;border:none;border-radius:10px;background:#e11d48;color:#fff;font-weight:600;cursor:pointer}}
table{{width:100%;border-collapse:collapse}}
td,th{{text-align:left;padding:6px 8px;border-bottom:1px solid #e7e5e4}}
pre{{background:#f5f5f4;padding:12px;border-radius:8px}}
.ok{{background:#f0fdf4;border:1px solid #bbf7d0;border-radius:8px;padding:10px;margin:8px 0}}
.warn{{background:#fffbeb;border:1px solid #fde68a;border-radius:8px;padding:10px;margin:8px 0}}
.err{{background:#fef2f2;border:1px solid #fecaca;border-radius:8px;padding:10px;margin:8px 0}}
.info{{background:#eff6ff;border:1px solid #bfdbfe;border-radius:8px;padding:10px;margin:8px 0}}
</style>
</head>
<body>
<main>
<h1>Heart Disease Detection Model</h1>
{body}
</main>
</body>
</html>"##
    )
}

fn render_status(status: &ModelStatus) -> String {
    let mut html = String::from("<section id=\"status\">");
    match status {
        ModelStatus::Ready { warnings, .. } => {
            let _ = write!(html, "<div class=\"ok\">{}</div>", status.headline());
            for warning in warnings {
                let _ = write!(html, "<div class=\"warn\">{}</div>", escape_html(warning));
            }
        }
        ModelStatus::Unavailable { reason } => {
            let _ = write!(
                html,
                "<div class=\"err\">{}<br><small>{}</small></div>",
                status.headline(),
                escape_html(reason)
            );
        }
    }
    html.push_str("</section>");
    html
}

fn render_upload_panel(view: &PageView) -> String {
    let mut html = String::from(
        r#"<section id="upload"><h2>File Upload</h2>
<form method="post" action="/upload" enctype="multipart/form-data">
<label for="file">Upload medical report (TXT or PDF)</label>
<input id="file" type="file" name="file" accept=".txt,.pdf,text/plain,application/pdf">
<button type="submit">Extract Data</button>
</form>"#,
    );

    match &view.upload {
        Some(UploadNotice::Extracted { filename }) => {
            let _ = write!(
                html,
                "<div class=\"ok\">File uploaded: {}</div><p><strong>Extracted Data:</strong></p><ul>",
                escape_html(filename)
            );
            for (field, value) in view.extracted.iter() {
                let _ = write!(html, "<li>{}: {}</li>", field.as_str(), value);
            }
            html.push_str("</ul>");
        }
        Some(UploadNotice::NoPatterns { filename }) => {
            let _ = write!(
                html,
                "<div class=\"ok\">File uploaded: {}</div><div class=\"warn\">{NO_PATTERNS_WARNING}</div>",
                escape_html(filename)
            );
        }
        Some(UploadNotice::Failed { message }) => {
            let _ = write!(html, "<div class=\"err\">{}</div>", escape_html(message));
        }
        None => {}
    }

    html.push_str("</section>");
    html
}

fn render_form(view: &PageView) -> String {
    let extracted_json = serde_json::to_string(&view.extracted).unwrap_or_else(|_| "{}".into());

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<section id="patient"><h2>Patient Information</h2>
<form method="post" action="/predict">
<input type="hidden" name="extracted" value="{}">
<div class="grid">
<div><label for="name">Enter your name</label><input id="name" type="text" name="name" value="{}"></div>"#,
        escape_html(&extracted_json),
        escape_html(&view.name)
    );
    for field in Field::ALL {
        html.push_str(&field_input(field, &view.form));
    }
    let disabled = if view.status.is_ready() { "" } else { " disabled" };
    let _ = write!(
        html,
        "</div>\n<button type=\"submit\"{disabled}>Predict Heart Disease Risk</button>\n</form></section>"
    );
    html
}

fn field_input(field: Field, record: &PatientRecord) -> String {
    let name = field.as_str();
    let label = field.label();
    let value = record.value(field);

    let select = |options: [(&str, &str, bool); 2]| {
        let mut s = format!("<div><label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">");
        for (option_value, text, selected) in options {
            let attr = if selected { " selected" } else { "" };
            let _ = write!(s, "<option value=\"{option_value}\"{attr}>{text}</option>");
        }
        s.push_str("</select></div>");
        s
    };

    match (field, field.kind()) {
        (Field::Male, _) => select([
            ("male", "Male", value != 0.0),
            ("female", "Female", value == 0.0),
        ]),
        (Field::BpMeds, _) | (_, FieldKind::Integer | FieldKind::Continuous) => {
            let (min, max) = field.domain();
            let step = match field.kind() {
                FieldKind::Continuous => "any",
                _ => "1",
            };
            format!(
                "<div><label for=\"{name}\">{label}</label><input id=\"{name}\" type=\"number\" \
                 name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\"></div>"
            )
        }
        (_, FieldKind::Binary) => select([
            ("no", "No", value == 0.0),
            ("yes", "Yes", value != 0.0),
        ]),
    }
}

fn render_outcome(name: &str, outcome: &Outcome) -> String {
    let mut html = String::from("<section id=\"result\">");
    match outcome {
        Outcome::Assessed {
            record,
            adjustments,
            prediction,
        } => {
            html.push_str(&render_summary(name, record));
            for adjustment in adjustments {
                let _ = write!(html, "<div class=\"warn\">{}</div>", escape_html(&adjustment.to_string()));
            }
            html.push_str("<h2>Prediction Results</h2>");
            match prediction.label {
                RiskLabel::High => {
                    html.push_str("<div class=\"err\"><strong>High Risk</strong> - Heart disease risk detected</div>")
                }
                RiskLabel::Low => html.push_str(
                    "<div class=\"ok\"><strong>Low Risk</strong> - No immediate heart disease risk detected</div>",
                ),
            }
            if let Some(percent) = prediction.probability_percent() {
                let _ = write!(html, "<p>Risk Probability: <strong>{percent}</strong></p>");
            }
            let _ = write!(html, "<div class=\"info\"><strong>Disclaimer</strong>: {DISCLAIMER}</div>");
        }
        Outcome::NotPredicted { record, message } => {
            html.push_str(&render_summary(name, record));
            let _ = write!(html, "<div class=\"err\">{}</div>", escape_html(message));
        }
        Outcome::Rejected { message } => {
            let _ = write!(html, "<div class=\"err\">{}</div>", escape_html(message));
        }
    }
    html.push_str("</section>");
    html
}

fn render_summary(name: &str, record: &PatientRecord) -> String {
    let mut html = String::from(
        "<h2>Patient Data Summary</h2><table><thead><tr><th>Parameter</th><th>Value</th></tr></thead><tbody>",
    );
    let _ = write!(html, "<tr><td>Name</td><td>{}</td></tr>", escape_html(name));
    for field in Field::ALL {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            field.label(),
            escape_html(&record.display_value(field))
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn render_instructions() -> String {
    format!(
        "<section id=\"instructions\"><h2>File Format Instructions</h2>\
         <p><strong>For TXT files, include data like:</strong></p><pre>{SAMPLE_REPORT}</pre>\
         <p><strong>For PDF files:</strong> upload medical reports containing similar information.</p></section>"
    )
}
