//! Lead export: CSV, JSON and PDF report artifacts
//!
//! Export is read-only over a slice of leads and produces the bytes of a
//! downloadable file. JSON output is the exact record shape, so parsing it
//! back yields the same field values.

use crate::models::Lead;
use crate::time;
use crate::{Error, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leads listed individually in the PDF report
pub const PDF_MAX_LEADS: usize = 20;

const CSV_HEADERS: [&str; 10] = [
    "Address",
    "Lat",
    "Lng",
    "Priority",
    "Distress Score",
    "Property Type",
    "Estimated Value",
    "Notes",
    "Date Tagged",
    "Status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(Error::InvalidInput(format!("unknown export format: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// JSON only; other formats never embed screenshots
    pub include_screenshots: bool,
    pub include_notes: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            include_screenshots: true,
            include_notes: true,
        }
    }
}

/// A rendered export file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render leads in the requested format
///
/// `generated_at` (Unix milliseconds) names the file and dates the PDF.
pub fn export_leads(leads: &[Lead], options: &ExportOptions, generated_at: i64) -> Result<ExportArtifact> {
    let bytes = match options.format {
        ExportFormat::Csv => to_csv(leads, options.include_notes)?.into_bytes(),
        ExportFormat::Json => to_json(leads, options)?,
        ExportFormat::Pdf => to_pdf(leads, options.include_notes, generated_at)?,
    };

    Ok(ExportArtifact {
        filename: format!("leads-{}.{}", generated_at, options.format.extension()),
        mime_type: options.format.mime_type(),
        bytes,
    })
}

/// CSV with a header row
///
/// Fields are quoted only when they contain a delimiter, quote or line
/// break, so an empty notes column is written as an empty field.
pub fn to_csv(leads: &[Lead], include_notes: bool) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for lead in leads {
        let notes = if include_notes { lead.notes.as_str() } else { "" };
        writer.write_record([
            lead.address.clone(),
            lead.lat.to_string(),
            lead.lng.to_string(),
            lead.priority_rating.value().to_string(),
            lead.distress_score.to_string(),
            lead.property_type.to_string(),
            lead.estimated_value.map(|v| v.to_string()).unwrap_or_default(),
            notes.to_string(),
            time::format_date(lead.created_at),
            lead.status.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
}

/// Pretty-printed JSON array of lead records
pub fn to_json(leads: &[Lead], options: &ExportOptions) -> Result<Vec<u8>> {
    if options.include_screenshots && options.include_notes {
        return Ok(serde_json::to_vec_pretty(leads)?);
    }

    let trimmed: Vec<Lead> = leads
        .iter()
        .cloned()
        .map(|mut lead| {
            if !options.include_screenshots {
                lead.screenshots.clear();
            }
            if !options.include_notes {
                lead.notes.clear();
            }
            lead
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&trimmed)?)
}

// Letter page in points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 56;
const NOTES_WRAP_CHARS: usize = 90;

/// One line of report text
struct Line {
    size: i64,
    bold: bool,
    text: String,
    /// Vertical space consumed before drawing this line
    advance: i64,
}

impl Line {
    fn new(size: i64, bold: bool, advance: i64, text: impl Into<String>) -> Self {
        Self {
            size,
            bold,
            text: text.into(),
            advance,
        }
    }
}

/// Plain text PDF report of up to `PDF_MAX_LEADS` leads
pub fn to_pdf(leads: &[Lead], include_notes: bool, generated_at: i64) -> Result<Vec<u8>> {
    let mut lines = vec![
        Line::new(20, true, 0, "Virtual Driving for Dollars - Lead Report"),
        Line::new(12, false, 28, format!("Generated: {}", time::format_date(generated_at))),
        Line::new(12, false, 18, format!("Total Leads: {}", leads.len())),
    ];

    for (index, lead) in leads.iter().take(PDF_MAX_LEADS).enumerate() {
        lines.push(Line::new(14, true, 30, format!("{}. {}", index + 1, lead.address)));
        lines.push(Line::new(
            10,
            false,
            18,
            format!(
                "Priority: {}/5 ({}) | Distress: {}/100",
                lead.priority_rating.value(),
                lead.priority_rating.label(),
                lead.distress_score
            ),
        ));
        lines.push(Line::new(
            10,
            false,
            14,
            format!("Type: {} | Status: {}", lead.property_type, lead.status),
        ));
        if include_notes && !lead.notes.is_empty() {
            for wrapped in wrap_text(&lead.notes, NOTES_WRAP_CHARS) {
                lines.push(Line::new(10, false, 14, wrapped));
            }
        }
    }

    render_pdf(&lines)
}

fn render_pdf(lines: &[Line]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    // Split lines into pages
    let mut pages: Vec<Vec<Operation>> = Vec::new();
    let mut operations = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        if y - line.advance < MARGIN {
            pages.push(std::mem::take(&mut operations));
            y = PAGE_HEIGHT - MARGIN;
        } else {
            y -= line.advance;
        }
        let font = if line.bold { "F2" } else { "F1" };
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), line.size.into()]),
            Operation::new("Td", vec![MARGIN.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(pdf_text(&line.text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
    pages.push(operations);

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Error::Export(e.to_string()))?;
    Ok(buffer)
}

/// Standard Type1 fonts only cover single-byte text
fn pdf_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .collect()
}

/// Greedy word wrap on whitespace; long words are kept whole
///
/// `width` counts characters, not bytes.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_chars = 0;
        for word in paragraph.split_whitespace() {
            let word_chars = word.chars().count();
            if current_chars > 0 && current_chars + 1 + word_chars > width {
                lines.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if current_chars > 0 {
                current.push(' ');
                current_chars += 1;
            }
            current.push_str(word);
            current_chars += word_chars;
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DistressIndicators, LeadInput, LeadStatus, PropertyType};

    fn sample() -> Vec<Lead> {
        let first = LeadInput {
            address: "100 Main St, Springfield".into(),
            lat: 39.781721,
            lng: -89.650148,
            property_type: PropertyType::Duplex,
            estimated_value: Some(185_250.5),
            indicators: DistressIndicators {
                roof_damage: true,
                other: vec!["Tarp on roof".into()],
                ..Default::default()
            },
            notes: "Owner said \"maybe\"".into(),
            screenshots: vec!["data:image/png;base64,AAAA".into()],
            tags: vec!["follow-up".into()],
            status: LeadStatus::Contacted,
            last_contact_date: Some(1_700_000_123_456),
            ..Default::default()
        };
        let second = LeadInput {
            address: "7 Birch Rd".into(),
            lat: 0.1 + 0.2,
            lng: -1e-7,
            ..Default::default()
        };
        vec![
            Lead::new("a".into(), "u1".into(), first, 1_700_000_000_000).unwrap(),
            Lead::new("b".into(), "u1".into(), second, 1_700_000_000_001).unwrap(),
        ]
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&sample(), true).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Address,Lat,Lng,Priority,Distress Score,Property Type,Estimated Value,Notes,Date Tagged,Status"
        );
        assert_eq!(
            lines[1],
            "\"100 Main St, Springfield\",39.781721,-89.650148,3,25,duplex,185250.5,\"Owner said \"\"maybe\"\"\",2023-11-14,contacted"
        );
        assert!(lines[2].starts_with("7 Birch Rd,"));
        // Empty notes stay unquoted
        assert!(lines[2].ends_with(",,2023-11-14,new"));
    }

    #[test]
    fn test_csv_without_notes() {
        let csv = to_csv(&sample(), false).unwrap();
        assert!(!csv.contains("maybe"));
    }

    #[test]
    fn test_json_roundtrip_is_lossless() {
        let leads = sample();
        let artifact = export_leads(
            &leads,
            &ExportOptions {
                format: ExportFormat::Json,
                ..Default::default()
            },
            1_700_000_000_500,
        )
        .unwrap();

        assert_eq!(artifact.filename, "leads-1700000000500.json");
        assert_eq!(artifact.mime_type, "application/json");
        let parsed: Vec<Lead> = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, leads);
    }

    #[test]
    fn test_json_strips_screenshots_when_asked() {
        let options = ExportOptions {
            format: ExportFormat::Json,
            include_screenshots: false,
            include_notes: true,
        };
        let parsed: Vec<Lead> = serde_json::from_slice(&to_json(&sample(), &options).unwrap()).unwrap();
        assert!(parsed.iter().all(|l| l.screenshots.is_empty()));
        assert_eq!(parsed[0].notes, "Owner said \"maybe\"");
    }

    #[test]
    fn test_pdf_is_loadable() {
        let artifact = export_leads(
            &sample(),
            &ExportOptions {
                format: ExportFormat::Pdf,
                ..Default::default()
            },
            1_700_000_000_500,
        )
        .unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_pdf_paginates_long_reports() {
        let mut leads = Vec::new();
        for i in 0..PDF_MAX_LEADS + 5 {
            let input = LeadInput {
                address: format!("{} Long Rd", i),
                notes: "word ".repeat(60),
                ..Default::default()
            };
            leads.push(Lead::new(format!("l{}", i), "u1".into(), input, 1_000).unwrap());
        }
        let bytes = to_pdf(&leads, true, 1_000).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("aaa bbb ccc", 7);
        assert_eq!(lines, vec!["aaa bbb".to_string(), "ccc".to_string()]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_wrap_text_counts_characters() {
        // Each word is 4 characters but 5 bytes
        let text = "Café ".repeat(10);
        let lines = wrap_text(&text, 9);
        assert_eq!(lines.len(), 5);
        for line in &lines {
            assert_eq!(line, "Café Café");
            assert!(line.chars().count() <= 9);
        }
    }

    #[test]
    fn test_csv_quotes_embedded_line_breaks() {
        let mut leads = sample();
        leads[1].notes = "line one\nline two".into();
        let csv = to_csv(&leads, true).unwrap();
        assert!(csv.contains("\"line one\nline two\""));
    }
}
