//! CV document renderer
//!
//! Renders a fully assembled (and possibly translated) display context
//! into a printable PDF. Pure function of its input: the context already
//! contains every string to display, and nothing is fetched or persisted
//! here.

use crate::cv::CvContext;
use crate::errors::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A rendered document plus its suggested download filename
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
}

// A4 portrait in points
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const LINE_GAP: f32 = 5.0;
const SECTION_GAP: f32 = 12.0;

/// Regular or bold Helvetica, keyed into the page resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_key(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// One laid-out line of text
struct Line {
    text: String,
    font: Font,
    size: f32,
    gap_before: f32,
}

/// Suggested filename for a candidate's CV download
pub fn suggested_filename(first_name: &str, last_name: &str) -> String {
    let clean = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_{}_CV.pdf", clean(first_name), clean(last_name))
}

/// Render a display context into PDF bytes plus a suggested filename
pub fn render_cv_pdf(ctx: &CvContext) -> Result<RenderedPdf> {
    let lines = layout(ctx);
    let bytes = write_document(&lines)?;

    tracing::debug!(
        candidate_id = %ctx.candidate_id,
        bytes = bytes.len(),
        "CV PDF rendered"
    );

    Ok(RenderedPdf {
        bytes,
        filename: suggested_filename(&ctx.first_name, &ctx.last_name),
    })
}

/// Flatten the context into a list of styled lines
fn layout(ctx: &CvContext) -> Vec<Line> {
    let wrap_width = (PAGE_WIDTH - 2.0 * MARGIN) as usize;
    let mut lines = Vec::new();

    lines.push(Line {
        text: ctx.full_name(),
        font: Font::Bold,
        size: TITLE_SIZE,
        gap_before: 0.0,
    });

    let heading = |lines: &mut Vec<Line>, text: &str| {
        lines.push(Line {
            text: text.to_string(),
            font: Font::Bold,
            size: HEADING_SIZE,
            gap_before: SECTION_GAP,
        });
    };
    let body = |lines: &mut Vec<Line>, text: &str| {
        for wrapped in wrap_text(text, wrap_width, BODY_SIZE) {
            lines.push(Line {
                text: wrapped,
                font: Font::Regular,
                size: BODY_SIZE,
                gap_before: 0.0,
            });
        }
    };

    // Bio
    heading(&mut lines, &ctx.labels.bio_title);
    match &ctx.bio {
        Some(bio) => body(&mut lines, bio),
        None => body(&mut lines, &ctx.labels.no_bio_message),
    }

    // Skills
    heading(&mut lines, &ctx.labels.skills_title);
    if ctx.skills.is_empty() {
        body(&mut lines, &ctx.labels.no_skills_message);
    } else {
        for skill in &ctx.skills {
            body(&mut lines, &format!("- {}", skill));
        }
    }

    // Projects
    heading(&mut lines, &ctx.labels.projects_title);
    if ctx.projects.is_empty() {
        body(&mut lines, &ctx.labels.no_projects_message);
    } else {
        for project in &ctx.projects {
            lines.push(Line {
                text: project.name.clone(),
                font: Font::Bold,
                size: BODY_SIZE,
                gap_before: 4.0,
            });
            body(&mut lines, &project.description);
        }
    }

    // Contacts
    heading(&mut lines, &ctx.labels.contacts_title);
    if ctx.contacts.is_empty() {
        body(&mut lines, &ctx.labels.no_contacts_message);
    } else {
        for contact in &ctx.contacts {
            body(&mut lines, &format!("{}: {}", contact.contact_type, contact.value));
        }
    }

    lines
}

/// Naive width-based wrap: approximates Helvetica at ~0.5em per glyph
fn wrap_text(text: &str, width_points: usize, size: f32) -> Vec<String> {
    let max_chars = ((width_points as f32) / (size * 0.5)).max(1.0) as usize;
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        wrapped.push(current);
    }

    if wrapped.is_empty() {
        wrapped.push(String::new());
    }

    wrapped
}

/// Standard PDF text strings are Latin-1; anything outside is replaced
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

/// Assemble the lines into a paginated PDF document
fn write_document(lines: &[Line]) -> Result<Vec<u8>> {
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

    // Paginate: top-down cursor, page break when past the bottom margin
    let mut page_ids: Vec<Object> = Vec::new();
    let mut operations: Vec<Operation> = Vec::new();
    let mut cursor = PAGE_HEIGHT - MARGIN;

    let flush_page =
        |doc: &mut Document, ops: &mut Vec<Operation>, page_ids: &mut Vec<Object>| -> Result<()> {
            let content = Content {
                operations: std::mem::take(ops),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id.into());
            Ok(())
        };

    for line in lines {
        cursor -= line.gap_before + line.size;

        if cursor < MARGIN {
            flush_page(&mut doc, &mut operations, &mut page_ids)?;
            cursor = PAGE_HEIGHT - MARGIN - line.size;
        }

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![line.font.resource_key().into(), line.size.into()],
        ));
        operations.push(Operation::new(
            "Td",
            vec![MARGIN.into(), cursor.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_text(&line.text),
                lopdf::StringFormat::Literal,
            )],
        ));
        operations.push(Operation::new("ET", vec![]));

        cursor -= LINE_GAP;
    }

    if !operations.is_empty() || page_ids.is_empty() {
        flush_page(&mut doc, &mut operations, &mut page_ids)?;
    }

    let page_count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;
    use crate::db::{CandidateSummary, ContactSummary, ProjectSummary};
    use uuid::Uuid;

    fn context(bio: Option<String>) -> CvContext {
        let summary = CandidateSummary {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            bio,
            skills: vec!["Python".to_string()],
            projects: vec![ProjectSummary {
                name: "Test Project".to_string(),
                description: "A test project description.".to_string(),
            }],
            contacts: vec![ContactSummary {
                contact_type: "Email".to_string(),
                value: "jane.doe@example.com".to_string(),
            }],
        };
        let config = TranslationConfig {
            api_key: None,
            api_base: None,
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            max_retries: 1,
            languages: Vec::new(),
        };
        CvContext::build(summary, &config)
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename("Jane", "Doe"), "Jane_Doe_CV.pdf");
        assert_eq!(suggested_filename("Mary Jane", "van Dyke"), "Mary_Jane_van_Dyke_CV.pdf");
    }

    #[test]
    fn test_render_produces_pdf() {
        let rendered = render_cv_pdf(&context(Some("A seasoned engineer.".to_string()))).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.filename, "Jane_Doe_CV.pdf");

        let doc = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_empty_sections_uses_placeholders() {
        let mut ctx = context(None);
        ctx.skills.clear();
        ctx.projects.clear();
        ctx.contacts.clear();

        let rendered = render_cv_pdf(&ctx).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_long_bio_paginates() {
        let long_bio = "An engineer with many accomplishments. ".repeat(200);
        let rendered = render_cv_pdf(&context(Some(long_bio))).unwrap();

        let doc = Document::load_mem(&rendered.bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_wrap_text() {
        let wrapped = wrap_text("one two three four five", 40, 11.0);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 8));

        assert_eq!(wrap_text("", 100, 11.0), vec![String::new()]);
    }
}
