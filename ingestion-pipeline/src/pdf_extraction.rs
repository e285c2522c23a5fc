use std::path::Path;

use lopdf::Document;

use common::error::AppError;

/// Text extracted from one PDF page. `page` is the 0-based index of the page
/// in document order; the HTTP layer presents pages 1-based.
#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Extracts the text layer of a PDF page by page. Pages without extractable
/// text are skipped; a document that fails to parse is a processing error.
pub async fn extract_pdf_pages(file_path: &Path) -> Result<Vec<PageText>, AppError> {
    let pdf_bytes = tokio::fs::read(file_path).await?;
    extract_pages_from_bytes(pdf_bytes).await
}

/// Parses the PDF and walks its pages off the async executor.
async fn extract_pages_from_bytes(pdf_bytes: Vec<u8>) -> Result<Vec<PageText>, AppError> {
    let pages = tokio::task::spawn_blocking(move || -> Result<Vec<PageText>, AppError> {
        let document = Document::load_mem(&pdf_bytes)
            .map_err(|err| AppError::Processing(format!("Failed to parse PDF: {err}")))?;

        let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        page_numbers.sort_unstable();

        if page_numbers.is_empty() {
            return Err(AppError::Processing("PDF appears to have no pages".into()));
        }

        let mut pages = Vec::with_capacity(page_numbers.len());
        for (index, number) in page_numbers.iter().enumerate() {
            let raw = document.extract_text(&[*number]).map_err(|err| {
                AppError::Processing(format!(
                    "Failed to extract text from PDF page {number}: {err}"
                ))
            })?;

            let text = reflow_text(&raw);
            if text.is_empty() {
                continue;
            }

            pages.push(PageText {
                page: index as u32,
                text,
            });
        }

        Ok(pages)
    })
    .await??;

    Ok(pages)
}

/// Joins hard-wrapped lines into paragraphs so chunking sees prose rather
/// than layout artifacts.
fn reflow_text(input: &str) -> String {
    let mut paragraphs = Vec::new();
    let mut buffer: Vec<String> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            continue;
        }

        buffer.push(trimmed.to_string());
    }

    if !buffer.is_empty() {
        paragraphs.push(buffer.join(" "));
    }

    paragraphs.join("\n\n")
}

/// Builds a minimal single-font PDF with one page per entry, for tests that
/// need real parseable documents without fixtures on disk.
#[cfg(test)]
pub(crate) fn build_test_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::{
        content::{Content, Operation},
        dictionary, Object, Stream,
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let kids_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => kids_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize test PDF");
    bytes
}
