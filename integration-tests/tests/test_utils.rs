use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use axum_test::TestServer;
use common::utils::{
    config::AppConfig,
    embedding::EmbeddingBackend,
};
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream,
};

/// Builds an `ApiState` wired to a temp directory and the deterministic
/// hashed embedding backend, and returns a `TestServer` for it. The temp dir
/// guard must outlive the server.
pub async fn setup_test_server() -> (tempfile::TempDir, TestServer) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = AppConfig {
        llm_api_key: "test-key".into(),
        embedding_api_key: "test-key".into(),
        embedding_backend: EmbeddingBackend::Hashed,
        embedding_dimensions: 64,
        chunk_min_chars: 50,
        chunk_max_chars: 500,
        data_dir: dir.path().to_string_lossy().into_owned(),
        ..AppConfig::default()
    };

    let state = ApiState::new(&config).await.expect("Failed to build state");
    let app = Router::new().merge(api_routes(&state)).with_state(state);
    let server = TestServer::new(app).expect("Failed to start test server");

    (dir, server)
}

/// Builds a minimal single-font PDF with one page per entry, so uploads in
/// tests parse like real documents.
pub fn build_test_pdf(pages: &[&str]) -> Vec<u8> {
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
