//! WebAssembly binding tests.
//!
//! Run with: wasm-pack test --node -- --features wasm

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use resume_render::wasm::{render_docx, render_pdf, PreviewHandle};
use wasm_bindgen_test::*;

const RESUME: &str = r#"{ "basics": { "name": "Grace Hopper" }, "work": [{ "name": "Navy" }] }"#;

#[wasm_bindgen_test]
fn test_render_pdf_returns_bytes() {
    let Ok(pdf) = render_pdf(RESUME, None) else {
        panic!("pdf render failed");
    };
    assert!(pdf.to_vec().starts_with(b"%PDF-"));
}

#[wasm_bindgen_test]
fn test_render_docx_returns_zip() {
    let Ok(docx) = render_docx(RESUME, Some("modern".to_string())) else {
        panic!("docx render failed");
    };
    assert!(docx.to_vec().starts_with(b"PK"));
}

#[wasm_bindgen_test]
fn test_preview_keeps_completed_bytes() {
    let handle = PreviewHandle::new(Some(0.0));
    let sequence = handle.request(RESUME.to_string(), 0.0);
    let Ok(pdf) = render_pdf(RESUME, None) else {
        panic!("pdf render failed");
    };
    assert!(handle.complete(sequence, &pdf));
    let shown = handle.displayed().map(|bytes| bytes.to_vec());
    assert_eq!(shown, Some(pdf.to_vec()));
}
