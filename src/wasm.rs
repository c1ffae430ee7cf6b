//! WebAssembly bindings for JavaScript/TypeScript.
//!
//! This module provides JavaScript-friendly bindings for the resume engine
//! via `wasm-bindgen`. Documents cross the boundary as JSON strings; rendered
//! output comes back as a `Uint8Array`.
//!
//! ## Usage from JavaScript
//!
//! ```javascript
//! import init, { renderPdf, PreviewHandle } from 'resume-render';
//!
//! await init();
//!
//! const pdf = renderPdf(JSON.stringify(resume), 'modern');
//! const blob = new Blob([pdf], { type: 'application/pdf' });
//!
//! const preview = new PreviewHandle(300);
//! preview.request(JSON.stringify(resume), performance.now());
//! // later, from a timer:
//! const job = preview.poll(performance.now());
//! if (job) {
//!     const bytes = renderPdf(job.input);
//!     preview.complete(job.sequence, bytes);
//! }
//! ```

#![cfg(feature = "wasm")]

use crate::markup;
use crate::model::ResumeDocument;
use crate::preview::{Completion, PreviewSession, Ticket};
use crate::render::Format;
use crate::resource::ResourcePool;
use crate::style::{self, Color, StyleConfig, Template};
use js_sys::Uint8Array;
use serde::Serialize;
use std::time::Duration;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in console
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn render_json(json: &str, template_id: Option<String>, format: Format) -> Result<Uint8Array, JsError> {
    let doc = ResumeDocument::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
    let bytes = crate::render_with(&doc, template_id.as_deref(), format, &ResourcePool::new())
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(Uint8Array::from(&bytes[..]))
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a resume document (JSON) to PDF bytes.
///
/// # Arguments
///
/// * `json` - The resume document as JSON.
/// * `template_id` - Optional template overriding the document's own.
#[wasm_bindgen(js_name = renderPdf)]
pub fn render_pdf(json: &str, template_id: Option<String>) -> Result<Uint8Array, JsError> {
    render_json(json, template_id, Format::Pdf)
}

/// Render a resume document (JSON) to DOCX bytes.
#[wasm_bindgen(js_name = renderDocx)]
pub fn render_docx(json: &str, template_id: Option<String>) -> Result<Uint8Array, JsError> {
    render_json(json, template_id, Format::Docx)
}

// ============================================================================
// Style configuration
// ============================================================================

/// Resolve a template and a saved configuration into the complete style.
///
/// `saved_config_json` may be omitted or empty, in which case the template
/// defaults are returned.
#[wasm_bindgen(js_name = resolveStyle)]
pub fn resolve_style(template_id: &str, saved_config_json: Option<String>) -> Result<JsValue, JsError> {
    let saved = match saved_config_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => serde_json::from_str::<StyleConfig>(json)
            .map_err(|e| JsError::new(&format!("Invalid style configuration: {}", e)))?,
        _ => StyleConfig::default(),
    };
    to_js(&style::resolve(template_id, &saved))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateInfo {
    id: &'static str,
    columns: u8,
    accent_color: Color,
}

/// List the built-in templates with their column count and accent color.
#[wasm_bindgen(js_name = listTemplates)]
pub fn list_templates() -> Result<JsValue, JsError> {
    let templates: Vec<TemplateInfo> = Template::all()
        .iter()
        .map(|t| {
            let defaults = t.defaults();
            TemplateInfo {
                id: t.id(),
                columns: defaults.layout.columns,
                accent_color: defaults.theme.accent_color,
            }
        })
        .collect();
    to_js(&templates)
}

/// The saved configuration after switching templates.
///
/// Customizations are reset to the new template's defaults; only the accent
/// color (`#RRGGBB`) is carried over when given.
#[wasm_bindgen(js_name = switchTemplate)]
pub fn switch_template(template_id: &str, accent: Option<String>) -> Result<JsValue, JsError> {
    let accent = accent
        .filter(|a| !a.trim().is_empty())
        .map(|a| a.parse::<Color>())
        .transpose()
        .map_err(|e| JsError::new(&e))?;
    to_js(&style::switch_template(template_id, accent))
}

/// Parse an inline markup field into its runs.
#[wasm_bindgen(js_name = parseMarkup)]
pub fn parse_markup(text: &str) -> Result<JsValue, JsError> {
    to_js(&markup::parse(text))
}

// ============================================================================
// Live preview
// ============================================================================

fn duration_ms(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

#[derive(Serialize)]
struct PreviewJob {
    sequence: u64,
    input: String,
}

/// Debounced, freshest-wins sequencing for a live preview pane.
///
/// Times are milliseconds from any fixed origin, e.g. `performance.now()`.
#[wasm_bindgen]
pub struct PreviewHandle {
    session: PreviewSession<String, Vec<u8>>,
}

#[wasm_bindgen]
impl PreviewHandle {
    /// Create a handle with the given quiet period in milliseconds.
    #[wasm_bindgen(constructor)]
    pub fn new(quiet_period_ms: Option<f64>) -> PreviewHandle {
        let session = match quiet_period_ms {
            Some(ms) => PreviewSession::new(duration_ms(ms)),
            None => PreviewSession::default(),
        };
        PreviewHandle { session }
    }

    /// Record an edit; returns its sequence number.
    pub fn request(&self, input: String, now_ms: f64) -> f64 {
        self.session.request(input, duration_ms(now_ms)).sequence() as f64
    }

    /// `{ sequence, input }` once the quiet period has elapsed, else `undefined`.
    pub fn poll(&self, now_ms: f64) -> Result<JsValue, JsError> {
        match self.session.poll(duration_ms(now_ms)) {
            Some((ticket, input)) => to_js(&PreviewJob {
                sequence: ticket.sequence(),
                input,
            }),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Hand in a finished render. Returns `false` if it was stale and discarded.
    pub fn complete(&self, sequence: f64, output: &Uint8Array) -> bool {
        let ticket = Ticket::from_sequence(sequence as u64);
        self.session.complete(ticket, output.to_vec()) == Completion::Applied
    }

    /// Whether a newer request has superseded `sequence`.
    #[wasm_bindgen(js_name = isCancelled)]
    pub fn is_cancelled(&self, sequence: f64) -> bool {
        self.session
            .cancel_token(Ticket::from_sequence(sequence as u64))
            .is_cancelled()
    }

    /// The bytes currently on display.
    pub fn displayed(&self) -> Option<Uint8Array> {
        self.session.displayed().map(|bytes| Uint8Array::from(&bytes[..]))
    }

    /// Sequence number of the displayed output; zero before the first.
    #[wasm_bindgen(js_name = appliedSequence)]
    pub fn applied_sequence(&self) -> f64 {
        self.session.applied_sequence() as f64
    }
}

/// Get the library version.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
