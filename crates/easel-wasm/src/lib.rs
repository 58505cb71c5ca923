//! Easel WASM - WebAssembly bindings for Easel
//!
//! This crate provides WASM bindings to expose the easel-core editor
//! to JavaScript/TypeScript front ends.
//!
//! # Module Structure
//!
//! - `editor` - The editor itself: load, fit, filters, overlays, crop, export,
//!   and the two-step background removal and enhancement flows
//! - `filters` - Filter controls (brightness, contrast, toggles, etc.)
//! - `types` - WASM-compatible wrapper types for rasters and exports
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, FilterParams } from '@easel/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor(undefined, fontBytes);
//! editor.resize(container.clientWidth);
//! editor.load(new Uint8Array(await file.arrayBuffer()));
//!
//! const params = new FilterParams();
//! params.grayscale = true;
//! editor.set_filters(params);
//!
//! const preview = editor.render_preview();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(preview.pixels()), preview.width), 0, 0);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod filters;
mod types;

// Re-export public types
pub use editor::JsEditor;
pub use filters::{apply_filters, FilterParams};
pub use types::{JsExport, JsRaster};

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Export formats the editor can produce, for populating a format picker.
#[wasm_bindgen]
pub fn export_formats() -> Vec<String> {
    [
        easel_core::ExportFormat::Png,
        easel_core::ExportFormat::Jpeg,
        easel_core::ExportFormat::WebP,
    ]
    .iter()
    .map(|f| f.extension().to_string())
    .collect()
}
