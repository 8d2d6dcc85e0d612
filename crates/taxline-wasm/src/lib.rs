//! WASM bindings for GST tax invoice line-item extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Text extraction happens on the JavaScript side; only the text dump crosses
//! the boundary.

use wasm_bindgen::prelude::*;

use taxline_core::{LineItemParser, TaxInvoiceParser, TaxlineConfig};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Parse line items from an invoice text dump.
///
/// Returns an array of records, or a single diagnostic object when nothing
/// could be parsed.
#[wasm_bindgen]
pub fn parse_line_items(text: &str) -> Result<JsValue, JsValue> {
    let output = TaxInvoiceParser::new().parse(text);

    serde_wasm_bindgen::to_value(&output)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Strip trailing tax rates and next-item fragments from a description.
#[wasm_bindgen]
pub fn clean_description(description: &str, marker: &str) -> String {
    TaxInvoiceParser::new()
        .post_filter()
        .clean_description(description, marker)
}

/// Line-item parser class for browser use.
#[wasm_bindgen]
pub struct LineItemParserJs {
    config: TaxlineConfig,
    parser: TaxInvoiceParser,
}

#[wasm_bindgen]
impl LineItemParserJs {
    /// Create a parser with the built-in marker table.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: TaxlineConfig::default(),
            parser: TaxInvoiceParser::new(),
        }
    }

    /// Create a parser from a JSON configuration document.
    #[wasm_bindgen]
    pub fn from_config_json(json: &str) -> Result<LineItemParserJs, JsValue> {
        let config: TaxlineConfig =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let parser = TaxInvoiceParser::from_config(&config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self { config, parser })
    }

    /// Configure the trailing-rate post-filter.
    #[wasm_bindgen]
    pub fn set_strip_trailing_rates(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.config.output.strip_trailing_rates = enabled;
        self.parser = TaxInvoiceParser::from_config(&self.config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Parse line items from text.
    #[wasm_bindgen]
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        let output = self.parser.parse(text);

        serde_wasm_bindgen::to_value(&output)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Parse and return records together with failures and warnings.
    #[wasm_bindgen]
    pub fn parse_with_report(&self, text: &str) -> Result<JsValue, JsValue> {
        let report = self.parser.parse_report(text);

        serde_wasm_bindgen::to_value(&report)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for LineItemParserJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }

    #[wasm_bindgen_test]
    fn test_clean_description() {
        assert_eq!(clean_description("TWW WIDGET 18.00", "TWW"), "TWW WIDGET");
        assert_eq!(clean_description("TWW", "TWW"), "TWW");
    }

    #[wasm_bindgen_test]
    fn test_parse_line_items() {
        let value = parse_line_items("ABC 94042190 1 9.00 PCS 720.00\n1\n6480.00 9.00 WIDGET RED 9.00");
        assert!(value.is_ok());
    }

    #[wasm_bindgen_test]
    fn test_parser_from_bad_config() {
        assert!(LineItemParserJs::from_config_json("{\"parser\": {\"sgst_window\": 0}}").is_err());
    }
}
