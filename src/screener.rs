use crate::api::hit_api_server;
use wasm_bindgen::prelude::*;

#[derive(Clone, Debug, tsify::Tsify, serde::Serialize, serde::Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub last_price: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: Option<f64>,
}

/// Screener query as the views build it. Unset bounds are unconstrained.
#[derive(Clone, Debug, Default, tsify::Tsify, serde::Serialize, serde::Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_volume: Option<u64>,
    pub sectors: Vec<String>,
    pub sort_by: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, tsify::Tsify, serde::Serialize, serde::Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerPage {
    pub quotes: Vec<Quote>,
    pub next_cursor: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequest<'a> {
    symbol: &'a str,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub async fn get_quote(symbol: String, access_token: Option<String>) -> Result<JsValue, JsValue> {
    let request = QuoteRequest { symbol: &symbol };

    let response = hit_api_server("/quote", &request, access_token.as_ref())
        .await
        .map_err(|e| JsValue::from_str(&format!("Request error: {e:?}")))?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let quote: Quote = response
        .json()
        .await
        .map_err(|e| JsValue::from_str(&format!("Response parsing error: {e:?}")))?;

    serde_wasm_bindgen::to_value(&quote)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub async fn run_screener(
    filter: ScreenerFilter,
    access_token: Option<String>,
) -> Result<JsValue, JsValue> {
    let response = hit_api_server("/screener", &filter, access_token.as_ref())
        .await
        .map_err(|e| JsValue::from_str(&format!("Request error: {e:?}")))?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let page: ScreenerPage = response
        .json()
        .await
        .map_err(|e| JsValue::from_str(&format!("Response parsing error: {e:?}")))?;

    serde_wasm_bindgen::to_value(&page)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
}
