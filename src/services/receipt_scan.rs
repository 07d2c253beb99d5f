use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::{config::AppConfig, errors::ServiceError};

/// Extraction instructions for the vision model. The response contract is a
/// bare JSON object matching `ScanResult`.
const SCAN_PROMPT: &str = r#"You are a receipt scanner for a small business. Extract items, prices, date, and supplier from receipt images.
Return ONLY valid JSON with this exact structure:
{
  "items": [{"name": "item name", "quantity": 1, "unit_price": 100, "total_price": 100}],
  "total": 1000,
  "date": "2026-02-11",
  "supplier": "Store Name"
}

Rules for item names:
- Extract only the simple, clean product name. Remove brand names, size codes, SKU codes and store abbreviations; expand abbreviations to readable words. Use Title Case.
- Do NOT use generic names like "Item 1" or "Product".

Rules for quantity and prices:
- Receipts often write quantity as "2 @ 1.89" or "3 x 2.50": the price after "@" or "x" is the UNIT price. Extract quantity and per-unit price accordingly.
- All prices are numbers in the receipt's currency; quantity defaults to 1; total_price = quantity * unit_price.
- date format: YYYY-MM-DD (null if not found); supplier: the store name from the receipt header (null if not found).
- If you cannot read the receipt, return {"items": [], "total": null, "date": null, "supplier": null}.
- Do NOT include any text outside the JSON object."#;

fn default_quantity() -> Decimal {
    Decimal::ONE
}

/// One extracted receipt line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScannedItem {
    pub name: String,
    #[serde(default = "default_quantity", deserialize_with = "lenient_decimal")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_price: Decimal,
}

/// Structured result of scanning one receipt image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
pub struct ScanResult {
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<ScannedItem>,
    #[serde(default, deserialize_with = "lenient_decimal_opt")]
    pub total: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub supplier: Option<String>,
}

// The model is told to emit numbers, but in practice amounts sometimes come
// back as strings ("1.89") or junk. Coerce instead of failing the scan.

fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n.to_string().parse().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

fn lenient_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

fn lenient_decimal_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(decimal_from_value(&other)),
    })
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

fn lenient_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ScannedItem>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Strips a markdown code fence the model sometimes wraps its JSON in
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the external vision model that turns receipt photos into
/// structured line items. This is a plain request/response call-out; no
/// aggregation logic lives here.
#[derive(Clone)]
pub struct ReceiptScanService {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl ReceiptScanService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: config.receipt_scan_api_key.clone(),
            endpoint: config.receipt_scan_endpoint.clone(),
            model: config.receipt_scan_model.clone(),
        }
    }

    /// Scans a receipt image (base64 or data URL) into structured items
    #[instrument(skip(self, image))]
    pub async fn scan(&self, image: &str) -> Result<ScanResult, ServiceError> {
        if image.trim().is_empty() {
            return Err(ServiceError::InvalidInput("No image provided".to_string()));
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ServiceError::ServiceUnavailable("Receipt scanning is not configured".to_string())
        })?;

        let image_url = if image.starts_with("data:") {
            image.to_string()
        } else {
            format!("data:image/jpeg;base64,{}", image)
        };

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SCAN_PROMPT},
                {"role": "user", "content": [
                    {"type": "text", "text": "Extract all items, prices, date, and supplier from this receipt."},
                    {"type": "image_url", "image_url": {"url": image_url, "detail": "high"}}
                ]}
            ],
            "max_tokens": 1000,
            "temperature": 0.1
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Receipt scan request failed");
                ServiceError::ExternalServiceError(format!("Receipt scan request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Receipt scan upstream rejected the request");
            return Err(ServiceError::ExternalApiError(format!(
                "Receipt scan upstream returned {}",
                status
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Receipt scan response was not readable");
            ServiceError::ExternalApiError("Receipt scan response was not readable".to_string())
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ServiceError::ExternalApiError("Receipt scan returned no content".to_string())
            })?;

        serde_json::from_str(strip_code_fences(&content)).map_err(|e| {
            error!(error = %e, "Receipt scan returned malformed JSON");
            ServiceError::ExternalApiError("Receipt scan returned malformed JSON".to_string())
        })
    }
}
