use std::time::Duration;

use serde::Deserialize;

use crate::{Translation, TranslateError, UNDETERMINED_LANG};

const TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

// A stuck call must not stall the caller's flush cycle indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: ApiData,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    translations: Vec<ApiTranslation>,
}

#[derive(Debug, Deserialize)]
struct ApiTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
    #[serde(rename = "detectedSourceLanguage")]
    detected_source_language: Option<String>,
}

/// HTTP client for the Translation v2 REST API.
pub struct TranslateClient {
    http: reqwest::Client,
    api_key: String,
}

impl TranslateClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Translate a batch of texts in one API call.
    ///
    /// Results are positionally aligned with `texts`; a batch of N inputs
    /// yields exactly N results or an error. An empty batch returns
    /// immediately without touching the API.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Vec<Translation>, TranslateError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut form: Vec<(&str, &str)> = vec![
            ("target", target_lang),
            ("format", "text"),
            ("key", &self.api_key),
        ];
        for text in texts {
            form.push(("q", text));
        }

        let resp = self
            .http
            .post(TRANSLATE_URL)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(TranslateError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let translations = Self::parse_response(&body)?;
        if translations.len() != texts.len() {
            return Err(TranslateError::Misaligned {
                expected: texts.len(),
                got: translations.len(),
            });
        }
        tracing::debug!(batch = texts.len(), target_lang, "Translated batch");
        Ok(translations)
    }

    /// Translate a single text. Convenience wrapper over [`translate_batch`].
    ///
    /// [`translate_batch`]: Self::translate_batch
    pub async fn translate_single(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<Translation, TranslateError> {
        let batch = [text.to_string()];
        let mut results = self.translate_batch(&batch, target_lang).await?;
        results.pop().ok_or(TranslateError::Misaligned {
            expected: 1,
            got: 0,
        })
    }

    pub(crate) fn parse_response(body: &str) -> Result<Vec<Translation>, TranslateError> {
        let resp: ApiResponse = serde_json::from_str(body)?;
        Ok(resp
            .data
            .translations
            .into_iter()
            .map(|t| Translation {
                translated_text: t.translated_text,
                detected_language_code: t
                    .detected_source_language
                    .unwrap_or_else(|| UNDETERMINED_LANG.to_string()),
            })
            .collect())
    }
}
