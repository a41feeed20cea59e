use serde::Deserialize;

/// Error body returned by the Gemini REST API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct GeminiApiErrorResponse {
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl GeminiApiErrorResponse {
    pub fn describe(&self) -> String {
        if self.message.is_empty() {
            self.reason.clone()
        } else {
            format!("{}: {}", self.reason, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_body() {
        let body = r#"{"result":"error","reason":"InvalidSymbol","message":"Supplied value 'foo' is not a valid symbol"}"#;
        let err: GeminiApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            err.describe(),
            "InvalidSymbol: Supplied value 'foo' is not a valid symbol"
        );
    }

    #[test]
    fn reason_only_body() {
        let err: GeminiApiErrorResponse =
            serde_json::from_str(r#"{"result":"error","reason":"RateLimited"}"#).unwrap();
        assert_eq!(err.describe(), "RateLimited");
    }
}
