use serde::{Deserialize, Serialize};

/// Returned in `results` when the provider produced no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text response received.";

/// Successful `/analyze` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResponse {
    /// Model output.
    pub results: String,
    /// The submitted image as a `data:` URI.
    pub image: String,
}

/// `/download` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadResponse {
    pub success: bool,
}

/// Format `data:<mime>;base64,<payload>`.
pub fn data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_embeds_mime_and_payload() {
        assert_eq!(
            data_uri("image/webp", "UklGRg=="),
            "data:image/webp;base64,UklGRg=="
        );
    }

    #[test]
    fn analysis_response_serializes_expected_keys() {
        let body = serde_json::to_value(AnalysisResponse {
            results: "Ficus".to_string(),
            image: data_uri("image/png", "AA=="),
        })
        .unwrap();

        assert_eq!(body["results"], "Ficus");
        assert_eq!(body["image"], "data:image/png;base64,AA==");
    }
}
