use crate::models::DownloadResponse;
use axum::Json;

/// `POST /download`: placeholder for report export. Always acknowledges.
pub async fn download_report() -> Json<DownloadResponse> {
    Json(DownloadResponse { success: true })
}
