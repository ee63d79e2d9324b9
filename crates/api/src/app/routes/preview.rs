use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    http::header,
    response::{IntoResponse, Response},
};

use labelforge_core::ArtifactId;
use labelforge_infra::artifacts::{ArtifactError, StickerArtifact};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;
use crate::app::services::AppServices;

/// Most recent sticker PDF generated by the calling user.
pub async fn latest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let artifact = services
        .printer
        .artifacts()
        .latest_for(principal.user_id())
        .ok_or(ArtifactError::NotFound)?;
    stream_pdf(&services, &artifact).await
}

/// A specific PDF; other users' artifacts are reported as missing.
pub async fn by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    id: Result<Path<ArtifactId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
    let artifact = services
        .printer
        .artifacts()
        .get(principal.user_id(), id)
        .ok_or(ArtifactError::NotFound)?;
    stream_pdf(&services, &artifact).await
}

async fn stream_pdf(services: &AppServices, artifact: &StickerArtifact) -> Result<Response, ApiError> {
    let bytes = services.printer.artifacts().read(artifact).await?;
    let disposition = format!("inline; filename=\"stickers-{}.pdf\"", artifact.id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
