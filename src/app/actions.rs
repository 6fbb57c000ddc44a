use crate::adapters::http::{DcubeClient, JobRequest};
use crate::core::Scalar;
use crate::utils::error::Result;

/// Description lookup for shell scripts: any failure yields an empty string
/// so the caller's CSV line stays well-formed.
pub async fn description_or_empty(client: &DcubeClient, job_id: u64) -> String {
    match client.fetch_description(job_id).await {
        Ok(description) => description,
        Err(e) => {
            tracing::warn!("Job {}: no description ({})", job_id, e);
            String::new()
        }
    }
}

pub async fn queue_job(client: &DcubeClient, job: &JobRequest) -> Result<Scalar> {
    let id = client.create_job(job).await?;
    tracing::info!("✅ Job queued with id {}", id);
    Ok(id)
}

pub async fn delete_job(client: &DcubeClient, job_id: u64) -> Result<Scalar> {
    let id = client.delete_job(job_id).await?;
    tracing::info!("🗑️ Job {} deleted", id);
    Ok(id)
}
