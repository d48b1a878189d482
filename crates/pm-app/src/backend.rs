mod schemas;

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::debug;
use pm_core::MorphStep;

use crate::config::{BackendConfig, RenderSettings};
use crate::error::AppError;

pub use schemas::{RenderRequest, RenderResponse};

/// Blocking client for the external image-generation service.
///
/// The service does the actual synthesis and writes the result to disk;
/// we send one request per morph step and load the file it reports back.
pub struct RenderBackend {
    config: BackendConfig,
    settings: RenderSettings,
    client: reqwest::blocking::Client,
}

impl RenderBackend {
    pub fn new(config: BackendConfig, settings: RenderSettings) -> Self {
        Self {
            config,
            settings,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn render_step(
        &self,
        step: &MorphStep,
        negative_prompt: &str,
    ) -> Result<RgbaImage, AppError> {
        let request = RenderRequest {
            prompt: step.prompt.clone(),
            negative_prompt: negative_prompt.to_string(),
            seed: step.seed,
            subseed: step.subseed,
            subseed_strength: step.subseed_strength,
            steps: self.settings.steps,
            width: self.settings.width,
            height: self.settings.height,
            cfg_scale: self.settings.cfg_scale,
            sampler: self.settings.sampler.clone(),
            batch_size: 1,
            n_iter: 1,
        };
        self.render(&request)
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RgbaImage, AppError> {
        let url = format!("{}/generate", self.config.base_url);
        debug!("POST {url} prompt='{}'", request.prompt);

        let response = self
            .client
            .post(url)
            .json(request)
            .timeout(self.config.timeout)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(AppError::Backend(format!("HTTP {status}: {body}")));
        }

        let result: RenderResponse = response.json()?;
        let path = resolve_response(&result)?;

        if !path.exists() {
            return Err(AppError::MissingOutput(path));
        }
        Ok(image::open(&path)?.to_rgba8())
    }
}

/// Map a service response to the host-side path of the generated file.
fn resolve_response(response: &RenderResponse) -> Result<PathBuf, AppError> {
    match response.status.as_str() {
        "success" => {
            let output_path = response
                .output_path
                .as_deref()
                .ok_or_else(|| AppError::Service("no output path returned".to_string()))?;
            Ok(host_path(output_path))
        }
        "error" => {
            let msg = response
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            Err(AppError::Service(msg))
        }
        other => Err(AppError::Service(format!("unexpected status '{other}'"))),
    }
}

/// The service may run in a container and report its own mount point.
fn host_path(output_path: &str) -> PathBuf {
    if let Some(rest) = output_path.strip_prefix("/app/outputs/") {
        return Path::new("outputs").join(rest);
    }
    if let Some(rest) = output_path.strip_prefix("../outputs/") {
        return Path::new("outputs").join(rest);
    }
    PathBuf::from(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, output_path: Option<&str>, error: Option<&str>) -> RenderResponse {
        RenderResponse {
            status: status.to_string(),
            output_path: output_path.map(str::to_string),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn success_resolves_to_host_path() {
        let path =
            resolve_response(&response("success", Some("/app/outputs/x/0001.png"), None)).unwrap();
        assert_eq!(path, Path::new("outputs").join("x/0001.png"));

        let path =
            resolve_response(&response("success", Some("outputs/x/0001.png"), None)).unwrap();
        assert_eq!(path, PathBuf::from("outputs/x/0001.png"));
    }

    #[test]
    fn success_without_path_is_an_error() {
        let err = resolve_response(&response("success", None, None)).unwrap_err();
        assert!(err.to_string().contains("no output path"));
    }

    #[test]
    fn error_status_carries_the_service_message() {
        let err = resolve_response(&response("error", None, Some("out of VRAM"))).unwrap_err();
        assert!(err.to_string().contains("out of VRAM"));

        let err = resolve_response(&response("error", None, None)).unwrap_err();
        assert!(err.to_string().contains("unknown error"));
    }

    #[test]
    fn unexpected_status_is_rejected() {
        let err = resolve_response(&response("pending", None, None)).unwrap_err();
        assert!(err.to_string().contains("unexpected status 'pending'"));
    }
}
