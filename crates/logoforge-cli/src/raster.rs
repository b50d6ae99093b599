//! External rasterizer invocation
//!
//! Shells out to ImageMagick to turn the vector artwork into a trimmed,
//! transparent-background RGBA bitmap at the requested square resolution.
//! The call is synchronous but bounded by an explicit timeout; on any
//! failure the whole run aborts rather than retrying.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use logoforge_core::texture::{RasterizeRequest, Rasterizer, bitmap_path_for};
use logoforge_core::{Error, Result};
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Rasterizer backed by the ImageMagick `convert` tool.
#[derive(Debug, Clone)]
pub struct MagickRasterizer {
    timeout: Duration,
}

impl MagickRasterizer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for MagickRasterizer {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl Rasterizer for MagickRasterizer {
    fn rasterize(&self, artwork: &Path, request: &RasterizeRequest) -> Result<PathBuf> {
        let output = bitmap_path_for(artwork);
        let geometry = format!("{0}x{0}!", request.size);

        let mut command = Command::new("convert");
        if request.transparent_background {
            command.args(["-background", "none"]);
        }
        if request.trim {
            command.arg("-trim");
        }
        command
            .arg("-resize")
            .arg(&geometry)
            .arg(artwork)
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        info!(artwork = %artwork.display(), %geometry, "rasterizing artwork");
        let mut child = command
            .spawn()
            .map_err(|err| Error::Rasterizer(format!("failed to launch convert: {err}")))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        child.kill().ok();
                        child.wait().ok();
                        return Err(Error::Rasterizer(format!(
                            "convert timed out after {:?}",
                            self.timeout
                        )));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    return Err(Error::Rasterizer(format!(
                        "failed waiting for convert: {err}"
                    )));
                }
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                pipe.read_to_string(&mut stderr).ok();
            }
            return Err(Error::Rasterizer(format!(
                "convert exited with {status}: {}",
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_rasterizer_substitutes_for_the_real_tool() {
        struct Stub;
        impl Rasterizer for Stub {
            fn rasterize(&self, artwork: &Path, _: &RasterizeRequest) -> Result<PathBuf> {
                Ok(bitmap_path_for(artwork))
            }
        }

        let out = Stub
            .rasterize(Path::new("logo.svg"), &RasterizeRequest::default())
            .unwrap();
        assert_eq!(out, PathBuf::from("logo.png"));
    }

    #[test]
    fn test_spawn_failure_maps_to_rasterizer_error() {
        // Point the derived output somewhere harmless.
        let artwork = std::env::temp_dir().join("logoforge_raster_probe.svg");
        let rasterizer = MagickRasterizer::new(Duration::from_secs(1));

        // Whether convert exists or not, a missing input must not panic;
        // both spawn failure and non-zero exit map to Error::Rasterizer.
        let result = rasterizer.rasterize(&artwork, &RasterizeRequest::default());
        if let Err(err) = result {
            assert!(matches!(err, Error::Rasterizer(_)));
        }
    }
}
