use candle_core::Device;
use tracing::{debug, warn};

use super::error::EmbeddingError;

/// Picks the device the bundle's tensors live on.
///
/// Accelerators are only tried when compiled in (`metal` / `cuda` features). The
/// models are tiny, so any accelerator failure degrades to CPU instead of failing load.
pub fn select_device() -> Result<Device, EmbeddingError> {
    let mut failures: Vec<String> = Vec::new();

    if cfg!(feature = "metal") {
        match Device::new_metal(0) {
            Ok(device) => {
                debug!("Using Metal device for inference");
                return Ok(device);
            }
            Err(e) => failures.push(format!("metal: {e}")),
        }
    }

    if cfg!(feature = "cuda") {
        match Device::new_cuda(0) {
            Ok(device) => {
                debug!("Using CUDA device for inference");
                return Ok(device);
            }
            Err(e) => failures.push(format!("cuda: {e}")),
        }
    }

    if failures.is_empty() {
        debug!("No accelerator compiled in, using CPU");
    } else {
        warn!(reason = %failures.join("; "), "Accelerator unavailable, falling back to CPU");
    }

    Ok(Device::Cpu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    fn test_select_device_defaults_to_cpu() {
        let device = select_device().expect("device selection never fails");
        assert!(device.is_cpu());
    }
}
