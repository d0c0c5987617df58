use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ns_core::{Error, Result};

/// Requested placement for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => Err(format!("Invalid device: {}. Use auto, cpu or cuda", other)),
        }
    }
}

/// The device a loaded model is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda(usize),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("CPU"),
            Device::Cuda(ordinal) => write!(f, "GPU (cuda:{})", ordinal),
        }
    }
}

impl Device {
    /// Picks a device for `preference` using the host's CUDA visibility.
    pub fn select(preference: DevicePreference) -> Result<Self> {
        Self::select_with(preference, cuda_device)
    }

    pub fn select_with<F>(preference: DevicePreference, detect: F) -> Result<Self>
    where
        F: FnOnce() -> Option<usize>,
    {
        match preference {
            DevicePreference::Cpu => Ok(Device::Cpu),
            DevicePreference::Auto => Ok(detect().map(Device::Cuda).unwrap_or(Device::Cpu)),
            DevicePreference::Cuda => detect().map(Device::Cuda).ok_or_else(|| {
                Error::EngineLoad("CUDA device requested but none is available".to_string())
            }),
        }
    }

    pub fn is_accelerator(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }
}

fn cuda_device() -> Option<usize> {
    parse_visible_devices(std::env::var("CUDA_VISIBLE_DEVICES").ok().as_deref())
        .unwrap_or_else(|| Path::new("/dev/nvidia0").exists().then_some(0))
}

/// `None` when the variable is unset, otherwise whether it exposes a device.
fn parse_visible_devices(value: Option<&str>) -> Option<Option<usize>> {
    let value = value?.trim();
    if value.is_empty() || value == "-1" {
        return Some(None);
    }
    // Ordinals are renumbered from zero inside the visible set
    Some(Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_prefers_accelerator() {
        assert_eq!(Device::select_with(DevicePreference::Auto, || Some(0)).unwrap(), Device::Cuda(0));
        assert_eq!(Device::select_with(DevicePreference::Auto, || None).unwrap(), Device::Cpu);
    }

    #[test]
    fn test_cpu_skips_detection() {
        let device = Device::select_with(DevicePreference::Cpu, || panic!("detected")).unwrap();
        assert_eq!(device, Device::Cpu);
        assert!(!device.is_accelerator());
    }

    #[test]
    fn test_cuda_without_device_fails_load() {
        let err = Device::select_with(DevicePreference::Cuda, || None).unwrap_err();
        assert!(matches!(err, Error::EngineLoad(_)));
    }

    #[test]
    fn test_visible_devices_parsing() {
        assert_eq!(parse_visible_devices(None), None);
        assert_eq!(parse_visible_devices(Some("")), Some(None));
        assert_eq!(parse_visible_devices(Some("-1")), Some(None));
        assert_eq!(parse_visible_devices(Some("2,3")), Some(Some(0)));
    }

    #[test]
    fn test_preference_from_str() {
        assert_eq!("GPU".parse::<DevicePreference>().unwrap(), DevicePreference::Cuda);
        assert_eq!("auto".parse::<DevicePreference>().unwrap(), DevicePreference::Auto);
        assert!("tpu".parse::<DevicePreference>().is_err());
    }
}
