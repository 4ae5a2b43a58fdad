use serde::{Deserialize, Serialize};

/// Orientation applied to captured video and photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Physical orientation reported by the device motion sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceOrientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

/// Orientation of the user interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceOrientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl VideoOrientation {
    /// Pick an orientation from the device first, then the interface,
    /// then fall back to portrait.
    pub fn resolve(device: DeviceOrientation, interface: InterfaceOrientation) -> Self {
        Self::from_device(device)
            .or_else(|| Self::from_interface(interface))
            .unwrap_or(Self::Portrait)
    }

    /// Flat orientations (face up/down) and unknown have no video equivalent.
    pub fn from_device(orientation: DeviceOrientation) -> Option<Self> {
        match orientation {
            DeviceOrientation::Portrait => Some(Self::Portrait),
            DeviceOrientation::PortraitUpsideDown => Some(Self::PortraitUpsideDown),
            DeviceOrientation::LandscapeLeft => Some(Self::LandscapeLeft),
            DeviceOrientation::LandscapeRight => Some(Self::LandscapeRight),
            DeviceOrientation::Unknown
            | DeviceOrientation::FaceUp
            | DeviceOrientation::FaceDown => None,
        }
    }

    pub fn from_interface(orientation: InterfaceOrientation) -> Option<Self> {
        match orientation {
            InterfaceOrientation::Portrait => Some(Self::Portrait),
            InterfaceOrientation::PortraitUpsideDown => Some(Self::PortraitUpsideDown),
            InterfaceOrientation::LandscapeLeft => Some(Self::LandscapeLeft),
            InterfaceOrientation::LandscapeRight => Some(Self::LandscapeRight),
            InterfaceOrientation::Unknown => None,
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_orientation_wins() {
        let resolved = VideoOrientation::resolve(
            DeviceOrientation::LandscapeLeft,
            InterfaceOrientation::Portrait,
        );
        assert_eq!(resolved, VideoOrientation::LandscapeLeft);
    }

    #[test]
    fn flat_device_falls_back_to_interface() {
        let resolved = VideoOrientation::resolve(
            DeviceOrientation::FaceUp,
            InterfaceOrientation::LandscapeRight,
        );
        assert_eq!(resolved, VideoOrientation::LandscapeRight);
    }

    #[test]
    fn unknown_everything_is_portrait() {
        let resolved =
            VideoOrientation::resolve(DeviceOrientation::Unknown, InterfaceOrientation::Unknown);
        assert_eq!(resolved, VideoOrientation::Portrait);
    }

    #[test]
    fn landscape_detection() {
        assert!(VideoOrientation::LandscapeLeft.is_landscape());
        assert!(!VideoOrientation::PortraitUpsideDown.is_landscape());
    }
}
