//! Absolute coordinate normalization.

use crate::config::MapRegion;
use super::device::{AbstractInputDevice, DeviceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsoluteAxis {
    X,
    Y,
}

/// Maps a raw absolute device coordinate into `0.0..=1.0` layout space.
pub trait CoordinateTransform {
    fn normalize(&self, device: &AbstractInputDevice, axis: AbsoluteAxis, raw: f64) -> f64;
}

impl<F> CoordinateTransform for F
where
    F: Fn(&AbstractInputDevice, AbsoluteAxis, f64) -> f64,
{
    fn normalize(&self, device: &AbstractInputDevice, axis: AbsoluteAxis, raw: f64) -> f64 {
        self(device, axis, raw)
    }
}

/// Scales by the device's advertised axis range, then optionally squeezes
/// tablet positions into a sub-region of the layout.
#[derive(Debug, Clone, Default)]
pub struct RangeTransform {
    tablet_region: Option<MapRegion>,
}

impl RangeTransform {
    pub fn new(tablet_region: Option<MapRegion>) -> Self {
        Self { tablet_region }
    }
}

impl CoordinateTransform for RangeTransform {
    fn normalize(&self, device: &AbstractInputDevice, axis: AbsoluteAxis, raw: f64) -> f64 {
        let unit = match device.abs_range(axis) {
            Some(range) if range.max > range.min => (raw - range.min) / (range.max - range.min),
            // No usable range: assume the backend already normalized.
            _ => raw,
        }
        .clamp(0.0, 1.0);

        match (device.kind(), self.tablet_region) {
            (DeviceKind::TabletTool, Some(region)) => match axis {
                AbsoluteAxis::X => region.x + unit * region.width,
                AbsoluteAxis::Y => region.y + unit * region.height,
            },
            _ => unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AbsRange, NativeDeviceId};
    use crate::translator::device::{DeviceId, DeviceInfo};
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn device(kind: DeviceKind) -> AbstractInputDevice {
        AbstractInputDevice {
            id: DeviceId(1),
            kind,
            native: NativeDeviceId(1),
            info: DeviceInfo { name: "test".into(), vendor: 0, product: 0, path: None },
            abs_x: Some(AbsRange::new(0.0, 200.0)),
            abs_y: Some(AbsRange::new(100.0, 300.0)),
            tools: BTreeSet::new(),
        }
    }

    #[rstest]
    #[case(AbsoluteAxis::X, 50.0, 0.25)]
    #[case(AbsoluteAxis::Y, 200.0, 0.5)]
    #[case(AbsoluteAxis::X, -10.0, 0.0)]
    #[case(AbsoluteAxis::Y, 900.0, 1.0)]
    fn test_scales_by_device_range(#[case] axis: AbsoluteAxis, #[case] raw: f64, #[case] expected: f64) {
        let transform = RangeTransform::default();
        assert_eq!(transform.normalize(&device(DeviceKind::TabletTool), axis, raw), expected);
    }

    #[test]
    fn test_tablet_region_applies_only_to_tablets() {
        let region = MapRegion { x: 0.5, y: 0.0, width: 0.5, height: 0.5 };
        let transform = RangeTransform::new(Some(region));
        assert_eq!(transform.normalize(&device(DeviceKind::TabletTool), AbsoluteAxis::X, 100.0), 0.75);
        assert_eq!(transform.normalize(&device(DeviceKind::TabletTool), AbsoluteAxis::Y, 300.0), 0.5);
        assert_eq!(transform.normalize(&device(DeviceKind::Touch), AbsoluteAxis::X, 100.0), 0.5);
    }

    #[test]
    fn test_closures_are_transforms() {
        let flip = |_: &AbstractInputDevice, _: AbsoluteAxis, raw: f64| 1.0 - raw;
        assert_eq!(flip.normalize(&device(DeviceKind::Pointer), AbsoluteAxis::X, 0.25), 0.75);
    }
}
