// ── API → domain conversions ──

use std::sync::Arc;

use retrievos_api::types::DeviceRecord;

use crate::model::Device;

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        Device::from_record(record)
    }
}

/// Wrap a fetched device list into a shareable snapshot.
pub fn device_snapshot(records: Vec<DeviceRecord>) -> Arc<Vec<Arc<Device>>> {
    Arc::new(
        records
            .into_iter()
            .map(|r| Arc::new(Device::from(r)))
            .collect(),
    )
}
