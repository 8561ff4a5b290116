mod pad_device;
mod report;

#[allow(unused_imports)]
pub use pad_device::{
    enumerate, PadDevice, PadInfo, PadTransport, DEFAULT_SERIAL, PRODUCT_ID, PRODUCT_NAME,
    VENDOR_ID,
};
#[allow(unused_imports)]
pub use report::{PanelData, PanelSums, REPORT_SIZE, SENSORS_PER_PANEL, SENSOR_COUNT};
