use std::time::Duration;

use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, UsbContext};

use super::report::REPORT_SIZE;
use crate::error::Error;

pub const VENDOR_ID: u16 = 0x0483;
pub const PRODUCT_ID: u16 = 0x5750;
pub const PRODUCT_NAME: &str = "RE:Flex Dance Pad";
/// Serial number assumed when the caller does not name one.
pub const DEFAULT_SERIAL: &str = "0";

/// Blocking report I/O with a dance pad.
///
/// The control loop owns its transport exclusively; implementations need not
/// be shareable between threads.
pub trait PadTransport {
    /// Read one input report into `buf`, returning the number of bytes received.
    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE]) -> Result<usize, Error>;

    /// Write one output report. The first byte is the report id.
    fn write_command(&mut self, command: &[u8]) -> Result<(), Error>;
}

/// A pad seen on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadInfo {
    pub bus: u8,
    pub address: u8,
    pub serial: Option<String>,
    pub product: Option<String>,
}

/// List every pad currently attached.
pub fn enumerate() -> Result<Vec<PadInfo>, Error> {
    let context = Context::new()?;
    let mut pads = Vec::new();

    for device in context.devices()?.iter() {
        let Some(desc) = pad_descriptor(&device)? else {
            continue;
        };

        let (serial, product) = match device.open() {
            Ok(handle) => (
                handle.read_serial_number_string_ascii(&desc).ok(),
                handle.read_product_string_ascii(&desc).ok(),
            ),
            Err(err) => {
                tracing::debug!(
                    bus = device.bus_number(),
                    address = device.address(),
                    "cannot open pad for inspection: {err}"
                );
                (None, None)
            }
        };

        pads.push(PadInfo {
            bus: device.bus_number(),
            address: device.address(),
            serial,
            product,
        });
    }

    Ok(pads)
}

/// A dance pad opened over libusb.
pub struct PadDevice {
    _context: Context,
    handle: DeviceHandle<Context>,
    timeout: Duration,
    serial: String,
}

impl PadDevice {
    /// Open the pad with the given serial number and claim its HID interface.
    ///
    /// A `timeout` of zero makes every transfer block until it completes.
    pub fn open(serial: Option<&str>, timeout: Duration) -> Result<Self, Error> {
        let serial = serial.unwrap_or(DEFAULT_SERIAL);
        let context = Context::new()?;
        let mut found = None;

        for device in context.devices()?.iter() {
            let Some(desc) = pad_descriptor(&device)? else {
                continue;
            };
            let handle = match device.open() {
                Ok(handle) => handle,
                Err(err) => {
                    tracing::debug!(
                        bus = device.bus_number(),
                        address = device.address(),
                        "skipping pad that cannot be opened: {err}"
                    );
                    continue;
                }
            };
            match handle.read_serial_number_string_ascii(&desc) {
                Ok(found_serial) if found_serial == serial => {
                    found = Some((handle, desc));
                    break;
                }
                _ => {}
            }
        }

        let (mut handle, desc) = found.ok_or_else(|| Error::DeviceNotFound {
            serial: serial.to_string(),
        })?;

        let product = handle.read_product_string_ascii(&desc)?;
        if product != PRODUCT_NAME {
            return Err(Error::ProductMismatch {
                found: product,
                expected: PRODUCT_NAME,
            });
        }

        // The kernel HID driver holds the interface on Linux.
        match handle.set_auto_detach_kernel_driver(true) {
            Ok(()) | Err(rusb::Error::NotSupported) => {}
            Err(err) => return Err(err.into()),
        }
        handle.claim_interface(USB_INTERFACE)?;

        tracing::info!(serial, product = PRODUCT_NAME, "opened dance pad");

        Ok(Self {
            _context: context,
            handle,
            timeout,
            serial: serial.to_string(),
        })
    }
}

impl PadTransport for PadDevice {
    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE]) -> Result<usize, Error> {
        Ok(self
            .handle
            .read_interrupt(USB_READ_ENDPOINT, buf, self.timeout)?)
    }

    fn write_command(&mut self, command: &[u8]) -> Result<(), Error> {
        let payload = strip_report_id(command);
        let written = self
            .handle
            .write_interrupt(USB_WRITE_ENDPOINT, payload, self.timeout)?;
        if written != payload.len() {
            return Err(Error::ShortWrite {
                written,
                expected: payload.len(),
            });
        }
        Ok(())
    }
}

impl Drop for PadDevice {
    fn drop(&mut self) {
        if let Err(err) = self.handle.release_interface(USB_INTERFACE) {
            tracing::debug!(serial = %self.serial, "releasing interface failed: {err}");
        }
    }
}

fn pad_descriptor(device: &Device<Context>) -> Result<Option<DeviceDescriptor>, Error> {
    let desc = device.device_descriptor()?;
    if desc.vendor_id() == VENDOR_ID && desc.product_id() == PRODUCT_ID {
        Ok(Some(desc))
    } else {
        Ok(None)
    }
}

/// The pad does not use numbered reports; report id 0 is not sent on the wire.
fn strip_report_id(command: &[u8]) -> &[u8] {
    match command.split_first() {
        Some((&0, rest)) => rest,
        _ => command,
    }
}

const USB_INTERFACE: u8 = 0;
const USB_READ_ENDPOINT: u8 = 0x81;
const USB_WRITE_ENDPOINT: u8 = 0x01;

#[cfg(test)]
mod tests {
    use super::strip_report_id;

    #[test]
    fn unnumbered_report_id_is_stripped() {
        assert_eq!(strip_report_id(&[0x00, 0x5A, 200, 10]), &[0x5A, 200, 10]);
        assert_eq!(strip_report_id(&[0x02, 0x5A]), &[0x02, 0x5A]);
        assert_eq!(strip_report_id(&[]), &[] as &[u8]);
    }
}
