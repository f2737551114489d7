use std::ffi::CString;

use thiserror::Error;

/// Errors that can occur talking to the HID transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Unable to initialize HID backend: {0}")]
    Backend(String),
    #[error("Unable to open device: {0}")]
    Open(String),
    #[error("Unable to read from device: {0}")]
    Read(String),
}

/// Identifying information for an enumerated HID device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
}

/// Access to the HID bus. The production implementation is backed by
/// [hidapi]; tests substitute their own.
pub trait HidTransport: Send + Sync {
    /// List all currently attached HID devices.
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, TransportError>;

    /// Open a handle to the given device.
    fn open(&self, device: &DeviceInfo) -> Result<Box<dyn HidHandle>, TransportError>;
}

/// An open device handle. Reads block until the device emits the next input
/// report. Dropping the handle closes the device.
pub trait HidHandle: Send {
    /// Read the next input report into `buf` and return the number of bytes
    /// read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// [HidTransport] implementation using the hidapi HID stack
#[derive(Debug, Default)]
pub struct HidApiTransport;

impl HidTransport for HidApiTransport {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, TransportError> {
        let api = hidapi::HidApi::new().map_err(|e| TransportError::Backend(e.to_string()))?;
        let devices = api
            .device_list()
            .map(|info| DeviceInfo {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                path: info.path().to_string_lossy().to_string(),
            })
            .collect();

        Ok(devices)
    }

    fn open(&self, device: &DeviceInfo) -> Result<Box<dyn HidHandle>, TransportError> {
        let c_path =
            CString::new(device.path.clone()).map_err(|e| TransportError::Open(e.to_string()))?;
        let api = hidapi::HidApi::new().map_err(|e| TransportError::Backend(e.to_string()))?;
        let handle = api
            .open_path(&c_path)
            .map_err(|e| TransportError::Open(e.to_string()))?;

        Ok(Box::new(HidApiHandle { device: handle }))
    }
}

struct HidApiHandle {
    device: hidapi::HidDevice,
}

impl HidHandle for HidApiHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.device
            .read(buf)
            .map_err(|e| TransportError::Read(e.to_string()))
    }
}
