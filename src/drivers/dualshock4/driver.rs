use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::channel::StateChannel;
use crate::transport::{HidApiTransport, HidTransport, TransportError};

use super::state::{decode, DualShockState};

/// Vendor ID
pub const DS4_VID: u16 = 0x054c;
/// Product ID (DualShock 4 v2)
pub const DS4_PID: u16 = 0x09cc;

pub const INPUT_REPORT_USB: u8 = 0x01;
/// Minimum number of bytes a decodable input report must carry
pub const INPUT_REPORT_USB_SIZE: usize = 44;
/// Largest report the reader accepts in a single read
const READ_BUFFER_SIZE: usize = 64;
/// Size of the raw report queue between the reader and the decoder
const BUFFER_SIZE: usize = 32;

/// Errors that can occur connecting to a controller
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("No HID device found matching {vendor_id:04x}:{product_id:04x}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration for identifying the controller on the HID bus
#[derive(Debug, Clone)]
pub struct DualShockOptions {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Tag used to attribute log messages to this device
    pub tag: String,
}

impl Default for DualShockOptions {
    fn default() -> Self {
        Self {
            vendor_id: DS4_VID,
            product_id: DS4_PID,
            tag: "DualShock".to_string(),
        }
    }
}

/// Connection lifecycle of the device handle
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

/// DualShock 4 controller driver. Owns the HID handle for the device and
/// feeds every input report through the decoder into a [StateChannel].
pub struct Driver {
    options: DualShockOptions,
    transport: Arc<dyn HidTransport>,
    channel: StateChannel,
    status_tx: watch::Sender<ConnectionStatus>,
    status_rx: watch::Receiver<ConnectionStatus>,
}

impl Driver {
    pub fn new(options: DualShockOptions) -> Self {
        Self::with_transport(options, Arc::new(HidApiTransport))
    }

    /// Create a driver over a custom transport implementation
    pub fn with_transport(options: DualShockOptions, transport: Arc<dyn HidTransport>) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::default());
        Self {
            options,
            transport,
            channel: StateChannel::new(),
            status_tx,
            status_rx,
        }
    }

    /// The channel that receives a snapshot for every decoded report
    pub fn state_channel(&self) -> StateChannel {
        self.channel.clone()
    }

    /// The most recently decoded snapshot, if any report has arrived yet.
    /// Retains the last value across a transport fault.
    pub fn latest_state(&self) -> Option<DualShockState> {
        self.channel.latest()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Watch receiver that observes connection status transitions
    pub fn status_changed(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Find and open the configured controller, then start reading input
    /// reports. Each report is decoded off the read path and published to the
    /// state channel. On a transport fault the handle is closed and the
    /// driver returns to [ConnectionStatus::Disconnected]; no automatic
    /// reconnect is attempted. Calling this while already connected is a
    /// no-op.
    pub async fn connect(&self) -> Result<(), DriverError> {
        let tag = self.options.tag.clone();
        if *self.status_rx.borrow() == ConnectionStatus::Connected {
            log::debug!("[{tag}] Already connected, ignoring connect request");
            return Ok(());
        }
        let devices = self.transport.enumerate()?;
        let Some(device) = devices.into_iter().find(|device| {
            device.vendor_id == self.options.vendor_id
                && device.product_id == self.options.product_id
        }) else {
            log::error!(
                "[{tag}] No device found with id {:04x}:{:04x}",
                self.options.vendor_id,
                self.options.product_id
            );
            return Err(DriverError::DeviceNotFound {
                vendor_id: self.options.vendor_id,
                product_id: self.options.product_id,
            });
        };
        log::debug!("[{tag}] Found device at {}", device.path);

        let mut handle = self.transport.open(&device)?;
        self.status_tx.send_replace(ConnectionStatus::Connected);
        log::info!(
            "[{tag}] Connected to {:04x}:{:04x}",
            device.vendor_id,
            device.product_id
        );

        let (report_tx, mut report_rx) = mpsc::channel::<Vec<u8>>(BUFFER_SIZE);

        // Reader: blocking reads from the device handle into the report
        // queue. Reads are inherently serialized by the device.
        let status_tx = self.status_tx.clone();
        let reader_tag = tag.clone();
        tokio::task::spawn_blocking(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match handle.read(&mut buf) {
                    Ok(bytes_read) => {
                        if report_tx.blocking_send(buf[..bytes_read].to_vec()).is_err() {
                            log::debug!("[{reader_tag}] Report queue closed, stopping reader");
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("[{reader_tag}] Transport fault, closing device: {e}");
                        break;
                    }
                }
            }
            // Dropping the handle closes the device
            drop(handle);
            status_tx.send_replace(ConnectionStatus::Disconnected);
        });

        // Decoder: decode each report and publish the snapshot. Malformed
        // reports are skipped without publication.
        let channel = self.channel.clone();
        tokio::spawn(async move {
            while let Some(report) = report_rx.recv().await {
                match decode(&report) {
                    Ok(state) => channel.publish(state),
                    Err(e) => log::warn!("[{tag}] Dropping report: {e}"),
                }
            }
        });

        Ok(())
    }
}
