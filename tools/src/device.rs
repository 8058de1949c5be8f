//! Connecting to a micro:bit over the host's Bluetooth adapter.

use std::fmt::Display;
use std::time::Duration;

use colored::Colorize;
use microbit_ble::codec::CodecError;
use microbit_ble::config::discovery::{NAME_PREFIX, SCAN_TIMEOUT_MS};
use microbit_ble::registry::CharacteristicDescriptor;
use microbit_ble::{BtleplugTransport, ConnectionState, DeviceFilter, Disconnect, Session};
use tokio_stream::{Stream, StreamExt};

use crate::report::Report;

pub type MicrobitSession = Session<BtleplugTransport>;

/// Device selection arguments shared by every tool
#[derive(clap::Args)]
pub struct DeviceArgs {
    /// Advertised name prefix to look for
    #[arg(long, default_value = NAME_PREFIX)]
    pub name_prefix: String,

    /// Scan timeout in seconds
    #[arg(long, default_value_t = SCAN_TIMEOUT_MS / 1000)]
    pub scan_timeout: u64,
}

impl DeviceArgs {
    pub fn filter(&self) -> DeviceFilter {
        DeviceFilter {
            name_prefix: self.name_prefix.clone(),
            scan_timeout: Duration::from_secs(self.scan_timeout),
            ..DeviceFilter::default()
        }
    }
}

/// Open the adapter, select a device and connect to its GATT server.
///
/// Each step is logged to `report`; `None` means a step failed.
pub async fn connect(filter: DeviceFilter, report: &mut Report) -> Option<MicrobitSession> {
    let transport = report.step("Opening Bluetooth adapter", BtleplugTransport::new().await)?;

    report.note(format!(
        "Requesting Bluetooth devices named \"{}*\"...",
        filter.name_prefix
    ));
    let mut session = report.step(
        "Requesting device",
        Session::request_device(transport, filter).await,
    )?;
    report.value("Name", &session.device().name);
    report.value("ID", &session.device().id);

    report.step("Connecting to GATT server", session.connect_gatt().await)?;
    watch_link(&session);

    Some(session)
}

/// Print a notice when the link drops.
fn watch_link(session: &MicrobitSession) {
    let mut state = session.watch_state();
    tokio::spawn(async move {
        if state
            .wait_for(|s| *s == ConnectionState::Disconnected)
            .await
            .is_ok()
        {
            println!("  {}", "Bluetooth device disconnected".yellow());
        }
    });
}

/// Disconnect and report whether there was anything to disconnect.
pub async fn disconnect(session: &mut MicrobitSession, report: &mut Report) {
    match report.step("Disconnecting", session.disconnect().await) {
        Some(Disconnect::AlreadyDisconnected) => report.note("There is no device connected"),
        Some(Disconnect::Disconnected) | None => {}
    }
}

/// Resolve each characteristic and log the outcome of each one.
pub fn resolve(session: &mut MicrobitSession, descriptors: &[CharacteristicDescriptor], report: &mut Report) {
    for resolution in session.resolve_all(descriptors) {
        report.step(
            &format!("Getting {} characteristic", resolution.descriptor.name()),
            resolution.result,
        );
    }
}

/// Print up to `samples` notifications.
///
/// Stops early when no notification arrives within `timeout` or the
/// stream ends because the link dropped.
pub async fn print_notifications<S, V>(
    values: S,
    samples: usize,
    timeout: Duration,
    label: &str,
    report: &mut Report,
) where
    S: Stream<Item = Result<V, CodecError>>,
    V: Display,
{
    let values = values.take(samples).timeout(timeout);
    tokio::pin!(values);

    let mut received = 0;
    while let Some(item) = values.next().await {
        match item {
            Ok(Ok(value)) => {
                received += 1;
                report.value(label, value);
            }
            Ok(Err(e)) => {
                report.step(&format!("Decoding {}", label), Err::<(), _>(e));
            }
            Err(_) => {
                report.step(
                    &format!("Waiting for {}", label),
                    Err::<(), _>(format!("No notification within {}s", timeout.as_secs())),
                );
                break;
            }
        }
    }

    report.note(format!("{} {} notifications received", received, label));
}
