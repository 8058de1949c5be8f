//! Read, calibrate and stream the micro:bit magnetometer.

mod device;
mod report;

use std::fmt;
use std::time::Duration;

use clap::Parser;
use futures::stream::{self, StreamExt};
use microbit_ble::codec::{CalibrationState, GattValue, Vector3};
use microbit_ble::registry::{
    CharacteristicDescriptor, MAGNETOMETER_BEARING, MAGNETOMETER_CALIBRATION, MAGNETOMETER_DATA,
    MAGNETOMETER_PERIOD,
};
use microbit_ble::{Error, Subscription};

use device::{DeviceArgs, MicrobitSession};
use report::Report;

#[derive(Parser)]
#[command(name = "microbit-magnetometer")]
#[command(about = "Stream magnetometer readings, bearing and calibration state from a micro:bit")]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    /// Magnetometer period to write, in milliseconds (1, 2, 5, 10, 20, 80, 160 or 640)
    #[arg(long)]
    period: Option<u16>,

    /// Request a compass calibration before streaming
    #[arg(long)]
    calibrate: bool,

    /// Number of notifications to print, across all three characteristics
    #[arg(short, long, default_value_t = 20)]
    samples: usize,

    /// Seconds to wait for each notification
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

/// One notification from any of the magnetometer characteristics
enum Reading {
    Field(Vector3),
    Bearing(u16),
    Calibration(CalibrationState),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Field(field) => write!(f, "field {}", field),
            Reading::Bearing(bearing) => write!(f, "bearing {} degrees", bearing),
            Reading::Calibration(state) => write!(f, "calibration: {}", state),
        }
    }
}

async fn read_period(session: &MicrobitSession) -> Result<u16, Error> {
    let handle = session.handle(&MAGNETOMETER_PERIOD)?;
    session.read(&handle).await
}

async fn write_period(session: &MicrobitSession, period: u16) -> Result<(), Error> {
    let handle = session.handle(&MAGNETOMETER_PERIOD)?;
    session.write(&handle, &period).await
}

async fn request_calibration(session: &MicrobitSession) -> Result<(), Error> {
    let handle = session.handle(&MAGNETOMETER_CALIBRATION)?;
    session.write(&handle, &CalibrationState::Requested).await
}

async fn subscribe<V>(
    session: &MicrobitSession,
    descriptor: &CharacteristicDescriptor,
) -> Result<Subscription<V>, Error>
where
    V: GattValue + Send + 'static,
{
    let handle = session.handle(descriptor)?;
    session.subscribe(&handle).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut report = Report::new("micro:bit magnetometer");

    let Some(mut session) = device::connect(args.device.filter(), &mut report).await else {
        report.print_summary();
        std::process::exit(1);
    };

    device::resolve(
        &mut session,
        &[
            MAGNETOMETER_DATA,
            MAGNETOMETER_PERIOD,
            MAGNETOMETER_BEARING,
            MAGNETOMETER_CALIBRATION,
        ],
        &mut report,
    );

    if let Some(period) = args.period {
        report.step(
            &format!("Writing magnetometer period ({} ms)", period),
            write_period(&session, period).await,
        );
    }
    if let Some(period) = report.step("Reading magnetometer period", read_period(&session).await) {
        report.value("Period (ms)", period);
    }

    let field = report.step(
        "Starting magnetometer data notifications",
        subscribe::<Vector3>(&session, &MAGNETOMETER_DATA).await,
    );
    let bearing = report.step(
        "Starting magnetometer bearing notifications",
        subscribe::<u16>(&session, &MAGNETOMETER_BEARING).await,
    );
    let calibration = report.step(
        "Starting magnetometer calibration notifications",
        subscribe::<CalibrationState>(&session, &MAGNETOMETER_CALIBRATION).await,
    );

    if args.calibrate {
        report.step(
            "Requesting magnetometer calibration",
            request_calibration(&session).await,
        );
        report.note("Tilt the micro:bit until the screen is filled");
    }

    // Missing characteristics contribute an empty stream
    let field = stream::iter(field)
        .flatten()
        .map(|r| r.map(Reading::Field));
    let bearing = stream::iter(bearing)
        .flatten()
        .map(|r| r.map(Reading::Bearing));
    let calibration = stream::iter(calibration)
        .flatten()
        .map(|r| r.map(Reading::Calibration));
    let readings = stream::select(field, stream::select(bearing, calibration));

    device::print_notifications(
        readings,
        args.samples,
        Duration::from_secs(args.timeout),
        "Magnetometer",
        &mut report,
    )
    .await;

    device::disconnect(&mut session, &mut report).await;
    report.print_summary();

    if report.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
