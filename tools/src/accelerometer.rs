//! Read and stream the micro:bit accelerometer.

mod device;
mod report;

use std::time::Duration;

use clap::Parser;
use microbit_ble::codec::Vector3;
use microbit_ble::registry::{ACCELEROMETER_DATA, ACCELEROMETER_PERIOD};
use microbit_ble::Error;

use device::{DeviceArgs, MicrobitSession};
use report::Report;

#[derive(Parser)]
#[command(name = "microbit-accelerometer")]
#[command(about = "Stream accelerometer readings from a micro:bit")]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    /// Accelerometer period to write, in milliseconds (1, 2, 5, 10, 20, 80, 160 or 640)
    #[arg(long)]
    period: Option<u16>,

    /// Number of readings to print
    #[arg(short, long, default_value_t = 10)]
    samples: usize,

    /// Seconds to wait for each reading
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

async fn read_period(session: &MicrobitSession) -> Result<u16, Error> {
    let handle = session.handle(&ACCELEROMETER_PERIOD)?;
    session.read(&handle).await
}

async fn write_period(session: &MicrobitSession, period: u16) -> Result<(), Error> {
    let handle = session.handle(&ACCELEROMETER_PERIOD)?;
    session.write(&handle, &period).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut report = Report::new("micro:bit accelerometer");

    let Some(mut session) = device::connect(args.device.filter(), &mut report).await else {
        report.print_summary();
        std::process::exit(1);
    };

    device::resolve(
        &mut session,
        &[ACCELEROMETER_DATA, ACCELEROMETER_PERIOD],
        &mut report,
    );

    if let Some(period) = args.period {
        report.step(
            &format!("Writing accelerometer period ({} ms)", period),
            write_period(&session, period).await,
        );
    }
    if let Some(period) = report.step("Reading accelerometer period", read_period(&session).await) {
        report.value("Period (ms)", period);
    }

    let readings = match session.handle(&ACCELEROMETER_DATA) {
        Ok(handle) => session.subscribe::<Vector3>(&handle).await,
        Err(e) => Err(e),
    };
    if let Some(mut readings) = report.step("Starting accelerometer notifications", readings) {
        device::print_notifications(
            &mut readings,
            args.samples,
            Duration::from_secs(args.timeout),
            "Acceleration",
            &mut report,
        )
        .await;
        report.step(
            "Stopping accelerometer notifications",
            session.unsubscribe(readings).await,
        );
    }

    device::disconnect(&mut session, &mut report).await;
    report.print_summary();

    if report.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
