//! Read and write the micro:bit LED matrix, text and scrolling delay.

mod device;
mod report;

use anyhow::bail;
use clap::Parser;
use microbit_ble::codec::LedMatrix;
use microbit_ble::config::led::MATRIX_SIZE;
use microbit_ble::registry::{LED_MATRIX_STATE, LED_TEXT, SCROLLING_DELAY};
use microbit_ble::Error;

use device::{DeviceArgs, MicrobitSession};
use report::Report;

#[derive(Parser)]
#[command(name = "microbit-leds")]
#[command(about = "Control the LED display of a micro:bit")]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    /// Pattern to show: five rows of five 0/1 digits separated by commas,
    /// e.g. 01010,11111,11111,01110,00100
    #[arg(long, value_parser = parse_matrix)]
    matrix: Option<LedMatrix>,

    /// Text to scroll across the display (at most 20 bytes)
    #[arg(long)]
    text: Option<String>,

    /// Scrolling delay to write, in milliseconds
    #[arg(long)]
    delay: Option<u16>,
}

fn parse_matrix(s: &str) -> anyhow::Result<LedMatrix> {
    let rows: Vec<&str> = s.split(',').map(str::trim).collect();
    if rows.len() != MATRIX_SIZE {
        bail!("expected {} rows, got {}", MATRIX_SIZE, rows.len());
    }

    let mut matrix = LedMatrix::new();
    for (row, digits) in rows.iter().enumerate() {
        if digits.len() != MATRIX_SIZE {
            bail!("row {} must have {} digits", row + 1, MATRIX_SIZE);
        }
        for (column, digit) in digits.chars().enumerate() {
            let lit = match digit {
                '1' | '#' => true,
                '0' | '.' => false,
                other => bail!("row {}: unexpected {:?}", row + 1, other),
            };
            matrix.set(row, column, lit);
        }
    }
    Ok(matrix)
}

async fn read_matrix(session: &MicrobitSession) -> Result<LedMatrix, Error> {
    let handle = session.handle(&LED_MATRIX_STATE)?;
    session.read(&handle).await
}

async fn write_matrix(session: &MicrobitSession, matrix: &LedMatrix) -> Result<(), Error> {
    let handle = session.handle(&LED_MATRIX_STATE)?;
    session.write(&handle, matrix).await
}

async fn write_text(session: &MicrobitSession, text: &str) -> Result<(), Error> {
    let handle = session.handle(&LED_TEXT)?;
    session.write(&handle, &text.to_string()).await
}

async fn read_delay(session: &MicrobitSession) -> Result<u16, Error> {
    let handle = session.handle(&SCROLLING_DELAY)?;
    session.read(&handle).await
}

async fn write_delay(session: &MicrobitSession, delay: u16) -> Result<(), Error> {
    let handle = session.handle(&SCROLLING_DELAY)?;
    session.write(&handle, &delay).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut report = Report::new("micro:bit LEDs");

    let Some(mut session) = device::connect(args.device.filter(), &mut report).await else {
        report.print_summary();
        std::process::exit(1);
    };

    device::resolve(
        &mut session,
        &[LED_MATRIX_STATE, LED_TEXT, SCROLLING_DELAY],
        &mut report,
    );

    if let Some(matrix) = &args.matrix {
        report.step("Writing LED matrix", write_matrix(&session, matrix).await);
    }
    if let Some(matrix) = report.step("Reading LED matrix", read_matrix(&session).await) {
        report.value("Matrix", matrix);
    }

    if let Some(delay) = args.delay {
        report.step(
            &format!("Writing scrolling delay ({} ms)", delay),
            write_delay(&session, delay).await,
        );
    }
    if let Some(delay) = report.step("Reading scrolling delay", read_delay(&session).await) {
        report.value("Delay (ms)", delay);
    }

    if let Some(text) = &args.text {
        report.step(
            &format!("Writing LED text {:?}", text),
            write_text(&session, text).await,
        );
    }

    device::disconnect(&mut session, &mut report).await;
    report.print_summary();

    if report.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
