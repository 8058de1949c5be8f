//! Dump every service and characteristic a micro:bit exposes.

mod device;
mod report;

use clap::Parser;
use colored::Colorize;
use microbit_ble::registry::{self, Namespace};

use device::DeviceArgs;
use report::Report;

#[derive(Parser)]
#[command(name = "microbit-scan")]
#[command(about = "List the GATT services and characteristics of a micro:bit")]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    /// Show services outside the micro:bit profile too
    #[arg(long)]
    any_service: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut report = Report::new("micro:bit GATT scan");

    let mut filter = args.device.filter();
    if args.any_service {
        filter.services.clear();
    }

    let Some(mut session) = device::connect(filter, &mut report).await else {
        report.print_summary();
        std::process::exit(1);
    };

    if let Some(services) = report.step("Getting primary services", session.services()) {
        let mut characteristics = 0;
        for service in services {
            println!(
                "    {} {} - {}",
                "Service:".bold(),
                registry::lookup(&service.uuid, Namespace::Service),
                service.uuid
            );
            for characteristic in &service.characteristics {
                println!(
                    "        {} {} - {} {}",
                    "Characteristic:".bold(),
                    registry::lookup(&characteristic.uuid, Namespace::Characteristic),
                    characteristic.uuid,
                    characteristic.properties
                );
                characteristics += 1;
            }
        }
        report.note(format!(
            "{} services, {} characteristics",
            services.len(),
            characteristics
        ));
    }

    device::disconnect(&mut session, &mut report).await;
    report.print_summary();

    if report.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
