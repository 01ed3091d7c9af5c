use besmart::{setup_platform, PlatformConfig};
use std::env;

#[tokio::main]
async fn main() -> besmart::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).expect("usage: monitor <config.json>");

    let config = PlatformConfig::from_file(config_path)?;
    let scan_interval = config.scan_interval();

    println!("Connecting to {} (device {})...", config.url, config.device_id);
    let mut platform = setup_platform(&config).await?;
    println!(
        "Tracking {} room(s), polling every {}s",
        platform.thermostats.len(),
        scan_interval.as_secs()
    );

    loop {
        for thermostat in &mut platform.thermostats {
            thermostat.update().await;
            let unit = thermostat.temperature_unit();
            match (thermostat.current_temperature(), thermostat.target_temperature()) {
                (Some(current), Some(target)) => println!(
                    "[{}] {:.1}{unit} -> {:.1}{unit} | preset: {} | {:?} | setpoint T{}",
                    thermostat.name(),
                    current,
                    target,
                    thermostat.preset_mode().unwrap_or("-"),
                    thermostat.hvac_action(),
                    thermostat.active_setpoint().index(),
                ),
                _ => println!("[{}] no data", thermostat.name()),
            }
        }
        tokio::time::sleep(scan_interval).await;
    }
}
