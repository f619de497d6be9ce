//! List command - print listening ports without the TUI.

use anyhow::Result;
use portpatrol_core::{PortProcess, PortScanner, ProcessRegistry, Settings, ViewState};

pub async fn run(port_filter: Option<u16>, json: bool, settings: &Settings) -> Result<()> {
    let registry = ProcessRegistry::new(PortScanner::new(settings));
    registry.refresh().await;

    // Same filtering and ordering as the TUI's initial view.
    let ports = ViewState::new(port_filter).visible(&registry.snapshot());

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    print!("{}", render_table(&ports, dirs::home_dir().as_deref().and_then(|p| p.to_str())));
    Ok(())
}

fn render_table(ports: &[PortProcess], home: Option<&str>) -> String {
    if ports.is_empty() {
        return "No listening ports found.\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:<5} {:<8} {:<20} {:<10} {:<15} COMMAND\n",
        "PORT", "PROTO", "PID", "PROCESS", "USER", "ADDRESS"
    );
    out.push_str(&"-".repeat(90));
    out.push('\n');

    for port in ports {
        out.push_str(&format!(
            "{:<6} {:<5} {:<8} {:<20} {:<10} {:<15} {}\n",
            port.port,
            port.protocol.as_str(),
            port.pid,
            truncate(&port.process_name, 20),
            truncate(port.user.as_deref().unwrap_or("-"), 10),
            truncate(&port.address, 15),
            truncate(&port.display_command(home), 50),
        ));
    }

    out.push_str(&format!("\nTotal: {} ports\n", ports.len()));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
