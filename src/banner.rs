use std::net::{IpAddr, UdpSocket};

pub const CONVERSATION_PATH: &str = "/v2/app/conversation";

/// LAN address the device should dial, or `"localhost"` when there is no
/// route. Connecting a UDP socket sends nothing; it only selects the
/// outgoing interface.
pub fn local_ip() -> String {
    probe_local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "localhost".to_string())
}

fn probe_local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

pub fn device_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}{CONVERSATION_PATH}")
}

pub fn startup_banner(host: &str, port: u16, upstream_url: &str) -> String {
    let rule = "=".repeat(70);
    let device = device_url(host, port);
    [
        String::new(),
        rule.clone(),
        "Spark relay started".to_string(),
        rule.clone(),
        String::new(),
        format!("LAN address:    {host}"),
        format!("Listening port: {port}"),
        format!("Upstream:       {upstream_url}"),
        String::new(),
        "Device endpoint:".to_string(),
        format!("   {device}"),
        String::new(),
        "Status page:".to_string(),
        format!("   http://{host}:{port}/"),
        String::new(),
        "Device configuration:".to_string(),
        "   set api_url in applications/ai_dialog_tool.c to".to_string(),
        format!("   \"{device}\""),
        String::new(),
        "Smoke test:".to_string(),
        format!("   curl http://{host}:{port}/test"),
        String::new(),
        rule,
        "Press Ctrl+C to stop".to_string(),
        String::new(),
    ]
    .join("\n")
}
