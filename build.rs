use std::env;

fn main() {
    // Access-point defaults baked in at build time. These seed the
    // configuration store whenever flash holds no valid config.

    // AP SSID (network name advertised by the device)
    if let Ok(ssid) = env::var("AP_SSID") {
        println!("cargo:rustc-env=AP_SSID={}", ssid);
        println!("cargo:warning=Using AP_SSID from environment: {}", ssid);
    } else {
        println!("cargo:rustc-env=AP_SSID=PicoTherm-AP");
    }

    // AP password (empty means open network)
    if let Ok(password) = env::var("AP_PASSWORD") {
        println!("cargo:rustc-env=AP_PASSWORD={}", password);
        println!("cargo:warning=Using AP_PASSWORD from environment (hidden)");
    } else {
        println!("cargo:rustc-env=AP_PASSWORD=");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=AP_SSID");
    println!("cargo:rerun-if-env-changed=AP_PASSWORD");
}
