const COMMANDS: &[&str] = &["pair_device", "is_device_paired", "unpair_device", "submit_pin"];

fn main() {
    tauri_plugin::Builder::new(COMMANDS).build();
}
