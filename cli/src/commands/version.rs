//! Version command

/// Run the version command.
pub fn run() {
    println!("nodeboot {}", env!("CARGO_PKG_VERSION"));
}
