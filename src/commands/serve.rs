//! Start the price lookup server.

use std::path::PathBuf;

use crate::server;
use crate::services::DataStore;

pub fn run(port: u16, data_dir: PathBuf) {
    let store = DataStore::new(data_dir);
    println!("🚀 Starting price API on port {}", port);
    println!("📁 Dataset root: {}", store.root().display());

    let runtime = super::build_runtime();
    if let Err(e) = runtime.block_on(server::serve(store, port)) {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
