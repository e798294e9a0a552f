// build.rs

//! Renders `man/compatfix.1` from the clap definitions in `src/cli.rs`

use clap::CommandFactory;
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn render_man_page(out_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;

    let mut buffer = Vec::new();
    Man::new(cli::Cli::command()).render(&mut buffer)?;

    let path = out_dir.join("compatfix.1");
    fs::write(&path, buffer)?;
    Ok(path)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/cli.rs");

    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set; skipping man page");
        return;
    };

    if let Err(e) = render_man_page(&PathBuf::from(manifest_dir).join("man")) {
        println!("cargo:warning=Failed to generate man page: {}", e);
    }
}
