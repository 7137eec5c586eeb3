//! mkfs-sfs - Create SFS (single-user file system) disk images
//!
//! Usage:
//!   mkfs_sfs --path disk.img --size-exponent 20   # 2^20 = 1 MiB image, 256 blocks

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "mkfs-sfs")]
#[command(about = "Create SFS (single-user file system) disk images")]
struct Args {
    /// Output disk image file
    #[arg(long)]
    path: PathBuf,

    /// Disk size exponent M: the image is 2^M bytes
    #[arg(long)]
    size_exponent: u32,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match sfs::Sfs::format(&args.path, args.size_exponent) {
        Ok(()) => {
            let blocks = sfs::block_count_for_exponent(args.size_exponent)
                .expect("format already validated size_exponent");
            println!(
                "Created {} ({} bytes, {} blocks of {} bytes)",
                args.path.display(),
                1u64 << args.size_exponent,
                blocks,
                sfs::BLOCK_SIZE,
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("mkfs-sfs: {e}");
            ExitCode::FAILURE
        }
    }
}
