use std::path::PathBuf;

use clap::Parser;

/// Interactive voucher console
#[derive(Debug, Parser)]
#[command(name = "voucherdesk", about = "Create and list discount vouchers", long_about = None)]
pub struct Args {
    /// CSV file of blacklisted customers (`id,name,email,created_at`)
    #[arg(long, env = "VOUCHERDESK_BLACKLIST")]
    pub blacklist: Option<PathBuf>,
}
