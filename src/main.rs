//! RTP erasure-coding demo harness.
//!
//! Builds an in-memory disk array, encodes a stripe of random data, erases
//! a configurable set of symbol positions, decodes the data back, and
//! verifies the codeword. This is a demonstration of the engine in
//! `rtp_ec`, not a storage controller: device placement, scheduling, and
//! physical I/O belong to the host system embedding this crate.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rtp_ec::mem_array::MemDiskArray;
use rtp_ec::{RtpParams, RtpProcessor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of data symbols per stripe. Ignored if `--params-file` is set.
    #[arg(long, env = "RTP_CODE_DIMENSION", default_value_t = 4)]
    code_dimension: u32,

    /// Bytes per subsymbol. Ignored if `--params-file` is set.
    #[arg(long, env = "RTP_STRIPE_UNIT_SIZE", default_value_t = 64)]
    stripe_unit_size: usize,

    /// Load `RtpParams` from a JSON file instead of the flags above, e.g.
    /// `{"code_dimension": 4, "stripe_unit_size": 64}`.
    #[arg(long, env = "RTP_PARAMS_FILE")]
    params_file: Option<PathBuf>,

    /// Comma-separated symbol positions to erase (at most 3), e.g. "1,3,4".
    #[arg(long, env = "RTP_ERASE", default_value = "")]
    erase: String,

    /// Log level.
    #[arg(long, env = "RTP_LOG", default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_params(args: &Args) -> rtp_ec::Result<RtpParams> {
    if let Some(path) = &args.params_file {
        let path_str = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| rtp_ec::RtpError::ConfigLoad {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        let params: RtpParams =
            serde_json::from_str(&text).map_err(|e| rtp_ec::RtpError::ConfigLoad {
                path: path_str,
                reason: e.to_string(),
            })?;
        params.validate()?;
        return Ok(params);
    }
    RtpParams::new(args.code_dimension, args.stripe_unit_size)
}

fn main() -> rtp_ec::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let params = load_params(&args)?;
    let processor = RtpProcessor::new(params)?;
    let geo = processor.geometry();
    info!(p = geo.p, k = geo.k, symbol_size = geo.symbol_size(), "constructed RTP processor");

    let array = MemDiskArray::new(&geo);
    let attached = processor.attach(&array, 1)?;

    let data: Vec<u8> = (0..geo.k as usize * geo.symbol_size())
        .map(|i| (i % 251) as u8)
        .collect();

    let stripe = 0u64;
    let tid = 0usize;
    attached.encode_stripe(stripe, array.no_erasures_id(), tid, &data)?;
    info!("encoded stripe");
    let ok = attached.check_codeword(stripe, array.no_erasures_id(), tid)?;
    info!(ok, "checked freshly-encoded codeword");

    let erased: Vec<u32> = args
        .erase
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if erased.is_empty() {
        info!("no --erase positions given, demo complete");
        return Ok(());
    }

    let id = array.erase(&erased);
    if !attached.is_correctable(id) {
        warn!(?erased, "erasure set is not correctable (more than 3 losses)");
        return Ok(());
    }

    let mut restored = vec![0u8; data.len()];
    let ok = attached.decode_data_symbols(stripe, id, tid, 0, geo.k, &mut restored)?;
    info!(ok, ?erased, "decoded data symbols after erasure");

    if restored == data {
        info!("restored data matches original");
    } else {
        warn!("restored data DOES NOT match original");
    }

    Ok(())
}
