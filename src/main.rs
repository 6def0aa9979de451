use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

use mpc2ades::obs_context::SiteConfig;
use mpc2ades::psv::{convert_mpcreport_to_psv, find_astrometrica_log};

#[derive(Parser)]
#[command(name = "mpc2ades")]
#[command(about = "Convert MPC 1992 80-column astrometry reports to ADES PSV")]
struct Cli {
    /// MPCReport.txt file written by Astrometrica
    mpcreport: Utf8PathBuf,

    /// Output PSV file (defaults to the report name with a .psv extension)
    output: Option<Utf8PathBuf>,

    /// Skip the Astrometrica.log lookup and write the plain table layout
    #[arg(long)]
    no_rms: bool,

    /// Site configuration TOML overriding the built-in table
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

/// Default output path: the report name with `.txt` swapped for `.psv`, in
/// the report's directory.
fn default_output(mpcreport: &Utf8Path) -> Utf8PathBuf {
    let name = mpcreport.file_name().unwrap_or("MPCReport.txt");
    let out_name = if name.contains(".txt") {
        name.replace(".txt", ".psv")
    } else {
        format!("{name}.psv")
    };
    mpcreport.with_file_name(out_name)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SiteConfig::from_file(path)?,
        None => SiteConfig::builtin()?,
    };
    let out_file = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.mpcreport));

    let astrometrica_log = if cli.no_rms {
        None
    } else {
        find_astrometrica_log(&cli.mpcreport)
    };
    let log_string = astrometrica_log
        .as_deref()
        .map(|log| format!(" and {log}"))
        .unwrap_or_default();
    println!(
        "Reading from: {}{}, writing to: {}",
        cli.mpcreport, log_string, out_file
    );

    let num_objects = convert_mpcreport_to_psv(
        &cli.mpcreport,
        &out_file,
        astrometrica_log.is_some(),
        astrometrica_log.as_deref(),
        &config,
    )?;
    if num_objects == 0 {
        anyhow::bail!("no observations written to {}", out_file);
    }
    println!("Wrote {num_objects} objects to {out_file}");

    Ok(())
}
