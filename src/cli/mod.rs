pub mod defaults;
mod utils;

use camino::Utf8PathBuf;
use clap::Parser;
use simple_error::{SimpleResult, bail};

use self::defaults::{DEFAULT_EXTRA_EEJ, DEFAULT_IR_VERSION};
use self::utils::check_required_dirname;
use crate::errors::CombineResult;
use crate::run_config::{RunConfig, RunFlags, RunOptions};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(rename_all = "kebab_case")]
pub struct Settings {
    /// Output directory of the per-sample align runs. The combined tables are written here.
    ///
    /// The directory must already exist. Per-sample intermediate files are read from its
    /// 'to_combine' subdirectory.
    ///
    #[arg(short = 'o', long, value_name = "DIR", default_value = "vast_out")]
    pub output_dir: Utf8PathBuf,

    /// Species code, for instance Hsa or Mmu
    #[arg(long = "species", visible_alias = "sp", value_name = "SPECIES")]
    pub species: String,

    /// Genome assembly of the final table coordinates
    ///
    /// Only used for Hsa (hg19 or hg38, default hg19) and Mmu (mm9 or mm10, default mm9). A
    /// non-default assembly is produced by liftover of the final table. Ignored for all other
    /// species.
    ///
    #[arg(short = 'a', long, value_name = "ASSEMBLY")]
    pub assembly: Option<String>,

    /// Species database directory
    #[arg(long, value_name = "DIR")]
    pub db_dir: Utf8PathBuf,

    /// Directory holding the quantification and table collaborator programs. Defaults to the
    /// directory of this executable.
    ///
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Intron retention analysis version (1 or 2)
    #[arg(long, value_name = "VERSION", default_value_t = DEFAULT_IR_VERSION)]
    pub ir_version: u8,

    /// Number of extra exon-exon junctions used by the splice-site and annotation pipelines
    #[arg(long = "extra-eej", value_name = "COUNT", default_value_t = DEFAULT_EXTRA_EEJ)]
    pub extra_eej: u32,

    /// Use all exclusion exon-exon junctions in the splice-site pipeline
    #[arg(long = "use-all-excl-eej")]
    pub use_all_exclusion_junctions: bool,

    /// Do not combine intron retention
    #[arg(long = "no-ir")]
    pub skip_intron_retention: bool,

    /// Combine intron retention only
    ///
    /// Takes precedence over --exons-only.
    ///
    #[arg(long = "ir-only")]
    pub only_intron_retention: bool,

    /// Combine exon-skipping family pipelines only, without intron retention or alternative
    /// 5'/3' splice sites
    ///
    #[arg(long = "exons-only")]
    pub only_exon_skipping: bool,

    /// Do not combine the annotation-based pipeline
    #[arg(long = "no-annotation")]
    pub skip_annotation: bool,

    /// Combine expression tables only
    ///
    /// Takes precedence over all other run modes.
    ///
    #[arg(long = "expression-only")]
    pub only_expression: bool,

    /// Do not combine expression tables
    #[arg(long = "no-expression")]
    pub skip_expression: bool,

    /// Write an expression table with raw read counts as well
    #[arg(long = "counts")]
    pub counts_in_expression: bool,

    /// Write a cross-sample normalized expression table as well
    #[arg(long = "norm")]
    pub normalize_expression: bool,

    /// Install the normalization dependency if it is missing
    #[arg(long = "install-limma")]
    pub install_normalization_dependency: bool,

    /// Compress the output tables with gzip
    #[arg(long)]
    pub compress: bool,

    /// Verbose collaborator output
    #[arg(long)]
    pub verbose: bool,

    /// Turn on extra debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Settings after validation
#[derive(Debug)]
pub struct ValidatedSettings {
    pub config: RunConfig,
    pub bin_dir: Utf8PathBuf,
    pub debug: bool,
}

/// Directory of the running executable
fn get_default_bin_dir() -> SimpleResult<Utf8PathBuf> {
    let exe = match std::env::current_exe() {
        Ok(x) => x,
        Err(e) => bail!("Can't find the path of the running executable: {}", e),
    };
    let exe = match Utf8PathBuf::from_path_buf(exe) {
        Ok(x) => x,
        Err(x) => bail!("Executable path is not valid UTF-8: '{}'", x.display()),
    };
    match exe.parent() {
        Some(x) => Ok(x.to_path_buf()),
        None => bail!("Can't find the directory of the running executable: '{}'", exe),
    }
}

/// Validate settings and convert them into the run configuration
///
/// Assumes no logger has been configured yet
///
pub fn validate_and_fix_settings_impl(settings: Settings) -> CombineResult<ValidatedSettings> {
    let flags = RunFlags {
        skip_intron_retention: settings.skip_intron_retention,
        only_intron_retention: settings.only_intron_retention,
        only_exon_skipping: settings.only_exon_skipping,
        skip_annotation: settings.skip_annotation,
        only_expression: settings.only_expression,
        skip_expression: settings.skip_expression,
        use_all_exclusion_junctions: settings.use_all_exclusion_junctions,
        counts_in_expression: settings.counts_in_expression,
        normalize_expression: settings.normalize_expression,
        install_normalization_dependency: settings.install_normalization_dependency,
        compress: settings.compress,
    };

    let config = RunConfig::new(RunOptions {
        species: settings.species,
        assembly: settings.assembly,
        db_dir: settings.db_dir,
        output_dir: settings.output_dir,
        flags,
        extra_eej: settings.extra_eej,
        ir_version: settings.ir_version,
        verbose: settings.verbose,
    })?;
    check_required_dirname(&config.db_dir, "species database")?;

    let bin_dir = match settings.bin_dir {
        Some(x) => x,
        None => get_default_bin_dir()?,
    };
    check_required_dirname(&bin_dir, "collaborator program")?;

    Ok(ValidatedSettings {
        config,
        bin_dir,
        debug: settings.debug,
    })
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
pub fn validate_and_fix_settings(settings: Settings) -> ValidatedSettings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {}", msg);
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}
