//! Validated, immutable options for one combine run
//!

use camino::Utf8PathBuf;
use regex::Regex;

use crate::cli::defaults::{SPECIES_ASSEMBLIES, SpeciesAssemblies};
use crate::errors::{CombineError, CombineResult};
use crate::filenames;

/// Species code used to select the database and embedded in every output filename
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Species(String);

impl Species {
    pub fn new(token: &str) -> CombineResult<Self> {
        // The token is embedded in filenames, so restrict it to a plain word
        let token_regex = Regex::new(r"^[A-Za-z0-9_]+$").map_err(|e| {
            CombineError::Validation(format!("Failed to build species pattern: {e}"))
        })?;
        if !token_regex.is_match(token) {
            return Err(CombineError::InvalidSpecies(token.to_string()));
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn assembly_table(&self) -> Option<&'static SpeciesAssemblies> {
        SPECIES_ASSEMBLIES.iter().find(|x| x.species == self.0)
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Genome assembly of the final table coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assembly {
    /// Assembly selection does not apply to this species
    Unspecified,

    /// The database native assembly of the species
    Native(&'static str),

    /// A non-native assembly, reached by liftover from the native one
    Lifted {
        native: &'static str,
        target: &'static str,
    },
}

impl Assembly {
    /// Resolve the requested assembly for the given species
    ///
    /// Species without an assembly table silently ignore the request.
    ///
    pub fn resolve(species: &Species, requested: Option<&str>) -> CombineResult<Self> {
        let table = match species.assembly_table() {
            Some(x) => x,
            None => return Ok(Self::Unspecified),
        };
        let requested = match requested {
            Some(x) if !x.is_empty() => x,
            _ => return Ok(Self::Native(table.native)),
        };
        if requested == table.native {
            return Ok(Self::Native(table.native));
        }
        match table.lifted.iter().find(|x| **x == requested) {
            Some(target) => Ok(Self::Lifted {
                native: table.native,
                target: *target,
            }),
            None => Err(CombineError::InvalidAssembly {
                assembly: requested.to_string(),
                species: species.to_string(),
            }),
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Unspecified => None,
            Self::Native(x) => Some(*x),
            Self::Lifted { target, .. } => Some(*target),
        }
    }

    /// Filename fragment marking a non-native assembly (empty otherwise)
    pub fn suffix(&self) -> String {
        match self {
            Self::Lifted { target, .. } => format!("-{target}"),
            _ => String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrVersion {
    V1,
    V2,
}

impl IrVersion {
    pub fn from_int(version: u8) -> CombineResult<Self> {
        match version {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            _ => Err(CombineError::InvalidParameter(format!(
                "Intron retention version must be 1 or 2, found: {version}"
            ))),
        }
    }

    pub fn as_int(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Filename suffix of the intron-retention family files for this version
    pub fn sample_file_suffix(&self) -> &'static str {
        match self {
            Self::V1 => filenames::IR_V1_SAMPLE_SUFFIX,
            Self::V2 => filenames::IR_V2_SAMPLE_SUFFIX,
        }
    }
}

/// Boolean run-mode and output options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunFlags {
    pub skip_intron_retention: bool,
    pub only_intron_retention: bool,
    pub only_exon_skipping: bool,
    pub skip_annotation: bool,
    pub only_expression: bool,
    pub skip_expression: bool,
    pub use_all_exclusion_junctions: bool,
    pub counts_in_expression: bool,
    pub normalize_expression: bool,
    pub install_normalization_dependency: bool,
    pub compress: bool,
}

/// Raw options before validation
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub species: String,
    pub assembly: Option<String>,
    pub db_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub flags: RunFlags,
    pub extra_eej: u32,
    pub ir_version: u8,
    pub verbose: bool,
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub species: Species,
    pub assembly: Assembly,
    pub db_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub flags: RunFlags,
    pub extra_eej: u32,
    pub ir_version: IrVersion,
    pub verbose: bool,
}

impl RunConfig {
    /// Validate raw options into a run configuration
    ///
    /// The output directory must already exist, it is never created here.
    ///
    pub fn new(options: RunOptions) -> CombineResult<Self> {
        let species = Species::new(&options.species)?;
        let assembly = Assembly::resolve(&species, options.assembly.as_deref())?;
        let ir_version = IrVersion::from_int(options.ir_version)?;
        if !options.output_dir.is_dir() {
            return Err(CombineError::MissingOutputDir(options.output_dir));
        }

        Ok(Self {
            species,
            assembly,
            db_dir: options.db_dir,
            output_dir: options.output_dir,
            flags: options.flags,
            extra_eej: options.extra_eej,
            ir_version,
            verbose: options.verbose,
        })
    }

    pub fn assembly_suffix(&self) -> String {
        self.assembly.suffix()
    }

    /// Directory holding the per-sample intermediate files
    pub fn sample_dir(&self) -> Utf8PathBuf {
        self.output_dir.join(filenames::SAMPLE_DIRNAME)
    }

    /// Directory receiving the per-pipeline result tables
    pub fn results_dir(&self) -> Utf8PathBuf {
        self.output_dir.join(filenames::RESULTS_DIRNAME)
    }
}
