/// Read token length shared by every sub-pipeline invocation
pub const TOKEN_LENGTH: u32 = 50;

pub const DEFAULT_IR_VERSION: u8 = 1;

pub const DEFAULT_EXTRA_EEJ: u32 = 0;

/// Genome assemblies available for one species
///
/// The native assembly is the coordinate system used by the species database. Every lifted
/// assembly requires a liftover dictionary from the native assembly.
pub struct SpeciesAssemblies {
    pub species: &'static str,
    pub native: &'static str,
    pub lifted: &'static [&'static str],
}

/// Species for which an assembly can be selected. All other species always use the database
/// native coordinates and ignore any assembly setting.
pub const SPECIES_ASSEMBLIES: &[SpeciesAssemblies] = &[
    SpeciesAssemblies {
        species: "Hsa",
        native: "hg19",
        lifted: &["hg38"],
    },
    SpeciesAssemblies {
        species: "Mmu",
        native: "mm9",
        lifted: &["mm10"],
    },
];
