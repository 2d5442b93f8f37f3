//! Name tables for generated targets.
//!
//! Static wordlists indexed by the generation stream. Sibling names get a
//! numeric suffix so a directory never contains duplicate entries.

use rand::Rng;

/// Corporate target hosts, as handed out by the mission ledger.
pub static CORPORATIONS: &[&str] = &[
    "neuronet",
    "cybercorp",
    "datadyn",
    "techtron",
    "quantum-systems",
    "binary-solutions",
    "digital-frontiers",
    "virtual-enterprises",
    "netsphere",
    "codematrix",
];

static DIRECTORIES: &[&str] = &[
    "srv",
    "var",
    "etc",
    "archive",
    "payroll",
    "research",
    "legal",
    "ops",
    "backups",
    "internal",
    "projects",
    "hr",
    "finance",
    "mail",
    "logs",
];

static FILE_STEMS: &[&str] = &[
    "ledger",
    "credentials",
    "roster",
    "contracts",
    "minutes",
    "schematics",
    "manifest",
    "audit",
    "keys",
    "correspondence",
    "prototype",
    "forecast",
];

static FILE_EXTENSIONS: &[&str] = &["db", "log", "csv", "enc", "dat", "txt"];

/// Directory name for the `index`-th subdirectory of its parent.
pub fn directory_name(rng: &mut impl Rng, index: usize) -> String {
    let stem = DIRECTORIES[rng.gen_range(0..DIRECTORIES.len())];
    format!("{stem}_{index:02}")
}

/// File name for the `index`-th file of its directory.
pub fn file_name(rng: &mut impl Rng, index: usize) -> String {
    let stem = FILE_STEMS[rng.gen_range(0..FILE_STEMS.len())];
    let ext = FILE_EXTENSIONS[rng.gen_range(0..FILE_EXTENSIONS.len())];
    format!("{stem}_{index:02}.{ext}")
}
