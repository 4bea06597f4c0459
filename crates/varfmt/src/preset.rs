//! Placeholders for sequencing-read deflines.
//!
//! [`DEFLINE`] registers the names used by FASTQ/FASTA dump tools in custom
//! defline formats, written with [`Syntax::Dollar`]:
//!
//! | Name | Kind | Slot | Meaning |
//! |------|------|------|---------|
//! | `ac` | string | [`STR_ACCESSION`] | run accession |
//! | `sn` | string | [`STR_SPOT_NAME`], else [`STR_SPOT_ID`] | spot name, or spot id when unnamed |
//! | `sg` | string | [`STR_SPOT_GROUP`] | spot group |
//! | `si` | int | [`INT_SPOT_ID`] | spot id |
//! | `ri` | int | [`INT_READ_ID`] | read id within the spot |
//! | `rl` | int | [`INT_READ_LEN`] | read length |
//!
//! ```rust
//! use varfmt::preset::{self, DEFLINE};
//! use varfmt::FormatProgram;
//!
//! let program = FormatProgram::compile_with("@$ac.$si $sn length=$rl", &DEFLINE, preset::options())?;
//! let out = program.render_to_buffer(&["SRR000001", "", "", "7"], &[7, 1, 36]);
//! assert_eq!(out, b"@SRR000001.7 7 length=36");
//! # Ok::<(), varfmt::Error>(())
//! ```

use once_cell::sync::Lazy;

use crate::config::{CompileOptions, Syntax};
use crate::descriptor::DescriptorTable;
use crate::error::TableError;

pub const STR_ACCESSION: usize = 0;
pub const STR_SPOT_NAME: usize = 1;
pub const STR_SPOT_GROUP: usize = 2;
/// Decimal spot id as text; the fallback for `sn`.
pub const STR_SPOT_ID: usize = 3;
pub const STR_SLOTS: usize = 4;

pub const INT_SPOT_ID: usize = 0;
pub const INT_READ_ID: usize = 1;
pub const INT_READ_LEN: usize = 2;
pub const INT_SLOTS: usize = 3;

/// Defline placeholders, built on first use.
pub static DEFLINE: Lazy<DescriptorTable> = Lazy::new(|| {
    let mut table = DescriptorTable::new();
    register_defline(&mut table).expect("defline names are unique");
    table
});

fn register_defline(table: &mut DescriptorTable) -> Result<(), TableError> {
    table
        .add_string("ac", STR_ACCESSION, None)?
        .add_string("sn", STR_SPOT_NAME, Some(STR_SPOT_ID))?
        .add_string("sg", STR_SPOT_GROUP, None)?
        .add_int("si", INT_SPOT_ID)?
        .add_int("ri", INT_READ_ID)?
        .add_int("rl", INT_READ_LEN)?;
    Ok(())
}

/// Compile options for defline formats.
pub fn options() -> CompileOptions {
    CompileOptions::new(Syntax::Dollar)
}
