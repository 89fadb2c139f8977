//! Output file naming: `<prefix>___<n>.<extension>` with `n` in `1..=1_000_000`.

use rand::Rng;

/// Largest random suffix.
pub const MAX_SUFFIX: u32 = 1_000_000;

/// Build a file name from `prefix`, a random suffix drawn from `rng`, and
/// `extension` (without the dot).
pub fn generate_file_name<R: Rng + ?Sized>(prefix: &str, extension: &str, rng: &mut R) -> String {
    let suffix = rng.gen_range(1..=MAX_SUFFIX);
    format!("{prefix}___{suffix}.{extension}")
}
