//! Languages command: print the translation language table.

use avgen_core::language::LanguageTable;

pub fn run_languages() {
    print!("{}", LanguageTable::builtin().listing());
}
