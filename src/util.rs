use indexmap::IndexSet;
use regex::{Captures, Regex};

lazy_static::lazy_static! {
    pub static ref NON_IDENT_RE: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
    pub static ref IDENT_START_RE: Regex = Regex::new(r"^[A-Za-z_]").unwrap();
}

/// Turn an arbitrary id into a valid identifier.
///
/// Each replaced character yields one `_` per UTF-16 code unit, so astral
/// characters become `__` in the generated module.
pub fn safe_ident(id: &str) -> String {
    let name = NON_IDENT_RE
        .replace_all(id, |caps: &Captures| "_".repeat(caps[0].encode_utf16().count()))
        .into_owned();
    if IDENT_START_RE.is_match(&name) {
        name
    } else {
        format!("_{name}")
    }
}

/// Hands out identifiers that are unique within one generated module.
#[derive(Debug, Default)]
pub struct IdentAllocator {
    used: IndexSet<String>,
}

impl IdentAllocator {
    /// Sanitize `id`; if the result is taken, append `_2`, `_3`, ...
    pub fn allocate(&mut self, id: &str) -> String {
        let base = safe_ident(id);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
