//! Import allow-list and forbidden-call validation (spec.md §4.5),
//! grounded on `original_source/core/code_executor.py`'s
//! `basic_code_validation`/`sanitize_code` pair: a cheap Rust-side token
//! scan rejects obvious violations before a guest process is even
//! spawned; the guest's embedded shim re-validates with Python's own
//! `ast` module (the authoritative check, since Rust has no Python
//! parser) before executing anything.

use crate::error::SandboxError;

pub const ALLOWED_IMPORTS: &[&str] = &[
    "numpy",
    "pandas",
    "math",
    "random",
    "datetime",
    "json",
    "itertools",
    "collections",
    "re",
    "statistics",
];

const FORBIDDEN_CALLS: &[&str] = &[
    "open", "exec", "eval", "compile", "globals", "locals", "getattr", "setattr", "__import__",
];

const FORBIDDEN_MODULES: &[&str] = &[
    "os",
    "sys",
    "subprocess",
    "socket",
    "pickle",
    "marshal",
    "ctypes",
    "shutil",
    "pathlib",
    "importlib",
    "multiprocessing",
    "threading",
];

/// Reject code containing a forbidden call/module token or an import of
/// a module outside [`ALLOWED_IMPORTS`]. This is a conservative,
/// string-level pass: it can reject code the AST stage would have
/// allowed (e.g. a forbidden word inside a string literal) but it never
/// lets something through the AST stage would reject, which is the
/// safe direction for a pre-filter.
pub fn validate_syntax_and_imports(code: &str) -> Result<(), SandboxError> {
    if code.trim().is_empty() {
        return Err(SandboxError::Validation("code is empty".into()));
    }

    for line in code.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("import ") {
            check_import_targets(rest.split(',').map(str::trim))?;
        } else if let Some(rest) = trimmed.strip_prefix("from ") {
            if let Some((module, _)) = rest.split_once(" import") {
                check_import_targets(std::iter::once(module.trim()))?;
            }
        }
    }

    for forbidden in FORBIDDEN_CALLS {
        if contains_call(code, forbidden) {
            return Err(SandboxError::Validation(format!(
                "forbidden call: {}(",
                forbidden
            )));
        }
    }

    for module in FORBIDDEN_MODULES {
        if contains_word(code, module) {
            return Err(SandboxError::Validation(format!(
                "forbidden module reference: {}",
                module
            )));
        }
    }

    Ok(())
}

fn check_import_targets<'a>(targets: impl Iterator<Item = &'a str>) -> Result<(), SandboxError> {
    for target in targets {
        let base = target.split(" as ").next().unwrap_or(target).trim();
        let base = base.split('.').next().unwrap_or(base);
        if !ALLOWED_IMPORTS.contains(&base) {
            return Err(SandboxError::Validation(format!(
                "import not allowed: {}",
                base
            )));
        }
    }
    Ok(())
}

fn contains_call(code: &str, name: &str) -> bool {
    let needle = format!("{}(", name);
    code.match_indices(&needle)
        .any(|(idx, _)| idx == 0 || !is_ident_char(code.as_bytes()[idx - 1] as char))
}

fn contains_word(code: &str, word: &str) -> bool {
    code.split(|c: char| !is_ident_char(c)).any(|tok| tok == word)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_permitted_imports() {
        assert!(validate_syntax_and_imports("import math\nresult = math.sqrt(4)").is_ok());
        assert!(validate_syntax_and_imports("from collections import Counter\nresult = 1").is_ok());
    }

    #[test]
    fn rejects_disallowed_import() {
        let err = validate_syntax_and_imports("import os\nresult = os.getcwd()").unwrap_err();
        assert!(matches!(err, SandboxError::Validation(_)));
    }

    #[test]
    fn rejects_forbidden_call() {
        let err = validate_syntax_and_imports("result = eval('1+1')").unwrap_err();
        assert!(matches!(err, SandboxError::Validation(_)));
    }

    #[test]
    fn rejects_forbidden_module_reference_without_import() {
        let err = validate_syntax_and_imports("result = subprocess.run(['ls'])").unwrap_err();
        assert!(matches!(err, SandboxError::Validation(_)));
    }

    #[test]
    fn empty_code_is_rejected() {
        assert!(validate_syntax_and_imports("   ").is_err());
    }
}
