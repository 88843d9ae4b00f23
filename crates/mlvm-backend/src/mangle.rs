//! Symbol mangling: `name.arg1.arg2…` with every non-alphanumeric byte
//! hex-escaped as `_XX_`, so the resulting symbol survives any target
//! linker.

use std::fmt::Write as _;

const INTRINSIC_PREFIX: &str = "mlvm.intrinsic";

fn replace_non_alnum(out: &mut String, s: &str) {
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char);
        } else {
            let _ = write!(out, "_{byte:02X}_");
        }
    }
}

/// Mangles a callable's unqualified name plus its argument-type tuple.
#[must_use]
pub fn mangle(name: &str, arg_types: &[String]) -> String {
    let mut joined = name.to_string();
    for arg_type in arg_types {
        joined.push('.');
        joined.push_str(arg_type);
    }
    let mut out = String::with_capacity(joined.len() * 2);
    replace_non_alnum(&mut out, &joined);
    out
}

/// Mangles an intrinsic under the fixed `mlvm.intrinsic.<name>.<argty0>…`
/// prefix before applying the usual escaping.
#[must_use]
pub fn mangle_intrinsic(name: &str, arg_types: &[String]) -> String {
    let mut joined = format!("{INTRINSIC_PREFIX}.{name}");
    for arg_type in arg_types {
        joined.push('.');
        joined.push_str(arg_type);
    }
    let mut out = String::with_capacity(joined.len() * 2);
    replace_non_alnum(&mut out, &joined);
    out
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mangles_plain_identifiers_unchanged_except_dots() {
        assert_eq!(mangle("foo", &["int32".to_string()]), "foo_2E_int32");
    }

    #[test]
    fn escapes_every_non_alnum_byte() {
        let mangled = mangle("add", &["int32".to_string(), "int32".to_string()]);
        assert_eq!(mangled, "add_2E_int32_2E_int32");
    }

    #[test]
    fn pointer_star_is_escaped() {
        let mangled = mangle("deref", &["int32*".to_string()]);
        assert_eq!(mangled, "deref_2E_int32_2A_");
    }

    #[test]
    fn intrinsic_carries_the_fixed_prefix() {
        let mangled = mangle_intrinsic("sin", &["float".to_string()]);
        assert_eq!(
            mangled,
            mangle("mlvm.intrinsic.sin", &["float".to_string()])
        );
    }
}
