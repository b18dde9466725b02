//! Typed-local rewrites inside one generated body.
//!
//! A `var x /*: double */` annotation promotes the generated
//! `YYRValue local_x` slot to the declared native type. The compiler emits
//! every use of a local through the `YYRValue` interface, so each use site
//! also needs patching:
//!
//! - by-ref argument passing (`&/*local*/local_x`) cannot take the address
//!   of a non-`YYRValue`; a fresh `YYRValue` temporary is declared on the
//!   line above and its address passed instead.
//! - `.asReal()` style casts become the bare local.
//! - for `bool` locals, `BOOL_RValue(...)` wrappers become the bare local.

use regex::Regex;

/// Rewrites typed locals, handing out temporary names unique within one
/// injection run.
#[derive(Debug, Default)]
pub struct TypedLocalRewriter {
    counter: usize,
}

impl TypedLocalRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every use of the local `name` in `body`, declared as
    /// `declared_type`. Returns the patched body.
    pub fn rewrite(&mut self, body: &str, name: &str, declared_type: &str) -> String {
        let local = format!("local_{name}");

        // Declaration site
        let mut body = body.replace(
            &format!("YYRValue {local}"),
            &format!("{declared_type} {local}"),
        );

        // By-ref argument passing
        let by_ref = match Regex::new(&format!(
            r"&\s*/\*\s*local\s*\*/\s*{}",
            regex::escape(&local)
        )) {
            Ok(re) => re,
            Err(_) => return body,
        };
        while let Some(range) = by_ref.find(&body).map(|m| m.range()) {
            let temp = format!("__native_ref{}__", self.counter);
            self.counter += 1;

            let use_site = range.start;
            body.replace_range(range, &format!("&{temp}"));

            // Declare the temporary on its own line right above the
            // statement using it.
            let line_start = body[..use_site].rfind('\n').unwrap_or(0);
            body.insert_str(line_start, &format!("\nYYRValue {temp}({local});"));
        }

        // Casts
        if let Ok(re) = Regex::new(&format!(r"{}\.as\w+\(\)", regex::escape(&local))) {
            body = re.replace_all(&body, local.as_str()).into_owned();
        }

        // Truthiness wrappers only apply to bool locals
        if declared_type == "bool" {
            if let Ok(re) = Regex::new(&format!(
                r"BOOL_RValue\(.*{}[^)]*\)",
                regex::escape(&local)
            )) {
                body = re.replace_all(&body, local.as_str()).into_owned();
            }
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_retyped() {
        let mut rw = TypedLocalRewriter::new();
        let out = rw.rewrite("YYRValue local_spd;\nYYRValue local_other;", "spd", "double");
        assert_eq!(out, "double local_spd;\nYYRValue local_other;");
    }

    #[test]
    fn test_cast_removed() {
        let mut rw = TypedLocalRewriter::new();
        let out = rw.rewrite("x = local_spd.asReal() + local_spd.asInt32();", "spd", "double");
        assert_eq!(out, "x = local_spd + local_spd;");
    }

    #[test]
    fn test_by_ref_gets_temporary() {
        let mut rw = TypedLocalRewriter::new();
        let body = "YYRValue local_spd;\nfoo( &/*local*/local_spd );";
        let out = rw.rewrite(body, "spd", "double");
        assert_eq!(
            out,
            "double local_spd;\nYYRValue __native_ref0__(local_spd);\nfoo( &__native_ref0__ );"
        );
    }

    #[test]
    fn test_temporaries_numbered_across_uses() {
        let mut rw = TypedLocalRewriter::new();
        let body = "bar( &/*local*/local_a );\nbar( &/*local*/local_a );";
        let out = rw.rewrite(body, "a", "int");
        assert!(out.contains("__native_ref0__"));
        assert!(out.contains("__native_ref1__"));
        assert!(!out.contains("/*local*/"));
    }

    #[test]
    fn test_counter_spans_variables() {
        let mut rw = TypedLocalRewriter::new();
        let first = rw.rewrite("f( &/*local*/local_a );", "a", "int");
        let second = rw.rewrite("f( &/*local*/local_b );", "b", "int");
        assert!(first.contains("__native_ref0__"));
        assert!(second.contains("__native_ref1__"));
    }

    #[test]
    fn test_bool_wrapper_unwrapped() {
        let mut rw = TypedLocalRewriter::new();
        let out = rw.rewrite("if (BOOL_RValue(local_on)) { x(); }", "on", "bool");
        assert_eq!(out, "if (local_on) { x(); }");
    }

    #[test]
    fn test_non_bool_keeps_wrapper() {
        let mut rw = TypedLocalRewriter::new();
        let out = rw.rewrite("if (BOOL_RValue(local_n)) { x(); }", "n", "double");
        assert_eq!(out, "if (BOOL_RValue(local_n)) { x(); }");
    }

    #[test]
    fn test_other_locals_untouched() {
        let mut rw = TypedLocalRewriter::new();
        let body = "YYRValue local_vel;\nlocal_vel.asReal();";
        let out = rw.rewrite(body, "spd", "double");
        assert_eq!(out, body);
    }
}
