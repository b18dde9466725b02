//! Text patterns of the compiler's generated C++.
//!
//! The YYC backend is not parsed as C++. Two textual facts are enough:
//! every script or event entry point is declared up front as an `extern`
//! anonymous symbol, and every body follows a fixed signature line. Both
//! are matched verbatim, with a byte-level brace scan for the body extent.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::InjectError;

/// Declaration of a compiled entry point, e.g.
/// `extern YYVAR g_Script_gml_Script_move_gml_GlobalScript_scr_player;`
/// The capture is the symbol the body is emitted under.
static ANON_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"extern YYVAR g_Script_(gml_(?:Script|Object)_\w+)").unwrap());

/// Anonymous symbols in declaration order. The compiler declares them in
/// the same order it emits the bodies, which is also source order.
pub fn anonymous_symbols(generated: &str) -> Vec<&str> {
    ANON_SYMBOL
        .captures_iter(generated)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .collect()
}

/// Byte range of the body of `symbol` in the generated text, between the
/// signature's opening brace and its matching closing brace (exclusive of
/// both).
///
/// Callable functions and object events have distinct fixed signatures;
/// the signature text is matched verbatim, double space included. The
/// brace scan is byte-wise and counts every brace, which is correct for
/// compiler output where string literals never hold unbalanced braces.
pub fn locate_body(
    symbol: &str,
    callable: bool,
    generated: &str,
) -> Result<Range<usize>, InjectError> {
    let signature = if callable {
        format!(
            "YYRValue& {symbol}( CInstance* pSelf, CInstance* pOther, YYRValue& _result, int _count,  YYRValue** _args  )"
        )
    } else {
        format!("void {symbol}( CInstance* pSelf, CInstance* pOther )")
    };
    let header =
        Regex::new(&format!(r"{}\n+\{{", regex::escape(&signature))).map_err(|_| {
            InjectError::BodyNotFound {
                symbol: symbol.to_string(),
            }
        })?;

    let start = header
        .find(generated)
        .ok_or_else(|| InjectError::BodyNotFound {
            symbol: symbol.to_string(),
        })?
        .end();

    let mut depth = 1u32;
    for (i, byte) in generated.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(start..start + i);
                }
            }
            _ => {}
        }
    }

    Err(InjectError::UnterminatedBody {
        symbol: symbol.to_string(),
    })
}
