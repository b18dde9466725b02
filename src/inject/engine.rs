//! In-place rewriting of one generated file.
//!
//! The engine holds the whole rewrite in memory and persists it with a
//! single write at the end; a failure partway through leaves the file on
//! disk untouched.

use std::path::Path;

use tracing::debug;

use crate::parser::{
    EntityData, EntityId, ScopeKind, ScopeTree, build_scope_tree, tokenize,
};
use crate::project::{BuildConfig, SourceKind, SourceMapping, source_path};

use super::error::InjectError;
use super::patterns::{anonymous_symbols, locate_body};
use super::rewrite::TypedLocalRewriter;
use super::{INCLUDE_DIRECTIVE, has_include_marker};

/// What `Injector::inject` did with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten.
    Injected,
    /// First line already carries the include directive.
    AlreadyProcessed,
    /// The file name maps to no source file (rooms, PreCreate events).
    NoMapping,
}

/// Injection front end bound to one build session.
#[derive(Debug, Clone)]
pub struct Injector {
    config: BuildConfig,
}

impl Injector {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Resolve the source mapping for `generated` and inject. Files that
    /// are already processed or have no mapping are left untouched.
    pub fn inject(&self, generated: &Path) -> Result<Outcome, InjectError> {
        let Some(file_name) = generated.file_name().and_then(|n| n.to_str()) else {
            return Ok(Outcome::NoMapping);
        };

        if has_include_marker(generated).map_err(|e| InjectError::io(generated, e))? {
            return Ok(Outcome::AlreadyProcessed);
        }

        let Some(mapping) = source_path(&self.config.project_dir, file_name) else {
            return Ok(Outcome::NoMapping);
        };

        inject_file(generated, &mapping)?;
        Ok(Outcome::Injected)
    }
}

/// Rewrite `generated` using annotations from the mapped source file.
pub fn inject_file(generated: &Path, mapping: &SourceMapping) -> Result<(), InjectError> {
    let source = std::fs::read_to_string(&mapping.path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            InjectError::SourceNotFound(mapping.path.clone())
        } else {
            InjectError::io(&mapping.path, err)
        }
    })?;

    let parse_err = |source| InjectError::Parse {
        path: mapping.path.clone(),
        source,
    };
    let tokens = tokenize(&source).map_err(parse_err)?;
    let root_kind = match mapping.kind {
        SourceKind::Script => ScopeKind::Script,
        SourceKind::Object => ScopeKind::Object,
    };
    let root_name = mapping
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let tree = build_scope_tree(&tokens, root_kind, root_name).map_err(parse_err)?;

    let mut text =
        std::fs::read_to_string(generated).map_err(|e| InjectError::io(generated, e))?;

    let claims = claim_symbols(&tree, &anonymous_symbols(&text))?;
    debug!(
        file = %generated.display(),
        claims = claims.len(),
        "claimed anonymous symbols"
    );

    let mut rewriter = TypedLocalRewriter::new();
    for (entity, symbol) in &claims {
        apply_claim(&tree, *entity, symbol, &mut text, &mut rewriter)?;
    }

    if !text.starts_with(INCLUDE_DIRECTIVE) {
        text.insert_str(0, INCLUDE_DIRECTIVE);
    }

    std::fs::write(generated, text).map_err(|e| InjectError::io(generated, e))?;
    Ok(())
}

/// Pair scope-tree entry points with the compiler's anonymous symbols.
///
/// Post-order traversal, children in source order: nested functions are
/// emitted before their enclosing function, which matches the compiler's
/// declaration order.
fn claim_symbols(
    tree: &ScopeTree,
    symbols: &[&str],
) -> Result<Vec<(EntityId, String)>, InjectError> {
    let mut claims = Vec::new();
    let mut next = 0;
    claim_walk(tree, tree.root(), symbols, &mut next, &mut claims)?;
    Ok(claims)
}

fn claim_walk(
    tree: &ScopeTree,
    id: EntityId,
    symbols: &[&str],
    next: &mut usize,
    claims: &mut Vec<(EntityId, String)>,
) -> Result<(), InjectError> {
    for &child in tree.children(id) {
        claim_walk(tree, child, symbols, next, claims)?;
    }
    if tree.scope_kind(id).is_some_and(ScopeKind::claims_symbol) {
        let symbol = symbols
            .get(*next)
            .ok_or(InjectError::SymbolCountMismatch {
                available: symbols.len(),
            })?;
        claims.push((id, symbol.to_string()));
        *next += 1;
    }
    Ok(())
}

/// Apply one claim to the generated text: replace the body with the
/// scope's native code, or patch typed locals if it has none.
fn apply_claim(
    tree: &ScopeTree,
    entity: EntityId,
    symbol: &str,
    text: &mut String,
    rewriter: &mut TypedLocalRewriter,
) -> Result<(), InjectError> {
    let callable = tree
        .scope_kind(entity)
        .is_some_and(ScopeKind::is_function);
    let body_range = locate_body(symbol, callable, text)?;

    let native = tree.native_code(entity);
    if !native.is_empty() {
        let mut replacement = String::from("\n");
        if callable {
            replacement.push_str(&format!(
                "YY_STACKTRACE_FUNC_ENTRY( \"{symbol}\", 0 );\nYYGML_array_set_owner( (int64)(intptr_t)pSelf );\n"
            ));
        }
        replacement.push_str(native);
        if callable {
            replacement.push_str("_result = 0;\nreturn _result;\n");
        }
        text.replace_range(body_range, &replacement);
        return Ok(());
    }

    // Typed locals: rewrite the body once for all variables reachable
    // through anonymous blocks, then splice it back in one go.
    let mut body = text[body_range.clone()].to_string();
    let mut rewrote = false;
    rewrite_locals(tree, entity, &mut body, rewriter, &mut rewrote);
    if rewrote {
        text.replace_range(body_range, &body);
    }
    Ok(())
}

/// Recurse through `Block` children only; named functions nested inside
/// handle their own locals under their own symbol.
fn rewrite_locals(
    tree: &ScopeTree,
    id: EntityId,
    body: &mut String,
    rewriter: &mut TypedLocalRewriter,
    rewrote: &mut bool,
) {
    for &child in tree.children(id) {
        if tree.scope_kind(child) == Some(ScopeKind::Block) {
            rewrite_locals(tree, child, body, rewriter, rewrote);
            continue;
        }
        if let EntityData::Variable {
            declared_type: Some(declared),
        } = &tree.entity(child).data
        {
            if let Some(name) = tree.entity(child).name.as_deref() {
                *body = rewriter.rewrite(body, name, declared);
                *rewrote = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MOVE_SYMBOL: &str = "gml_Script_move_gml_GlobalScript_scr_player";
    const CREATE_SYMBOL: &str = "gml_Object_obj_door_Create_0";

    fn callable_stub(symbol: &str, body: &str) -> String {
        format!(
            "extern YYVAR g_Script_{symbol};\n\
             YYRValue& {symbol}( CInstance* pSelf, CInstance* pOther, YYRValue& _result, int _count,  YYRValue** _args  )\n\
             {{{body}}}\n"
        )
    }

    fn event_stub(symbol: &str, body: &str) -> String {
        format!(
            "extern YYVAR g_Script_{symbol};\n\
             void {symbol}( CInstance* pSelf, CInstance* pOther )\n\
             {{{body}}}\n"
        )
    }

    fn script_mapping(dir: &Path, name: &str, gml: &str) -> SourceMapping {
        let path = dir.join(format!("{name}.gml"));
        std::fs::write(&path, gml).unwrap();
        SourceMapping {
            path,
            kind: SourceKind::Script,
        }
    }

    fn object_mapping(dir: &Path, event: &str, gml: &str) -> SourceMapping {
        let path = dir.join(format!("{event}.gml"));
        std::fs::write(&path, gml).unwrap();
        SourceMapping {
            path,
            kind: SourceKind::Object,
        }
    }

    #[test]
    fn test_function_body_replaced_with_native_code() {
        let tmp = tempfile::tempdir().unwrap();
        let mapping = script_mapping(
            tmp.path(),
            "scr_player",
            "function move() { /*cpp pSelf->x += 4; */ }",
        );
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(&generated, callable_stub(MOVE_SYMBOL, "\nold body;\n")).unwrap();

        inject_file(&generated, &mapping).unwrap();

        let text = std::fs::read_to_string(&generated).unwrap();
        assert!(text.starts_with(INCLUDE_DIRECTIVE));
        assert!(text.contains(&format!(
            "YY_STACKTRACE_FUNC_ENTRY( \"{MOVE_SYMBOL}\", 0 );"
        )));
        assert!(text.contains("YYGML_array_set_owner( (int64)(intptr_t)pSelf );"));
        assert!(text.contains("pSelf->x += 4;"));
        assert!(text.contains("_result = 0;\nreturn _result;\n"));
        assert!(!text.contains("old body"));
    }

    #[test]
    fn test_event_body_gets_no_prologue() {
        let tmp = tempfile::tempdir().unwrap();
        let mapping = object_mapping(tmp.path(), "Create_0", "/*cpp setup(); */");
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(&generated, event_stub(CREATE_SYMBOL, "\nold body;\n")).unwrap();

        inject_file(&generated, &mapping).unwrap();

        let text = std::fs::read_to_string(&generated).unwrap();
        assert!(text.contains("setup();"));
        assert!(!text.contains("YY_STACKTRACE_FUNC_ENTRY"));
        assert!(!text.contains("_result = 0;"));
    }

    #[test]
    fn test_typed_local_rewritten_when_no_native_code() {
        let tmp = tempfile::tempdir().unwrap();
        let mapping = script_mapping(
            tmp.path(),
            "scr_util",
            "function calc() { var spd /*: double */ = 1; }",
        );
        let symbol = "gml_Script_calc_gml_GlobalScript_scr_util";
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(
            &generated,
            callable_stub(symbol, "\nYYRValue local_spd;\nx = local_spd.asReal();\n"),
        )
        .unwrap();

        inject_file(&generated, &mapping).unwrap();

        let text = std::fs::read_to_string(&generated).unwrap();
        assert!(text.contains("double local_spd;"));
        assert!(text.contains("x = local_spd;"));
    }

    #[test]
    fn test_nested_functions_claim_before_parent() {
        // inner is declared first by the compiler; post-order matches
        let tmp = tempfile::tempdir().unwrap();
        let mapping = script_mapping(
            tmp.path(),
            "scr_nest",
            "function outer() { /*cpp outer_code(); */ function inner() { /*cpp inner_code(); */ } }",
        );
        let inner = "gml_Script_inner_gml_GlobalScript_scr_nest";
        let outer = "gml_Script_outer_gml_GlobalScript_scr_nest";
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(
            &generated,
            callable_stub(inner, "\na;\n") + &callable_stub(outer, "\nb;\n"),
        )
        .unwrap();

        inject_file(&generated, &mapping).unwrap();

        let text = std::fs::read_to_string(&generated).unwrap();
        let inner_at = text.find("inner_code();").unwrap();
        let outer_at = text.find("outer_code();").unwrap();
        let inner_sig = text.find(&format!("YYRValue& {inner}(")).unwrap();
        assert!(inner_sig < inner_at && inner_at < outer_at);
    }

    #[test]
    fn test_missing_source_file() {
        let tmp = tempfile::tempdir().unwrap();
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(&generated, callable_stub(MOVE_SYMBOL, "\n")).unwrap();

        let mapping = SourceMapping {
            path: PathBuf::from("/nonexistent/scr_player.gml"),
            kind: SourceKind::Script,
        };
        let err = inject_file(&generated, &mapping).unwrap_err();
        assert!(matches!(err, InjectError::SourceNotFound(_)));
    }

    #[test]
    fn test_symbol_count_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let mapping = script_mapping(
            tmp.path(),
            "scr_two",
            "function a() { /*cpp x; */ }\nfunction b() { /*cpp y; */ }",
        );
        // Only one symbol declared for two functions
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(&generated, callable_stub(MOVE_SYMBOL, "\n")).unwrap();

        let err = inject_file(&generated, &mapping).unwrap_err();
        assert!(matches!(
            err,
            InjectError::SymbolCountMismatch { available: 1 }
        ));
    }

    #[test]
    fn test_failed_injection_leaves_file_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let mapping = script_mapping(tmp.path(), "scr_x", "function a() { /*cpp x; */ }");
        let original = "no signatures here\n".to_string()
            + &format!("extern YYVAR g_Script_{MOVE_SYMBOL};\n");
        let generated = tmp.path().join("out.gml.cpp");
        std::fs::write(&generated, &original).unwrap();

        let err = inject_file(&generated, &mapping).unwrap_err();
        assert!(matches!(err, InjectError::BodyNotFound { .. }));
        assert_eq!(std::fs::read_to_string(&generated).unwrap(), original);
    }

    #[test]
    fn test_injector_skips_marked_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = BuildConfig::new("Game", tmp.path(), "Default", tmp.path());
        let generated = tmp.path().join("gml_GlobalScript_scr_a.gml.cpp");
        let marked = format!("{INCLUDE_DIRECTIVE}rest of file\n");
        std::fs::write(&generated, &marked).unwrap();

        let injector = Injector::new(config);
        let outcome = injector.inject(&generated).unwrap();
        assert_eq!(outcome, Outcome::AlreadyProcessed);
        assert_eq!(std::fs::read_to_string(&generated).unwrap(), marked);
    }

    #[test]
    fn test_injector_reports_unmapped_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = BuildConfig::new("Game", tmp.path(), "Default", tmp.path());
        let generated = tmp.path().join("gml_Room_rm_main_rm_main.gml.cpp");
        std::fs::write(&generated, "room code\n").unwrap();

        let injector = Injector::new(config);
        assert_eq!(injector.inject(&generated).unwrap(), Outcome::NoMapping);
    }
}
