//! Scope tree for GML source files.
//!
//! A single left-to-right pass over the token stream builds a tree of
//! entities: functions, anonymous blocks, enums, macros, and annotated
//! locals. The tree is an arena owned by [`ScopeTree`]; entities refer to
//! each other by [`EntityId`], and the parent link is an index, never an
//! owning pointer, so the tree is acyclic by construction.
//!
//! Only two annotations carry meaning for injection:
//! - `/*cpp ... */` inside a scope accumulates native code on that scope.
//! - `var name /*: type */` records a typed local.
//! Every other token is discarded.

use super::cursor::TokenCursor;
use super::error::ParseError;
use super::lexer::{Token, TokenKind};

/// Index of an entity in its [`ScopeTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

impl EntityId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The flavor of a composite scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Anonymous `{ ... }` block
    Block,
    /// Root of a global-script file
    Script,
    /// Root of a per-object event file
    Object,
    /// Named or anonymous function
    Function,
    /// Function declared with the `constructor` marker
    Constructor,
    /// `enum Name { ... }`
    Enum,
}

impl ScopeKind {
    /// Callable functions get the generated prologue/epilogue; constructors
    /// are functions everywhere it matters.
    pub fn is_function(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::Constructor)
    }

    /// Whether a scope of this kind claims one of the compiler's
    /// anonymous symbols during injection.
    pub fn claims_symbol(self) -> bool {
        matches!(
            self,
            ScopeKind::Function | ScopeKind::Constructor | ScopeKind::Object
        )
    }
}

/// Payload of one tree node; a closed set.
#[derive(Debug, Clone)]
pub enum EntityData {
    /// `#macro NAME ...` leaf marker
    Macro,
    /// Enum member leaf marker
    Member,
    /// Local with an optional declared native type
    Variable { declared_type: Option<String> },
    /// Composite scope owning children in source order
    Scope {
        kind: ScopeKind,
        children: Vec<EntityId>,
        native_code: String,
    },
}

/// One named tree node.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: Option<String>,
    /// Back-reference for upward lookup only; `None` for the root.
    pub parent: Option<EntityId>,
    pub data: EntityData,
}

/// Arena-owned scope tree with a single root.
#[derive(Debug)]
pub struct ScopeTree {
    entities: Vec<Entity>,
    root: EntityId,
}

impl ScopeTree {
    fn new(root_kind: ScopeKind, root_name: impl Into<String>) -> Self {
        let root = Entity {
            name: Some(root_name.into()),
            parent: None,
            data: EntityData::Scope {
                kind: root_kind,
                children: Vec::new(),
                native_code: String::new(),
            },
        };
        Self {
            entities: vec![root],
            root: EntityId(0),
        }
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entity(id).parent
    }

    /// Children of a scope, empty for leaves.
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        match &self.entity(id).data {
            EntityData::Scope { children, .. } => children,
            _ => &[],
        }
    }

    /// Scope kind, `None` for leaves.
    pub fn scope_kind(&self, id: EntityId) -> Option<ScopeKind> {
        match &self.entity(id).data {
            EntityData::Scope { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Accumulated `/*cpp*/` text of a scope, empty if none.
    pub fn native_code(&self, id: EntityId) -> &str {
        match &self.entity(id).data {
            EntityData::Scope { native_code, .. } => native_code,
            _ => "",
        }
    }

    /// Number of parent links between `id` and the root.
    pub fn depth(&self, id: EntityId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    fn attach(&mut self, parent: EntityId, name: Option<String>, data: EntityData) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Entity {
            name,
            parent: Some(parent),
            data,
        });
        match &mut self.entities[parent.index()].data {
            EntityData::Scope { children, .. } => children.push(id),
            _ => unreachable!("attach target is always a scope"),
        }
        id
    }

    fn attach_scope(&mut self, parent: EntityId, name: Option<String>, kind: ScopeKind) -> EntityId {
        self.attach(
            parent,
            name,
            EntityData::Scope {
                kind,
                children: Vec::new(),
                native_code: String::new(),
            },
        )
    }

    fn push_native_code(&mut self, id: EntityId, text: &str) {
        if let EntityData::Scope { native_code, .. } = &mut self.entities[id.index()].data {
            native_code.push_str(text);
            native_code.push('\n');
        }
    }
}

/// Marker opening an embedded native-code block: `/*cpp ... */`.
const NATIVE_CODE_MARKER: &str = "/*cpp";
/// Marker opening a type annotation: `/*: type */`.
const TYPE_ANNOTATION_MARKER: &str = "/*:";

/// Build the scope tree for one source file.
///
/// `root_kind` is [`ScopeKind::Script`] or [`ScopeKind::Object`] depending
/// on the generated file's naming convention. Scopes still open when the
/// stream runs out stay nested under the root; a closing brace at the root
/// is fatal.
pub fn build_scope_tree(
    tokens: &[Token<'_>],
    root_kind: ScopeKind,
    root_name: impl Into<String>,
) -> Result<ScopeTree, ParseError> {
    let mut tree = ScopeTree::new(root_kind, root_name);
    let mut cursor = TokenCursor::new(tokens);
    let mut current = tree.root();

    while let Some(token) = cursor.peek() {
        match token.kind {
            TokenKind::Eof => break,

            TokenKind::FunctionKw => {
                current = parse_function_header(&mut cursor, &mut tree, current)?;
            }

            TokenKind::LBrace => {
                cursor.bump();
                current = tree.attach_scope(current, None, ScopeKind::Block);
            }

            TokenKind::RBrace => {
                cursor.bump();
                current = tree
                    .parent(current)
                    .ok_or(ParseError::UnbalancedBrace {
                        offset: u32::from(token.offset) as usize,
                    })?;
            }

            TokenKind::BlockComment if token.text.starts_with(NATIVE_CODE_MARKER) => {
                cursor.bump();
                let interior = &token.text[NATIVE_CODE_MARKER.len()..token.text.len() - 2];
                tree.push_native_code(current, interior.trim());
            }

            TokenKind::VarKw => {
                cursor.bump();
                parse_typed_local(&mut cursor, &mut tree, current);
            }

            TokenKind::Macro => {
                cursor.bump();
                if let Some(name) = cursor.consume_kind(TokenKind::Ident) {
                    tree.attach(current, Some(name.text.to_string()), EntityData::Macro);
                }
            }

            TokenKind::EnumKw => {
                cursor.bump();
                parse_enum(&mut cursor, &mut tree, current);
            }

            _ => {
                cursor.bump();
            }
        }
    }

    Ok(tree)
}

/// `function NAME? ( args ) (: NAME ( args ))? constructor? {`
///
/// Parenthesis balance is a depth counter, so nested call expressions in
/// default arguments are skipped correctly. Returns the new scope, which
/// becomes the current one.
fn parse_function_header(
    cursor: &mut TokenCursor<'_>,
    tree: &mut ScopeTree,
    parent: EntityId,
) -> Result<EntityId, ParseError> {
    cursor.consume_kind(TokenKind::FunctionKw);
    let name = cursor
        .consume_kind(TokenKind::Ident)
        .map(|t| t.text.to_string());

    cursor.consume_kind(TokenKind::LParen);
    skip_balanced_parens(cursor)?;
    cursor.consume_kind(TokenKind::RParen);

    // Super-constructor call: `: Base(args)`
    if cursor.consume_kind(TokenKind::Colon).is_some() {
        cursor.consume_kind(TokenKind::Ident);
        cursor.consume_kind(TokenKind::LParen);
        skip_balanced_parens(cursor)?;
        cursor.consume_kind(TokenKind::RParen);
    }

    let kind = if cursor.consume_kind(TokenKind::ConstructorKw).is_some() {
        ScopeKind::Constructor
    } else {
        ScopeKind::Function
    };

    cursor.consume_kind(TokenKind::LBrace);

    Ok(tree.attach_scope(parent, name, kind))
}

/// Advance to the `)` matching an already-consumed `(`, leaving the cursor
/// on it (depth zero).
fn skip_balanced_parens(cursor: &mut TokenCursor<'_>) -> Result<(), ParseError> {
    let mut depth = 1u32;
    loop {
        let token = cursor.peek().ok_or(ParseError::UnexpectedEof {
            context: "function argument list",
        })?;
        match token.kind {
            TokenKind::Eof => {
                return Err(ParseError::UnexpectedEof {
                    context: "function argument list",
                });
            }
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
        cursor.bump();
    }
}

/// `var NAME /*: TYPE */` - the annotation comment must be the very next
/// non-whitespace token, so comment skipping is off for this lookahead.
fn parse_typed_local(cursor: &mut TokenCursor<'_>, tree: &mut ScopeTree, current: EntityId) {
    let Some(name) = cursor.consume_kind(TokenKind::Ident) else {
        return;
    };
    let Some(comment) = cursor.consume(None, Some(TokenKind::BlockComment), true, false) else {
        return;
    };
    if !comment.text.starts_with(TYPE_ANNOTATION_MARKER) {
        return;
    }
    let declared = comment.text[TYPE_ANNOTATION_MARKER.len()..comment.text.len() - 2]
        .trim()
        .to_string();
    tree.attach(
        current,
        Some(name.text.to_string()),
        EntityData::Variable {
            declared_type: Some(declared),
        },
    );
}

/// `enum NAME { A, B = 1, ... }` - members become leaf children; the whole
/// body is consumed here so the driving loop never sees its braces.
fn parse_enum(cursor: &mut TokenCursor<'_>, tree: &mut ScopeTree, current: EntityId) {
    let name = cursor
        .consume_kind(TokenKind::Ident)
        .map(|t| t.text.to_string());
    if cursor.consume_kind(TokenKind::LBrace).is_none() {
        return;
    }

    let enum_id = tree.attach_scope(current, name, ScopeKind::Enum);
    let mut expect_member = true;
    while let Some(token) = cursor.peek() {
        match token.kind {
            TokenKind::Eof | TokenKind::RBrace => {
                cursor.bump();
                break;
            }
            TokenKind::Comma => {
                expect_member = true;
                cursor.bump();
            }
            TokenKind::Ident if expect_member => {
                tree.attach(enum_id, Some(token.text.to_string()), EntityData::Member);
                expect_member = false;
                cursor.bump();
            }
            _ => {
                cursor.bump();
            }
        }
    }
}
