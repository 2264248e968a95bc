use crate::errors::{RestcError, Result};
use crate::parse::ast::{
    CommentGroup, Field, FuncDecl, GoFile, ImportSpec, InterfaceElem, MethodSpec, Param, TypeExpr,
    TypeSpec,
};
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

const IMPORT_QUERY: &str = "(import_spec) @spec";

/// Parse the module path from go.mod content string.
pub fn parse_go_mod_module(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("module ") {
            let rest = rest.split("//").next().unwrap_or(rest).trim();
            let module = rest.trim_matches('"');
            if module.is_empty() {
                return None;
            }
            return Some(module.to_string());
        }
    }
    None
}

/// Read the module path from the go.mod file in `project_root`.
pub fn read_go_mod(project_root: &Path) -> Result<String> {
    let go_mod_path = project_root.join("go.mod");
    let content = std::fs::read_to_string(&go_mod_path)
        .map_err(|_| RestcError::ModuleNotFound { path: go_mod_path.clone() })?;
    parse_go_mod_module(&content).ok_or(RestcError::ModuleNotFound { path: go_mod_path })
}

/// Tree-sitter backed parser producing the owned [`GoFile`] model.
pub struct GoParser {
    parser: Parser,
    import_query: Query,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| RestcError::Grammar(e.to_string()))?;
        let import_query =
            Query::new(&language, IMPORT_QUERY).map_err(|e| RestcError::Grammar(e.to_string()))?;
        Ok(Self {
            parser,
            import_query,
        })
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<GoFile> {
        let source = std::fs::read(path)?;
        self.parse_source(&source, path)
    }

    /// Parse Go source. Any syntax error in the file is reported as a
    /// [`RestcError::ParseError`].
    pub fn parse_source(&mut self, source: &[u8], path: &Path) -> Result<GoFile> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| RestcError::ParseError {
                file: path.to_path_buf(),
                message: "parser produced no syntax tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let node = first_error(root).unwrap_or(root);
            let pos = node.start_position();
            return Err(RestcError::ParseError {
                file: path.to_path_buf(),
                message: format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1),
            });
        }

        let mut file = GoFile {
            imports: self.extract_imports(root, source),
            ..GoFile::default()
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    if let Some(name) = child.named_child(0) {
                        file.package = text(name, source).to_string();
                    }
                }
                "type_declaration" => collect_type_specs(child, source, &mut file.types),
                "function_declaration" | "method_declaration" => {
                    file.funcs.push(func_decl(child, source));
                }
                _ => {}
            }
        }

        Ok(file)
    }

    fn extract_imports(&self, root: Node, source: &[u8]) -> Vec<ImportSpec> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.import_query, root, source);

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let Some(path_node) = node.child_by_field_name("path") else {
                    continue;
                };
                let path = text(path_node, source)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string();
                if path.is_empty() {
                    continue;
                }
                let name = node
                    .child_by_field_name("name")
                    .map(|n| text(n, source).to_string());
                imports.push(ImportSpec { name, path });
            }
        }

        imports
    }
}

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Collect the comment run ending on the line directly above `node`.
///
/// A comment that trails another node on its own line is not part of the run.
fn doc_comment(node: Node, source: &[u8]) -> Option<CommentGroup> {
    let mut lines = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_named_sibling();

    while let Some(prev) = current {
        if prev.kind() != "comment" || prev.end_position().row + 1 != next_row {
            break;
        }
        let before = prev.prev_named_sibling();
        let trailing = before.is_some_and(|b| {
            b.kind() != "comment" && b.end_position().row == prev.start_position().row
        });
        if trailing {
            break;
        }
        lines.push(text(prev, source).to_string());
        next_row = prev.start_position().row;
        current = before;
    }

    if lines.is_empty() {
        None
    } else {
        lines.reverse();
        Some(CommentGroup::new(lines))
    }
}

fn collect_type_specs(decl: Node, source: &[u8], out: &mut Vec<TypeSpec>) {
    let decl_doc = doc_comment(decl, source);
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };
        out.push(TypeSpec {
            name: text(name, source).to_string(),
            doc: doc_comment(spec, source).or_else(|| decl_doc.clone()),
            ty: type_expr(ty, source),
        });
    }
}

fn func_decl(node: Node, source: &[u8]) -> FuncDecl {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|list| parameters(list, source).into_iter().next())
        .map(|p| p.ty);
    let params = node
        .child_by_field_name("parameters")
        .map(|list| parameters(list, source))
        .unwrap_or_default();

    FuncDecl {
        name,
        doc: doc_comment(node, source),
        receiver,
        params,
    }
}

fn parameters(list: Node, source: &[u8]) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        let Some(ty_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut ty = type_expr(ty_node, source);
        if decl.kind() == "variadic_parameter_declaration" {
            ty = TypeExpr::Slice(Box::new(ty));
        }

        let mut names_cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut names_cursor)
            .map(|n| text(n, source).to_string())
            .collect();

        if names.is_empty() {
            params.push(Param { name: None, ty });
        } else {
            for name in names {
                params.push(Param {
                    name: Some(name),
                    ty: ty.clone(),
                });
            }
        }
    }
    params
}

fn type_expr(node: Node, source: &[u8]) -> TypeExpr {
    let boxed = |child: Option<Node>| {
        Box::new(match child {
            Some(c) => type_expr(c, source),
            None => TypeExpr::Other(String::new()),
        })
    };

    match node.kind() {
        "type_identifier" => TypeExpr::Ident(text(node, source).to_string()),
        "qualified_type" => TypeExpr::Qualified {
            package: node
                .child_by_field_name("package")
                .map(|n| text(n, source).to_string())
                .unwrap_or_default(),
            name: node
                .child_by_field_name("name")
                .map(|n| text(n, source).to_string())
                .unwrap_or_default(),
        },
        "pointer_type" => TypeExpr::Pointer(boxed(node.named_child(0))),
        "slice_type" => TypeExpr::Slice(boxed(node.child_by_field_name("element"))),
        "array_type" | "implicit_length_array_type" => {
            TypeExpr::Array(boxed(node.child_by_field_name("element")))
        }
        "map_type" => TypeExpr::Map {
            key: boxed(node.child_by_field_name("key")),
            value: boxed(node.child_by_field_name("value")),
        },
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => type_expr(inner, source),
            None => TypeExpr::Other(text(node, source).to_string()),
        },
        "struct_type" => TypeExpr::Struct(struct_fields(node, source)),
        "interface_type" => TypeExpr::Interface(interface_elems(node, source)),
        _ => TypeExpr::Other(text(node, source).to_string()),
    }
}

fn struct_fields(node: Node, source: &[u8]) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    let Some(list) = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "field_declaration_list")
    else {
        return fields;
    };

    let mut list_cursor = list.walk();
    for decl in list.named_children(&mut list_cursor) {
        if decl.kind() != "field_declaration" {
            continue;
        }
        let Some(ty_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let ty = type_expr(ty_node, source);
        let tag = decl
            .child_by_field_name("tag")
            .map(|t| unquote_tag(text(t, source)));

        let mut names_cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut names_cursor)
            .map(|n| text(n, source).to_string())
            .collect();

        if names.is_empty() {
            // Embedded field, possibly `*T`.
            let mut token_cursor = decl.walk();
            let is_pointer = decl.children(&mut token_cursor).any(|c| c.kind() == "*");
            let ty = if is_pointer {
                TypeExpr::Pointer(Box::new(ty))
            } else {
                ty
            };
            fields.push(Field {
                name: None,
                ty,
                tag,
            });
        } else {
            for name in names {
                fields.push(Field {
                    name: Some(name),
                    ty: ty.clone(),
                    tag: tag.clone(),
                });
            }
        }
    }
    fields
}

fn unquote_tag(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return inner.to_string();
    }
    if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.replace("\\\"", "\"");
    }
    raw.to_string()
}

fn interface_elems(node: Node, source: &[u8]) -> Vec<InterfaceElem> {
    let mut elems = Vec::new();
    let mut cursor = node.walk();
    for elem in node.named_children(&mut cursor) {
        match elem.kind() {
            "method_elem" | "method_spec" => {
                let Some(name) = elem.child_by_field_name("name") else {
                    continue;
                };
                elems.push(InterfaceElem::Method(MethodSpec {
                    name: text(name, source).to_string(),
                    doc: doc_comment(elem, source),
                    params: elem
                        .child_by_field_name("parameters")
                        .map(|list| parameters(list, source))
                        .unwrap_or_default(),
                }));
            }
            // Unions and `~T` terms have several children or a non-name child.
            "type_elem" | "constraint_elem" => {
                if elem.named_child_count() != 1 {
                    continue;
                }
                if let Some(inner) = elem.named_child(0) {
                    if matches!(inner.kind(), "type_identifier" | "qualified_type") {
                        elems.push(InterfaceElem::Embedded(type_expr(inner, source)));
                    }
                }
            }
            "interface_type_name" => {
                if let Some(inner) = elem.named_child(0) {
                    elems.push(InterfaceElem::Embedded(type_expr(inner, source)));
                }
            }
            "type_identifier" | "qualified_type" => {
                elems.push(InterfaceElem::Embedded(type_expr(elem, source)));
            }
            _ => {}
        }
    }
    elems
}
