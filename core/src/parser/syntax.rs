//! # Syntax Parser
//!
//! Recursive-descent parser for the declaration level of C# source.
//!
//! Produces a [`CompilationUnit`] per file. Namespace, type and member
//! declarations are fully parsed; bodies, initializers and expression bodies are
//! skipped with bracket balancing. Any syntax error, or any syntax feature not
//! available in the selected [`LanguageVersion`], aborts with the offending line.

use crate::error::{AppError, AppResult};
use crate::parser::language::{Feature, LanguageVersion};
use crate::parser::lexer::{tokenize, Token, TokenKind};
use crate::parser::models::{
    AttributeArg, AttributeSyntax, AttributeValue, CompilationUnit, DeclKind, Diagnostic,
    MemberDecl, MemberKind, Parameter, TypeDecl, TypeName, UsingDirective, UsingKind,
};

/// Marker found in the header comment of tool-generated files.
pub const GENERATED_MARKER: &str = "<auto-generated";

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "sealed", "partial",
    "readonly", "unsafe", "new", "virtual", "override", "extern", "async", "volatile", "const",
    "fixed", "file", "required", "ref",
];

const TYPE_KEYWORDS: &[&str] = &["class", "interface", "struct", "enum", "record", "delegate"];

type PResult<T> = Result<T, Diagnostic>;

/// Parses one source file.
///
/// # Arguments
/// * `file` - Logical file name, reported in diagnostics.
/// * `source` - C# source text.
/// * `version` - Language version the text must conform to.
///
/// # Examples
/// ```
/// use modelsbuilder_core::parser::{parse_unit, LanguageVersion};
///
/// let unit = parse_unit("Page.cs", "namespace N { public partial class Page { } }", LanguageVersion::default()).unwrap();
/// assert_eq!(unit.types[0].full_name(), "N.Page");
/// ```
pub fn parse_unit(
    file: &str,
    source: &str,
    version: LanguageVersion,
) -> AppResult<CompilationUnit> {
    let to_err = |d: Diagnostic| AppError::compilation(file, d.line, d.message);

    let lexed = tokenize(source).map_err(to_err)?;
    let mut parser = SyntaxParser {
        tokens: &lexed.tokens,
        pos: 0,
        version,
        unit: CompilationUnit {
            file: file.to_string(),
            is_generated: lexed.leading_comments.contains(GENERATED_MARKER),
            usings: Vec::new(),
            assembly_attributes: Vec::new(),
            types: Vec::new(),
        },
    };

    parser.check_token_features().map_err(to_err)?;
    parser.parse_namespace_members("", &[], false).map_err(to_err)?;
    Ok(parser.unit)
}

struct SyntaxParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    version: LanguageVersion,
    unit: CompilationUnit,
}

impl<'a> SyntaxParser<'a> {
    // --- Token helpers ---

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(t)
    }

    fn at_punct(&self, p: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(p))
    }

    fn at_punct_at(&self, offset: usize, p: &str) -> bool {
        self.peek_at(offset).is_some_and(|t| t.is_punct(p))
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.peek().and_then(Token::keyword) == Some(kw)
    }

    fn at_keyword_at(&self, offset: usize, kw: &str) -> bool {
        self.peek_at(offset).and_then(Token::keyword) == Some(kw)
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.line(), message)
    }

    fn expect_punct(&mut self, p: &'static str) -> PResult<()> {
        if self.at_punct(p) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(expected_message(p)))
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, usize)> {
        match self.peek() {
            Some(t) => match t.ident() {
                Some(text) => {
                    self.pos += 1;
                    Ok((text.to_string(), t.line))
                }
                None => Err(self.error("CS1001: Identifier expected")),
            },
            None => Err(self.error("CS1001: Identifier expected")),
        }
    }

    fn require(&self, feature: Feature, line: usize) -> PResult<()> {
        if self.version.supports(feature) {
            Ok(())
        } else {
            Err(Diagnostic::new(line, feature.unavailable_message(self.version)))
        }
    }

    /// Feature checks that only need the token stream.
    fn check_token_features(&self) -> PResult<()> {
        for (i, tok) in self.tokens.iter().enumerate() {
            match &tok.kind {
                TokenKind::Str {
                    interpolated, raw, ..
                } => {
                    if *raw {
                        self.require(Feature::RawStringLiterals, tok.line)?;
                    }
                    if *interpolated {
                        self.require(Feature::InterpolatedStrings, tok.line)?;
                    }
                }
                TokenKind::Punct("?.") => self.require(Feature::NullPropagatingOperator, tok.line)?,
                TokenKind::Ident {
                    text,
                    verbatim: false,
                } if text == "default" => {
                    let next = self.tokens.get(i + 1);
                    let is_literal = !next.is_some_and(|n| n.is_punct("(") || n.is_punct(":"));
                    if is_literal {
                        self.require(Feature::DefaultLiteral, tok.line)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    // --- Namespaces ---

    fn parse_namespace_members(
        &mut self,
        namespace: &str,
        outer_usings: &[UsingDirective],
        closing: bool,
    ) -> PResult<()> {
        let mut namespace = namespace.to_string();
        let mut scope: Vec<UsingDirective> = outer_usings.to_vec();

        loop {
            let Some(tok) = self.peek() else {
                if closing {
                    return Err(self.error("CS1513: } expected"));
                }
                return Ok(());
            };

            if closing && tok.is_punct("}") {
                self.pos += 1;
                if self.at_punct(";") {
                    self.pos += 1;
                }
                return Ok(());
            }

            if self.at_keyword("extern") && self.at_keyword_at(1, "alias") {
                self.skip_to_semicolon()?;
                continue;
            }

            if self.at_keyword("using") || (self.at_keyword("global") && self.at_keyword_at(1, "using")) {
                let directive = self.parse_using()?;
                if namespace.is_empty() {
                    self.unit.usings.push(directive.clone());
                }
                scope.push(directive);
                continue;
            }

            if self.at_punct("[")
                && (self.at_keyword_at(1, "assembly") || self.at_keyword_at(1, "module"))
                && self.at_punct_at(2, ":")
            {
                let attrs = self.parse_attribute_section()?;
                self.unit.assembly_attributes.extend(attrs);
                continue;
            }

            if self.at_keyword("namespace") {
                let ns_line = tok.line;
                self.pos += 1;
                let name = self.parse_type()?;
                let full = join_namespace(&namespace, &name.path.join("."));
                if self.at_punct(";") {
                    self.require(Feature::FileScopedNamespace, ns_line)?;
                    self.pos += 1;
                    namespace = full;
                    continue;
                }
                self.expect_punct("{")?;
                self.parse_namespace_members(&full, &scope, true)?;
                continue;
            }

            if self.at_punct(";") {
                self.pos += 1;
                continue;
            }

            let attrs = self.parse_attribute_sections()?;
            let mods = self.parse_modifiers();
            if !self.at_type_keyword() {
                return Err(self.error(
                    "CS0116: A namespace cannot directly contain members such as fields, methods or statements",
                ));
            }
            self.parse_type_declaration(attrs, mods, &namespace, &[], &scope)?;
        }
    }

    fn parse_using(&mut self) -> PResult<UsingDirective> {
        let line = self.line();
        if self.at_keyword("global") {
            self.require(Feature::GlobalUsing, line)?;
            self.pos += 1;
        }
        self.pos += 1; // using

        let directive = if self.at_keyword("static") {
            self.require(Feature::UsingStatic, line)?;
            self.pos += 1;
            UsingDirective {
                kind: UsingKind::Static,
                target: self.parse_type()?,
            }
        } else if self.peek().and_then(Token::ident).is_some() && self.at_punct_at(1, "=") {
            let (alias, _) = self.expect_ident()?;
            self.pos += 1;
            UsingDirective {
                kind: UsingKind::Alias(alias),
                target: self.parse_type()?,
            }
        } else {
            UsingDirective {
                kind: UsingKind::Namespace,
                target: self.parse_type()?,
            }
        };
        self.expect_punct(";")?;
        Ok(directive)
    }

    // --- Attributes & modifiers ---

    fn parse_attribute_sections(&mut self) -> PResult<Vec<AttributeSyntax>> {
        let mut attrs = Vec::new();
        while self.at_punct("[") {
            attrs.extend(self.parse_attribute_section()?);
        }
        Ok(attrs)
    }

    fn parse_attribute_section(&mut self) -> PResult<Vec<AttributeSyntax>> {
        self.expect_punct("[")?;
        // Optional target specifier, e.g. `assembly:` or `return:`
        if self.peek().and_then(Token::ident).is_some() && self.at_punct_at(1, ":") && !self.at_punct_at(1, "::") {
            self.pos += 2;
        }

        let mut attrs = Vec::new();
        loop {
            let line = self.line();
            let name = self.parse_type()?;
            let args = if self.at_punct("(") {
                self.parse_attribute_args()?
            } else {
                Vec::new()
            };
            attrs.push(AttributeSyntax { name, args, line });

            if self.at_punct(",") {
                self.pos += 1;
                if self.at_punct("]") {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect_punct("]")?;
        Ok(attrs)
    }

    fn parse_attribute_args(&mut self) -> PResult<Vec<AttributeArg>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if self.at_punct(")") {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            let name = if self.peek().and_then(Token::ident).is_some()
                && (self.at_punct_at(1, "=") || self.at_punct_at(1, ":"))
            {
                let (n, _) = self.expect_ident()?;
                self.pos += 1;
                Some(n)
            } else {
                None
            };
            let value = self.parse_attribute_value()?;
            args.push(AttributeArg { name, value });

            if self.at_punct(",") {
                self.pos += 1;
                continue;
            }
            self.expect_punct(")")?;
            return Ok(args);
        }
    }

    fn parse_attribute_value(&mut self) -> PResult<AttributeValue> {
        let ends_arg = |p: &Self, offset: usize| p.at_punct_at(offset, ",") || p.at_punct_at(offset, ")");

        if let Some(Token {
            kind:
                TokenKind::Str {
                    value,
                    interpolated: false,
                    ..
                },
            ..
        }) = self.peek()
        {
            if ends_arg(self, 1) {
                self.pos += 1;
                return Ok(AttributeValue::Str(value.clone()));
            }
        }

        if self.at_keyword("typeof") && self.at_punct_at(1, "(") {
            self.pos += 2;
            let ty = self.parse_type()?;
            self.expect_punct(")")?;
            if ends_arg(self, 0) {
                return Ok(AttributeValue::TypeOf(ty));
            }
        }

        if self.at_keyword("nameof") && self.at_punct_at(1, "(") {
            self.pos += 2;
            let target = self.parse_type()?;
            self.expect_punct(")")?;
            if ends_arg(self, 0) {
                return Ok(AttributeValue::Str(target.simple_name().to_string()));
            }
        }

        let start = self.pos;
        self.skip_expression(true)?;
        Ok(AttributeValue::Expr(render(&self.tokens[start..self.pos])))
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut mods = Vec::new();
        while let Some(kw) = self.peek().and_then(Token::keyword) {
            if !MODIFIERS.contains(&kw) {
                break;
            }
            // `partial` / `async` / `file` used as a type or member name
            if matches!(kw, "partial" | "async" | "file" | "required")
                && self.peek_at(1).is_some_and(|t| t.is_punct("(") || t.is_punct("=") || t.is_punct(";"))
            {
                break;
            }
            mods.push(kw.to_string());
            self.pos += 1;
        }
        mods
    }

    fn at_type_keyword(&self) -> bool {
        self.peek()
            .and_then(Token::keyword)
            .is_some_and(|kw| TYPE_KEYWORDS.contains(&kw))
    }

    // --- Types ---

    /// Parses a type reference: qualified names, generics, tuples, arrays, nullables, pointers.
    fn parse_type(&mut self) -> PResult<TypeName> {
        let start = self.pos;
        let mut path = Vec::new();
        let mut arity = 0;
        let mut global = false;

        if self.at_punct("(") {
            self.skip_balanced()?;
            path.push("ValueTuple".to_string());
        } else {
            if self.at_keyword("global") && self.at_punct_at(1, "::") {
                global = true;
                self.pos += 2;
            }
            loop {
                let (segment, _) = self.expect_ident()?;
                path.push(segment);
                arity = 0;
                if self.at_punct("<") {
                    arity = self.parse_type_arguments()?;
                }
                let continues = (self.at_punct(".") || self.at_punct("::"))
                    && self.peek_at(1).and_then(Token::ident).is_some();
                if continues {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }

        // Suffixes
        loop {
            if self.at_punct("?") {
                self.pos += 1;
            } else if self.at_punct("*") {
                self.pos += 1;
            } else if self.at_punct("[") && (self.at_punct_at(1, "]") || self.at_punct_at(1, ",")) {
                self.pos += 1;
                while self.at_punct(",") {
                    self.pos += 1;
                }
                self.expect_punct("]")?;
            } else {
                break;
            }
        }

        Ok(TypeName {
            text: render(&self.tokens[start..self.pos]),
            path,
            arity,
            global,
        })
    }

    /// Parses `<A, B<C>>` (or an unbound `<,>`), returning the arity.
    fn parse_type_arguments(&mut self) -> PResult<usize> {
        self.expect_punct("<")?;
        let mut arity = 1;
        loop {
            if self.at_punct(",") {
                self.pos += 1;
                arity += 1;
                continue;
            }
            if self.at_punct(">") {
                self.pos += 1;
                return Ok(arity);
            }
            // Variance / attributes on type parameters
            if self.at_keyword("in") || self.at_keyword("out") {
                self.pos += 1;
            }
            if self.at_punct("[") {
                self.parse_attribute_section()?;
            }
            self.parse_type()?;
            if !self.at_punct(",") && !self.at_punct(">") {
                return Err(self.error("CS1003: Syntax error, '>' expected"));
            }
        }
    }

    // --- Type declarations ---

    fn parse_type_declaration(
        &mut self,
        attributes: Vec<AttributeSyntax>,
        modifiers: Vec<String>,
        namespace: &str,
        containing: &[String],
        usings: &[UsingDirective],
    ) -> PResult<()> {
        let kw_line = self.line();
        let keyword = self
            .bump()
            .and_then(Token::keyword)
            .ok_or_else(|| self.error("CS1001: Identifier expected"))?;

        let kind = match keyword {
            "class" => DeclKind::Class,
            "interface" => DeclKind::Interface,
            "struct" => DeclKind::Struct,
            "enum" => DeclKind::Enum,
            "record" => {
                self.require(Feature::Records, kw_line)?;
                if self.at_keyword("class") || self.at_keyword("struct") {
                    self.pos += 1;
                }
                DeclKind::Record
            }
            "delegate" => return self.parse_delegate(attributes, modifiers, namespace, containing, usings),
            other => return Err(self.error(format!("CS1519: Invalid token '{}'", other))),
        };

        let (name, line) = self.expect_ident()?;
        let arity = if self.at_punct("<") {
            self.parse_type_arguments()?
        } else {
            0
        };

        if kind == DeclKind::Record && self.at_punct("(") {
            self.skip_balanced()?;
        }

        let mut base_list = Vec::new();
        if self.at_punct(":") {
            self.pos += 1;
            loop {
                base_list.push(self.parse_type()?);
                if kind == DeclKind::Record && self.at_punct("(") {
                    self.skip_balanced()?;
                }
                if self.at_punct(",") {
                    self.pos += 1;
                    continue;
                }
                break;
            }
        }

        while self.at_keyword("where") {
            while !self.at_punct("{") && !self.at_punct(";") {
                if self.bump().is_none() {
                    return Err(self.error("CS1514: { expected"));
                }
            }
        }

        let index = self.unit.types.len();
        self.unit.types.push(TypeDecl {
            kind,
            name: name.clone(),
            arity,
            namespace: namespace.to_string(),
            containing: containing.to_vec(),
            modifiers,
            attributes,
            base_list,
            members: Vec::new(),
            usings: usings.to_vec(),
            line,
        });

        if kind == DeclKind::Enum {
            if !self.at_punct("{") {
                return Err(self.error("CS1514: { expected"));
            }
            self.skip_balanced()?;
        } else if self.at_punct(";") && kind == DeclKind::Record {
            self.pos += 1;
            return Ok(());
        } else {
            let mut inner = containing.to_vec();
            inner.push(name.clone());
            let members = self.parse_type_body(&name, namespace, &inner, usings)?;
            self.unit.types[index].members = members;
        }

        if self.at_punct(";") {
            self.pos += 1;
        }
        Ok(())
    }

    fn parse_delegate(
        &mut self,
        attributes: Vec<AttributeSyntax>,
        modifiers: Vec<String>,
        namespace: &str,
        containing: &[String],
        usings: &[UsingDirective],
    ) -> PResult<()> {
        self.parse_type()?;
        let (name, line) = self.expect_ident()?;
        let arity = if self.at_punct("<") {
            self.parse_type_arguments()?
        } else {
            0
        };
        self.parse_parameters()?;
        self.skip_to_semicolon()?;
        self.unit.types.push(TypeDecl {
            kind: DeclKind::Delegate,
            name,
            arity,
            namespace: namespace.to_string(),
            containing: containing.to_vec(),
            modifiers,
            attributes,
            base_list: Vec::new(),
            members: Vec::new(),
            usings: usings.to_vec(),
            line,
        });
        Ok(())
    }

    fn parse_type_body(
        &mut self,
        type_name: &str,
        namespace: &str,
        containing: &[String],
        usings: &[UsingDirective],
    ) -> PResult<Vec<MemberDecl>> {
        self.expect_punct("{")?;
        let mut members = Vec::new();

        loop {
            if self.peek().is_none() {
                return Err(self.error("CS1513: } expected"));
            }
            if self.at_punct("}") {
                self.pos += 1;
                return Ok(members);
            }
            if self.at_punct(";") {
                self.pos += 1;
                continue;
            }

            let attributes = self.parse_attribute_sections()?;
            let modifiers = self.parse_modifiers();

            if self.at_type_keyword() {
                self.parse_type_declaration(attributes, modifiers, namespace, containing, usings)?;
                continue;
            }

            let line = self.line();
            let member = |name: String, kind: MemberKind, attributes, modifiers| MemberDecl {
                name,
                kind,
                attributes,
                modifiers,
                line,
            };

            if self.at_keyword("event") {
                self.pos += 1;
                self.parse_type()?;
                let (name, _) = self.expect_ident()?;
                if self.at_punct("{") {
                    self.skip_balanced()?;
                } else {
                    self.skip_to_semicolon()?;
                }
                members.push(member(name, MemberKind::Event, attributes, modifiers));
                continue;
            }

            if self.at_keyword("implicit") || self.at_keyword("explicit") {
                self.pos += 1;
                self.skip_operator_declaration()?;
                members.push(member("operator".into(), MemberKind::Operator, attributes, modifiers));
                continue;
            }

            if self.at_punct("~") {
                self.pos += 1;
                let (name, _) = self.expect_ident()?;
                self.parse_parameters()?;
                self.parse_body(Feature::ExpressionBodiedConstructor)?;
                members.push(member(name, MemberKind::Destructor, attributes, modifiers));
                continue;
            }

            // Constructor
            if self.peek().and_then(Token::ident) == Some(type_name) && self.at_punct_at(1, "(") {
                self.pos += 1;
                let parameters = self.parse_parameters()?;
                if self.at_punct(":") {
                    self.pos += 1;
                    if !(self.at_keyword("base") || self.at_keyword("this")) {
                        return Err(self.error("CS1018: Keyword 'this' or 'base' expected"));
                    }
                    self.pos += 1;
                    if !self.at_punct("(") {
                        return Err(self.error(expected_message("(")));
                    }
                    self.skip_balanced()?;
                }
                self.parse_body(Feature::ExpressionBodiedConstructor)?;
                members.push(member(
                    type_name.to_string(),
                    MemberKind::Constructor { parameters },
                    attributes,
                    modifiers,
                ));
                continue;
            }

            let starts_type = self.at_punct("(") || self.peek().and_then(Token::ident).is_some();
            if !starts_type {
                let tok = self.peek().map(Token::describe).unwrap_or_default();
                return Err(self.error(format!(
                    "CS1519: Invalid token '{}' in class, record, struct, or interface member declaration",
                    tok
                )));
            }
            let ty = self.parse_type()?;

            if self.at_keyword("operator") {
                self.skip_operator_declaration()?;
                members.push(member("operator".into(), MemberKind::Operator, attributes, modifiers));
                continue;
            }

            if self.at_keyword("this") && self.at_punct_at(1, "[") {
                self.pos += 1;
                self.skip_balanced()?;
                self.parse_property_body()?;
                members.push(member("this".into(), MemberKind::Indexer, attributes, modifiers));
                continue;
            }

            let name = self.parse_member_name()?;
            if self.at_punct("<") {
                self.parse_type_arguments()?;
            }

            if self.at_punct("(") {
                let parameters = self.parse_parameters()?;
                while self.at_keyword("where") {
                    while !self.at_punct("{") && !self.at_punct(";") && !self.at_punct("=>") {
                        if self.bump().is_none() {
                            return Err(self.error("CS1002: ; expected"));
                        }
                    }
                }
                self.parse_body(Feature::ExpressionBodiedMethod)?;
                members.push(member(
                    name,
                    MemberKind::Method { ty, parameters },
                    attributes,
                    modifiers,
                ));
                continue;
            }

            if self.at_punct("{") || self.at_punct("=>") {
                self.parse_property_body()?;
                members.push(member(name, MemberKind::Property { ty }, attributes, modifiers));
                continue;
            }

            if self.at_punct("=") || self.at_punct(",") || self.at_punct(";") || self.at_punct("[") {
                // Fixed-size buffers: `fixed byte buf[16];`
                if self.at_punct("[") {
                    self.skip_balanced()?;
                }
                members.push(member(
                    name,
                    MemberKind::Field { ty: ty.clone() },
                    attributes.clone(),
                    modifiers.clone(),
                ));
                loop {
                    if self.at_punct("=") {
                        self.pos += 1;
                        self.skip_expression(true)?;
                    }
                    if self.at_punct(",") {
                        self.pos += 1;
                        let (next, _) = self.expect_ident()?;
                        members.push(member(
                            next,
                            MemberKind::Field { ty: ty.clone() },
                            attributes.clone(),
                            modifiers.clone(),
                        ));
                        continue;
                    }
                    break;
                }
                self.expect_punct(";")?;
                continue;
            }

            return Err(self.error("CS1002: ; expected"));
        }
    }

    /// Parses a member name, including explicit interface qualifiers (`IFoo.Bar`).
    fn parse_member_name(&mut self) -> PResult<String> {
        let (mut name, _) = self.expect_ident()?;
        loop {
            if self.at_punct("<") && self.at_punct_at(1, ">") {
                break;
            }
            if (self.at_punct(".") || self.at_punct("::")) && self.peek_at(1).and_then(Token::ident).is_some() {
                self.pos += 1;
                let (next, _) = self.expect_ident()?;
                name = next;
                continue;
            }
            // Generic interface qualifier: `IFoo<T>.Bar`
            if self.at_punct("<") {
                let save = self.pos;
                if self.parse_type_arguments().is_ok() && self.at_punct(".") {
                    continue;
                }
                self.pos = save;
            }
            break;
        }
        Ok(name)
    }

    fn parse_parameters(&mut self) -> PResult<Vec<Parameter>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        if self.at_punct(")") {
            self.pos += 1;
            return Ok(params);
        }
        loop {
            self.parse_attribute_sections()?;
            let mut modifiers = Vec::new();
            while let Some(kw) = self.peek().and_then(Token::keyword) {
                if matches!(kw, "this" | "ref" | "out" | "in" | "params" | "scoped" | "readonly") {
                    modifiers.push(kw.to_string());
                    self.pos += 1;
                } else {
                    break;
                }
            }
            // `__arglist`
            if self.at_keyword("__arglist") {
                self.pos += 1;
            } else {
                let ty = self.parse_type()?;
                let (name, _) = self.expect_ident()?;
                if self.at_punct("=") {
                    self.pos += 1;
                    self.skip_expression(true)?;
                }
                params.push(Parameter {
                    ty,
                    name,
                    modifiers,
                });
            }
            if self.at_punct(",") {
                self.pos += 1;
                continue;
            }
            self.expect_punct(")")?;
            return Ok(params);
        }
    }

    /// `{ ... }`, `=> expr;` or `;`.
    fn parse_body(&mut self, expression_feature: Feature) -> PResult<()> {
        if self.at_punct("{") {
            return self.skip_balanced();
        }
        if self.at_punct("=>") {
            self.require(expression_feature, self.line())?;
            self.pos += 1;
            self.skip_expression(false)?;
            return self.expect_punct(";");
        }
        self.expect_punct(";")
    }

    /// Accessor list (with optional initializer) or expression body.
    fn parse_property_body(&mut self) -> PResult<()> {
        if self.at_punct("=>") {
            self.require(Feature::ExpressionBodiedProperty, self.line())?;
            self.pos += 1;
            self.skip_expression(false)?;
            return self.expect_punct(";");
        }

        self.expect_punct("{")?;
        loop {
            if self.peek().is_none() {
                return Err(self.error("CS1513: } expected"));
            }
            if self.at_punct("}") {
                self.pos += 1;
                break;
            }
            self.parse_attribute_sections()?;
            while self
                .peek()
                .and_then(Token::keyword)
                .is_some_and(|kw| matches!(kw, "private" | "protected" | "internal" | "readonly"))
            {
                self.pos += 1;
            }
            let line = self.line();
            match self.peek().and_then(Token::keyword) {
                Some("get" | "set" | "add" | "remove") => {}
                Some("init") => self.require(Feature::InitOnlySetters, line)?,
                _ => return Err(self.error("CS1014: A get or set accessor expected")),
            }
            self.pos += 1;
            self.parse_body(Feature::ExpressionBodiedAccessor)?;
        }

        if self.at_punct("=") {
            self.require(Feature::AutoPropertyInitializer, self.line())?;
            self.pos += 1;
            self.skip_expression(false)?;
            self.expect_punct(";")?;
        }
        Ok(())
    }

    fn skip_operator_declaration(&mut self) -> PResult<()> {
        // `operator +(...)`, `operator int(...)`, `operator checked +(...)`
        while !self.at_punct("(") {
            if self.bump().is_none() {
                return Err(self.error(expected_message("(")));
            }
        }
        self.parse_parameters()?;
        self.parse_body(Feature::ExpressionBodiedMethod)
    }

    // --- Skipping ---

    /// Skips a bracketed group starting at the current `(`, `[` or `{`,
    /// checking that nested brackets pair up.
    fn skip_balanced(&mut self) -> PResult<()> {
        let mut stack: Vec<&'static str> = Vec::new();
        loop {
            let Some(tok) = self.bump() else {
                let missing = stack.last().copied().unwrap_or("}");
                return Err(self.error(expected_message(missing)));
            };
            match &tok.kind {
                TokenKind::Punct("(") => stack.push(")"),
                TokenKind::Punct("[") => stack.push("]"),
                TokenKind::Punct("{") => stack.push("}"),
                TokenKind::Punct(p @ (")" | "]" | "}")) => {
                    match stack.pop() {
                        Some(expected) if expected == *p => {}
                        Some(expected) => {
                            return Err(Diagnostic::new(tok.line, expected_message(expected)))
                        }
                        None => {
                            return Err(Diagnostic::new(
                                tok.line,
                                format!("CS1513: Unexpected '{}'", p),
                            ))
                        }
                    }
                    if stack.is_empty() {
                        return Ok(());
                    }
                }
                _ => {
                    if stack.is_empty() {
                        return Err(Diagnostic::new(tok.line, expected_message("{")));
                    }
                }
            }
        }
    }

    /// Skips an expression up to (not including) `;`, or `,`/`)` when
    /// `stop_at_comma` is set, honouring bracket nesting.
    fn skip_expression(&mut self, stop_at_comma: bool) -> PResult<()> {
        let start = self.pos;
        loop {
            let Some(tok) = self.peek() else {
                return Err(self.error("CS1002: ; expected"));
            };
            match &tok.kind {
                TokenKind::Punct("(" | "[" | "{") => self.skip_balanced()?,
                TokenKind::Punct(";") => break,
                TokenKind::Punct("," | ")" | "]") if stop_at_comma => break,
                TokenKind::Punct(")" | "]" | "}") => break,
                _ => self.pos += 1,
            }
        }
        if self.pos == start {
            return Err(self.error("CS1525: Invalid expression term"));
        }
        Ok(())
    }

    fn skip_to_semicolon(&mut self) -> PResult<()> {
        loop {
            match self.peek() {
                None => return Err(self.error("CS1002: ; expected")),
                Some(t) if t.is_punct(";") => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(t) if t.is_punct("(") || t.is_punct("{") || t.is_punct("[") => {
                    self.skip_balanced()?
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}

fn expected_message(p: &str) -> String {
    match p {
        ";" => "CS1002: ; expected".to_string(),
        ")" => "CS1026: ) expected".to_string(),
        "{" => "CS1514: { expected".to_string(),
        "}" => "CS1513: } expected".to_string(),
        "]" => "CS1003: Syntax error, ']' expected".to_string(),
        other => format!("CS1003: Syntax error, '{}' expected", other),
    }
}

fn join_namespace(outer: &str, inner: &str) -> String {
    if outer.is_empty() {
        inner.to_string()
    } else {
        format!("{}.{}", outer, inner)
    }
}

/// Renders tokens back to compact text, keeping a space between adjacent words.
fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev_word = false;
    for t in tokens {
        let (text, word) = match &t.kind {
            TokenKind::Ident { text, .. } => (text.clone(), true),
            TokenKind::Number(n) => (n.clone(), true),
            TokenKind::Str { value, .. } => (format!("{:?}", value), false),
            TokenKind::Char(c) => (format!("'{}'", c), false),
            TokenKind::Punct(p) => ((*p).to_string(), false),
        };
        if word && prev_word {
            out.push(' ');
        }
        out.push_str(&text);
        prev_word = word;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> CompilationUnit {
        parse_unit("Test.cs", src, LanguageVersion::LATEST).unwrap()
    }

    fn parse_err(src: &str, version: LanguageVersion) -> AppError {
        parse_unit("Test.cs", src, version).unwrap_err()
    }

    #[test]
    fn test_namespaces_usings_and_nesting() {
        let unit = parse(
            r#"
            using System;
            using Xml = System.Xml;
            namespace Outer
            {
                using Umbraco.Web;
                namespace Inner
                {
                    public partial class Page : PublishedContentModel, ISeo
                    {
                        public class Nested { }
                    }
                }
            }
            "#,
        );
        assert_eq!(unit.usings.len(), 2);
        assert!(matches!(unit.usings[1].kind, UsingKind::Alias(ref a) if a == "Xml"));

        let page = unit.types.iter().find(|t| t.name == "Page").unwrap();
        assert_eq!(page.full_name(), "Outer.Inner.Page");
        assert_eq!(page.usings.len(), 3);
        assert!(page.is_partial());
        assert_eq!(page.base_list.len(), 2);
        assert_eq!(page.base_list[1].simple_name(), "ISeo");

        let nested = unit.types.iter().find(|t| t.name == "Nested").unwrap();
        assert_eq!(nested.full_name(), "Outer.Inner.Page.Nested");
    }

    #[test]
    fn test_members() {
        let unit = parse(
            r#"
            public partial class Page
            {
                private readonly string _a = "x", _b;
                public Page(IPublishedContent content) : base(content) { }
                [ImplementPropertyType("title")]
                public string Title { get { return "t"; } }
                public IEnumerable<string> Tags => new[] { "a" };
                public T Get<T>(string alias) where T : class => default(T);
                public event EventHandler Changed;
                public int this[int i] { get { return i; } }
                public static Page operator +(Page a, Page b) => a;
                ~Page() { }
            }
            "#,
        );
        let page = &unit.types[0];
        let names: Vec<_> = page.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["_a", "_b", "Page", "Title", "Tags", "Get", "Changed", "this", "operator", "Page"]
        );
        match &page.members[2].kind {
            MemberKind::Constructor { parameters } => {
                assert_eq!(parameters[0].ty.simple_name(), "IPublishedContent")
            }
            other => panic!("expected ctor, got {:?}", other),
        }
        let title = &page.members[3];
        assert!(title.attributes[0].is("ImplementPropertyType"));
        assert_eq!(title.attributes[0].args[0].value.as_str(), Some("title"));
        assert!(matches!(page.members[9].kind, MemberKind::Destructor));
    }

    #[test]
    fn test_assembly_attributes() {
        let unit = parse(
            r#"
            using Umbraco.ModelsBuilder;
            [assembly: IgnoreContentType("legacy*")]
            [assembly: ModelsBaseClass(typeof(My.Base)), ModelsNamespace(nameof(Models))]
            namespace Models { }
            "#,
        );
        assert_eq!(unit.assembly_attributes.len(), 3);
        assert_eq!(
            unit.assembly_attributes[0].args[0].value,
            AttributeValue::Str("legacy*".into())
        );
        match &unit.assembly_attributes[1].args[0].value {
            AttributeValue::TypeOf(t) => assert_eq!(t.text, "My.Base"),
            other => panic!("expected typeof, got {:?}", other),
        }
        assert_eq!(unit.assembly_attributes[2].args[0].value.as_str(), Some("Models"));
    }

    #[test]
    fn test_generated_header_detected() {
        let unit = parse("//----\n// <auto-generated>\n// </auto-generated>\n//----\nclass A { }");
        assert!(unit.is_generated);
        assert!(!parse("// hand written\nclass A { }").is_generated);
    }

    #[test]
    fn test_expression_bodied_property_gated() {
        let src = "class A\n{\n    public string Name\n        => \"x\";\n}\n";
        let err = parse_err(src, LanguageVersion::CSHARP5);
        match err {
            AppError::Compilation { file, line, message } => {
                assert_eq!(file, "Test.cs");
                assert_eq!(line, 4);
                assert!(message.contains("expression-bodied property"));
            }
            other => panic!("expected compilation error, got {:?}", other),
        }
        assert!(parse_unit("Test.cs", src, LanguageVersion::CSHARP6).is_ok());
    }

    #[test]
    fn test_other_feature_gates() {
        let v5 = LanguageVersion::CSHARP5;
        assert!(parse_err("class A { string s = $\"{1}\"; }", v5).is_compilation());
        assert!(parse_err("class A { int X { get => 1; } }", LanguageVersion::CSHARP6).is_compilation());
        assert!(parse_err("namespace N;\nclass A { }", LanguageVersion::CSHARP7_3).is_compilation());
        assert!(parse_err("record R(int X);", LanguageVersion::CSHARP7_3).is_compilation());
        assert!(parse_unit("T.cs", "namespace N;\nrecord R(int X);", LanguageVersion::LATEST).is_ok());
    }

    #[test]
    fn test_syntax_errors_report_line() {
        let err = parse_err("class A\n{\n    public string X { get; }\n    public int Y\n}\n", LanguageVersion::LATEST);
        assert!(matches!(err, AppError::Compilation { line: 5, .. }), "{:?}", err);

        let err = parse_err("class A\n{\n    void M() { Call(; }\n}", LanguageVersion::LATEST);
        assert!(matches!(err, AppError::Compilation { line: 3, .. }), "{:?}", err);

        let err = parse_err("class A\n{\n", LanguageVersion::LATEST);
        assert!(err.to_string().contains("} expected"));
    }

    #[test]
    fn test_warnings_like_constructs_are_accepted() {
        // unused usings, pragmas and regions are not errors
        let unit = parse(
            "using System.Unused;\n#region r\n#pragma warning disable 0109\nclass A { }\n#endregion\n",
        );
        assert_eq!(unit.types.len(), 1);
    }
}
