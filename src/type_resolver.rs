use crate::descriptor::{FieldDescriptor, FieldTags, Kind, PrimitiveType, TypeDescriptor};
use crate::error::Result;
use crate::source::ParsedFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Type resolver - turns Rust type definitions found in source files into
/// type descriptors
pub struct TypeResolver {
    /// All parsed source files
    parsed_files: Vec<ParsedFile>,
    /// Cache of resolved named types
    type_cache: HashMap<String, Kind>,
    /// Track types currently being resolved to detect circular references
    resolving_stack: HashSet<String>,
    /// Names for which a cycle placeholder was emitted, in order
    placeholders: Vec<String>,
    /// Structs whose fields are being parsed, innermost last; `Self` names the last one
    enclosing: Vec<String>,
}

/// Serde container-level `rename_all` rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    pub fn parse(rule: &str) -> Option<Self> {
        match rule {
            "lowercase" => Some(Self::Lower),
            "UPPERCASE" => Some(Self::Upper),
            "PascalCase" => Some(Self::Pascal),
            "camelCase" => Some(Self::Camel),
            "snake_case" => Some(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnake),
            "kebab-case" => Some(Self::Kebab),
            "SCREAMING-KEBAB-CASE" => Some(Self::ScreamingKebab),
            _ => None,
        }
    }

    /// Rename a field (`snake_case`) or variant (`PascalCase`) identifier.
    pub fn apply(self, ident: &str) -> String {
        let words = split_words(ident);
        match self {
            Self::Lower => ident.to_lowercase(),
            Self::Upper => ident.to_uppercase(),
            Self::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            Self::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
                .collect(),
            Self::Snake => words.join("_"),
            Self::ScreamingSnake => words.join("_").to_uppercase(),
            Self::Kebab => words.join("-"),
            Self::ScreamingKebab => words.join("-").to_uppercase(),
        }
    }
}

/// Lowercase words of an identifier, split on `_` and on case changes.
fn split_words(ident: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in ident.chars() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Serde attributes of a field or variant
#[derive(Debug, Clone, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    rename_all: Option<RenameRule>,
    /// Whether the field is never serialized
    skip: bool,
    flatten: bool,
}

/// Documentation and validation annotations gathered from a field
#[derive(Debug, Clone, Default)]
struct FieldAnnotations {
    /// Validate tokens in declaration order
    rules: Vec<String>,
    doc: Option<String>,
    description: Option<String>,
    example: Option<String>,
    format: Option<String>,
    default: Option<String>,
}

impl FieldAnnotations {
    fn into_tags(self, format_hint: Option<&str>) -> FieldTags {
        FieldTags {
            validate: if self.rules.is_empty() {
                None
            } else {
                Some(self.rules.join(","))
            },
            description: self.description.or(self.doc),
            example: self.example,
            format: self.format.or_else(|| format_hint.map(str::to_string)),
            default: self.default,
        }
    }
}

impl TypeResolver {
    /// Create a new TypeResolver with parsed files
    pub fn new(parsed_files: Vec<ParsedFile>) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());
        Self {
            parsed_files,
            type_cache: HashMap::new(),
            resolving_stack: HashSet::new(),
            placeholders: Vec::new(),
            enclosing: Vec::new(),
        }
    }

    /// Find a struct definition by name across all parsed files
    pub fn find_struct_definition(&self, name: &str) -> Option<&syn::ItemStruct> {
        self.parsed_files
            .iter()
            .flat_map(|file| file.syntax_tree.items.iter())
            .find_map(|item| match item {
                syn::Item::Struct(item_struct) if item_struct.ident == name => Some(item_struct),
                _ => None,
            })
    }

    /// Find an enum definition by name across all parsed files
    pub fn find_enum_definition(&self, name: &str) -> Option<&syn::ItemEnum> {
        self.parsed_files
            .iter()
            .flat_map(|file| file.syntax_tree.items.iter())
            .find_map(|item| match item {
                syn::Item::Enum(item_enum) if item_enum.ident == name => Some(item_enum),
                _ => None,
            })
    }

    /// Parse a Rust type expression such as `Vec<UserDto>` and resolve it.
    pub fn kind_from_type_expr(&mut self, expr: &str) -> Result<Kind> {
        let ty: syn::Type = syn::parse_str(expr)?;
        Ok(self.kind_of(&ty))
    }

    /// Resolve a user-defined type by name
    pub fn resolve_type(&mut self, type_name: &str) -> Option<Kind> {
        debug!("Resolving type: {}", type_name);

        // Check cache first
        if let Some(cached) = self.type_cache.get(type_name) {
            debug!("Type {} found in cache", type_name);
            return Some(cached.clone());
        }

        // A reference back to a type being resolved becomes a field-less
        // placeholder; the schema registry turns it into a `$ref`.
        if self.resolving_stack.contains(type_name) {
            debug!("Circular reference detected for type: {}", type_name);
            self.placeholders.push(type_name.to_string());
            return Some(Kind::Object(TypeDescriptor::named(type_name)));
        }

        let item = if let Some(item_struct) = self.find_struct_definition(type_name) {
            syn::Item::Struct(item_struct.clone())
        } else if let Some(item_enum) = self.find_enum_definition(type_name) {
            syn::Item::Enum(item_enum.clone())
        } else {
            return None;
        };

        self.resolving_stack.insert(type_name.to_string());
        let first_placeholder = self.placeholders.len();

        let kind = match &item {
            syn::Item::Struct(item_struct) => self.parse_struct_definition(item_struct),
            syn::Item::Enum(item_enum) => Self::parse_enum_definition(item_enum),
            _ => Kind::Unknown(type_name.to_string()),
        };

        self.resolving_stack.remove(type_name);

        // A result holding a placeholder for a type that is still open would
        // be incomplete outside of that type, so it is not cached.
        let complete = self.placeholders[first_placeholder..]
            .iter()
            .all(|name| !self.resolving_stack.contains(name));
        if complete {
            self.type_cache.insert(type_name.to_string(), kind.clone());
        }

        Some(kind)
    }

    /// Map a `syn::Type` onto a kind
    pub fn kind_of(&mut self, ty: &syn::Type) -> Kind {
        match ty {
            syn::Type::Path(type_path) => self.kind_of_path(&type_path.path),
            syn::Type::Reference(reference) => self.kind_of(&reference.elem),
            syn::Type::Paren(paren) => self.kind_of(&paren.elem),
            syn::Type::Group(group) => self.kind_of(&group.elem),
            syn::Type::Slice(slice) => Kind::array(self.kind_of(&slice.elem)),
            syn::Type::Array(array) => Kind::array(self.kind_of(&array.elem)),
            _ => {
                debug!("Unsupported type expression, documenting as string");
                Kind::Unknown("Unknown".to_string())
            }
        }
    }

    fn kind_of_path(&mut self, path: &syn::Path) -> Kind {
        let Some(segment) = path.segments.last() else {
            return Kind::Unknown("Unknown".to_string());
        };
        let mut type_name = segment.ident.to_string();
        let generic_args = type_arguments(segment);

        if type_name == "Self" {
            match self.enclosing.last() {
                Some(enclosing) => type_name = enclosing.clone(),
                None => {
                    warn!("`Self` used outside of a struct definition, documenting as string");
                    return Kind::Unknown(type_name);
                }
            }
        }

        if let Some(primitive) = PrimitiveType::from_rust_name(&type_name) {
            return Kind::Primitive(primitive);
        }

        match (type_name.as_str(), generic_args.first()) {
            ("Option", Some(inner)) => Kind::optional(self.kind_of(inner)),
            ("Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet", Some(inner)) => {
                Kind::array(self.kind_of(inner))
            }
            ("Box" | "Arc" | "Rc" | "Cow", Some(inner)) => self.kind_of(inner),
            ("HashMap" | "BTreeMap" | "Value" | "Map", _) => Kind::Map,
            ("DateTime" | "NaiveDateTime" | "SystemTime" | "OffsetDateTime", _) => Kind::DateTime,
            ("Uuid", _) => Kind::Primitive(PrimitiveType::String),
            _ => match self.resolve_type(&type_name) {
                Some(kind) => kind,
                None => {
                    warn!("Could not resolve type: {}, documenting as string", type_name);
                    Kind::Unknown(type_name)
                }
            },
        }
    }

    /// Parse a struct definition into a kind
    fn parse_struct_definition(&mut self, item_struct: &syn::ItemStruct) -> Kind {
        let struct_name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", struct_name);

        self.enclosing.push(struct_name.clone());
        let kind = match &item_struct.fields {
            syn::Fields::Named(named_fields) => {
                let container = parse_serde_attributes(&item_struct.attrs);
                let mut descriptor = TypeDescriptor::named(struct_name);
                for field in &named_fields.named {
                    self.parse_field(field, container.rename_all, &mut descriptor);
                }
                debug!("Parsed {} fields", descriptor.fields.len());
                Kind::Object(descriptor)
            }
            // Newtypes serialize as their inner value
            syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                self.kind_of(&unnamed.unnamed[0].ty)
            }
            _ => Kind::Object(TypeDescriptor::named(struct_name)),
        };
        self.enclosing.pop();

        kind
    }

    /// Parse an enum definition into a kind. Only unit-only enums have a
    /// string representation; data-carrying enums are documented as free-form
    /// objects.
    fn parse_enum_definition(item_enum: &syn::ItemEnum) -> Kind {
        debug!("Parsing enum definition: {}", item_enum.ident);

        if item_enum
            .variants
            .iter()
            .any(|variant| !matches!(variant.fields, syn::Fields::Unit))
        {
            debug!("Enum {} carries data", item_enum.ident);
            return Kind::Map;
        }

        let container = parse_serde_attributes(&item_enum.attrs);
        let variants: Vec<String> = item_enum
            .variants
            .iter()
            .filter_map(|variant| {
                let attrs = parse_serde_attributes(&variant.attrs);
                if attrs.skip {
                    return None;
                }
                Some(serialized_name(&variant.ident, &attrs, container.rename_all))
            })
            .collect();

        debug!("Parsed {} variants", variants.len());
        Kind::Enum(variants)
    }

    /// Parse a single field into the descriptor
    fn parse_field(
        &mut self,
        field: &syn::Field,
        rename_all: Option<RenameRule>,
        descriptor: &mut TypeDescriptor,
    ) {
        let Some(ident) = field.ident.as_ref() else {
            return;
        };

        let serde_attrs = parse_serde_attributes(&field.attrs);
        if serde_attrs.skip {
            debug!("Skipping field {} (serde skip)", ident);
            return;
        }

        let kind = self.kind_of(&field.ty);

        if serde_attrs.flatten {
            if let Kind::Object(inner) = &kind {
                debug!("Flattening {} fields of {}", inner.fields.len(), inner.name);
                descriptor.fields.extend(inner.fields.iter().cloned());
                return;
            }
        }

        let name = serialized_name(ident, &serde_attrs, rename_all);
        let tags = parse_field_annotations(&field.attrs).into_tags(format_hint(&field.ty));

        descriptor.fields.push(FieldDescriptor { name, kind, tags });
    }
}

/// Type arguments of a path segment, ignoring lifetimes and const arguments
fn type_arguments(segment: &syn::PathSegment) -> Vec<&syn::Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Format implied by the type itself (e.g. `Uuid`)
fn format_hint(ty: &syn::Type) -> Option<&'static str> {
    match ty {
        syn::Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            match segment.ident.to_string().as_str() {
                "Uuid" => Some("uuid"),
                "Box" | "Arc" | "Rc" => format_hint(type_arguments(segment).first()?),
                _ => None,
            }
        }
        syn::Type::Reference(reference) => format_hint(&reference.elem),
        _ => None,
    }
}

fn serialized_name(ident: &syn::Ident, attrs: &SerdeAttributes, rename_all: Option<RenameRule>) -> String {
    if let Some(rename) = &attrs.rename {
        return rename.clone();
    }
    let raw = ident.to_string();
    let raw = raw.strip_prefix("r#").unwrap_or(&raw);
    match rename_all {
        Some(rule) => rule.apply(raw),
        None => raw.to_string(),
    }
}

/// Parse Serde attributes from item, field or variant attributes
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(syn::Token![=]) {
                    serde_attrs.rename = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else {
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            serde_attrs.rename = Some(inner.value()?.parse::<syn::LitStr>()?.value());
                            Ok(())
                        } else {
                            skip_meta_value(&inner)
                        }
                    })?;
                }
            } else if meta.path.is_ident("rename_all") {
                let rule = meta.value()?.parse::<syn::LitStr>()?.value();
                serde_attrs.rename_all = RenameRule::parse(&rule);
                if serde_attrs.rename_all.is_none() {
                    warn!("Unsupported serde rename_all rule: {}", rule);
                }
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                debug!("Found serde skip");
                serde_attrs.skip = true;
            } else if meta.path.is_ident("flatten") {
                serde_attrs.flatten = true;
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        });

        if let Err(e) = parsed {
            debug!("Ignoring unparseable serde attribute: {}", e);
        }
    }

    serde_attrs
}

/// Consume the value of a nested meta item we do not interpret
fn skip_meta_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta_value(&inner))?;
    }
    Ok(())
}

/// Render a literal-ish expression (`2`, `-1`, `0.5`, `"x"`, `true`) as text
fn expr_to_string(expr: &syn::Expr) -> Option<String> {
    match expr {
        syn::Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Str(s) => Some(s.value()),
            syn::Lit::Int(i) => Some(i.base10_digits().to_string()),
            syn::Lit::Float(f) => Some(f.base10_digits().to_string()),
            syn::Lit::Bool(b) => Some(b.value.to_string()),
            _ => None,
        },
        syn::Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => expr_to_string(expr).map(|value| format!("-{}", value)),
        _ => None,
    }
}

fn meta_text(meta: &syn::meta::ParseNestedMeta) -> syn::Result<Option<String>> {
    let expr: syn::Expr = meta.value()?.parse()?;
    Ok(expr_to_string(&expr))
}

/// Gather doc comments, `#[validate(..)]` and `#[openapi(..)]` annotations
fn parse_field_annotations(attrs: &[syn::Attribute]) -> FieldAnnotations {
    let mut annotations = FieldAnnotations::default();
    let mut doc_lines = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("doc") {
            if let syn::Meta::NameValue(name_value) = &attr.meta {
                if let Some(line) = expr_to_string(&name_value.value) {
                    doc_lines.push(line.trim().to_string());
                }
            }
        } else if attr.path().is_ident("validate") {
            if let Err(e) = attr.parse_nested_meta(|meta| parse_validate_rule(&meta, &mut annotations.rules)) {
                debug!("Ignoring unparseable validate attribute: {}", e);
            }
        } else if attr.path().is_ident("openapi") {
            if let Err(e) = attr.parse_nested_meta(|meta| parse_openapi_item(&meta, &mut annotations)) {
                debug!("Ignoring unparseable openapi attribute: {}", e);
            }
        }
    }

    let doc = doc_lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !doc.is_empty() {
        annotations.doc = Some(doc);
    }

    annotations
}

/// Translate one validator-style rule into validate tokens
fn parse_validate_rule(meta: &syn::meta::ParseNestedMeta, rules: &mut Vec<String>) -> syn::Result<()> {
    let path = &meta.path;

    if path.is_ident("required") || path.is_ident("email") || path.is_ident("url") {
        if let Some(ident) = path.get_ident() {
            rules.push(ident.to_string());
        }
        skip_meta_value(meta)
    } else if path.is_ident("length") || path.is_ident("range") {
        meta.parse_nested_meta(|bound| {
            let token = if bound.path.is_ident("min") {
                "min"
            } else if bound.path.is_ident("max") {
                "max"
            } else {
                return skip_meta_value(&bound);
            };
            if let Some(value) = meta_text(&bound)? {
                rules.push(format!("{}={}", token, value));
            }
            Ok(())
        })
    } else {
        skip_meta_value(meta)
    }
}

/// Handle one `key = "value"` item of an `#[openapi(..)]` attribute
fn parse_openapi_item(meta: &syn::meta::ParseNestedMeta, annotations: &mut FieldAnnotations) -> syn::Result<()> {
    let Some(key) = meta.path.get_ident().map(|ident| ident.to_string()) else {
        return skip_meta_value(meta);
    };

    match key.as_str() {
        "validate" | "example" | "format" | "default" | "one_of" | "description" => {}
        _ => return skip_meta_value(meta),
    }

    let Some(value) = meta_text(meta)? else {
        return Ok(());
    };

    match key.as_str() {
        "validate" => annotations.rules.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        ),
        "one_of" => annotations.rules.push(format!("oneof={}", value)),
        "example" => annotations.example = Some(value),
        "format" => annotations.format = Some(value),
        "default" => annotations.default = Some(value),
        _ => annotations.description = Some(value),
    }
    Ok(())
}
