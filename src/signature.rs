//! Canonical keys for program elements
//!
//! Every node reference in a symbol document ultimately names a key string.
//! Keys are the merge identity: two requests land on the same node exactly
//! when their elements render to the same key.
//!
//! # Grammar
//!
//! ```text
//! Type      T:<Namespace>.<Outer>+<Inner>{Arg1,Arg2}[]
//! Method    M:<TypeBody>::<Name>(<Arg1>,<Arg2>)
//!           M:<ReturnBody> <TypeBody>::<Name>(...)     (return-qualified)
//! Property  P:<TypeBody>::<Name>()
//! Field     F:<TypeBody>::<Name>
//! ```
//!
//! `TypeBody` is a type key without its `T:` prefix. Generic arity suffixes
//! (`` List`1 ``) are stripped, constructor names (`.ctor`, `.cctor`) are
//! rewritten to `#ctor` / `#cctor`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymweaveError};

/// Prefix of type keys
pub const TYPE_SIGIL: &str = "T:";
/// Prefix of method keys
pub const METHOD_SIGIL: &str = "M:";
/// Prefix of property keys
pub const PROPERTY_SIGIL: &str = "P:";
/// Prefix of field keys
pub const FIELD_SIGIL: &str = "F:";

/// Reserved token replacing instance constructor names
pub const CONSTRUCTOR_TOKEN: &str = "#ctor";
/// Reserved token replacing static constructor names
pub const STATIC_CONSTRUCTOR_TOKEN: &str = "#cctor";

// ============================================================================
// Element model
// ============================================================================

/// A (possibly nested, generic or array) type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Dotted namespace; ignored for nested types
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Simple name, optionally carrying an arity suffix (`Dictionary`2`)
    pub name: String,

    /// Enclosing type for nested types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<Box<TypeRef>>,

    /// Generic arguments, rendered in braces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_args: Vec<TypeRef>,

    /// Number of `[]` suffixes
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_depth: u8,
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

impl TypeRef {
    /// Create a top-level, non-generic type
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            declaring_type: None,
            generic_args: Vec::new(),
            array_depth: 0,
        }
    }

    /// Create a type nested inside `outer`
    pub fn nested(outer: TypeRef, name: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            name: name.into(),
            declaring_type: Some(Box::new(outer)),
            generic_args: Vec::new(),
            array_depth: 0,
        }
    }

    /// Attach generic arguments
    pub fn with_generic_args(mut self, args: Vec<TypeRef>) -> Self {
        self.generic_args = args;
        self
    }

    /// Wrap in one more array dimension
    pub fn array_of(mut self) -> Self {
        self.array_depth += 1;
        self
    }

    /// Key body without the `T:` sigil
    pub fn body(&self) -> Result<String> {
        let name = checked_name(&self.name, "type")?;
        let mut out = match &self.declaring_type {
            Some(outer) => format!("{}+", outer.body()?),
            None if self.namespace.is_empty() => String::new(),
            None => format!("{}.", self.namespace),
        };
        out.push_str(strip_arity(name));

        if !self.generic_args.is_empty() {
            let args = self
                .generic_args
                .iter()
                .map(TypeRef::body)
                .collect::<Result<Vec<_>>>()?;
            out.push('{');
            out.push_str(&args.join(","));
            out.push('}');
        }

        for _ in 0..self.array_depth {
            out.push_str("[]");
        }
        Ok(out)
    }

    /// Canonical key, e.g. `T:App.Models.Order`
    pub fn key(&self) -> Result<String> {
        Ok(format!("{}{}", TYPE_SIGIL, self.body()?))
    }
}

/// Kind of property accessor inferred from a method name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessorKind {
    Getter,
    Setter,
}

impl AccessorKind {
    /// Detect the accessor naming convention (`get_` / `set_`)
    pub fn from_method_name(name: &str) -> Option<Self> {
        if name.starts_with("get_") {
            Some(Self::Getter)
        } else if name.starts_with("set_") {
            Some(Self::Setter)
        } else {
            None
        }
    }

    /// Value written to the `Semantic` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Getter => "Getter",
            Self::Setter => "Setter",
        }
    }
}

impl std::fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A method, constructor or property accessor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
}

impl MethodRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<TypeRef>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_return_type(mut self, return_type: TypeRef) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Accessor kind implied by the method name, if any
    pub fn accessor_kind(&self) -> Option<AccessorKind> {
        AccessorKind::from_method_name(&self.name)
    }

    /// Canonical key, e.g. `M:App.Foo::Run(System.Int32)`
    pub fn key(&self) -> Result<String> {
        self.render(false)
    }

    /// Key with a leading return type body, e.g. `M:System.String App.Foo::Name()`
    pub fn key_with_return(&self) -> Result<String> {
        self.render(true)
    }

    fn render(&self, with_return: bool) -> Result<String> {
        let name = match checked_name(&self.name, "method")? {
            ".ctor" => CONSTRUCTOR_TOKEN,
            ".cctor" => STATIC_CONSTRUCTOR_TOKEN,
            other => other,
        };
        let args = self
            .parameters
            .iter()
            .map(TypeRef::body)
            .collect::<Result<Vec<_>>>()?;

        let mut out = String::from(METHOD_SIGIL);
        if with_return {
            if let Some(ret) = &self.return_type {
                out.push_str(&ret.body()?);
                out.push(' ');
            }
        }
        out.push_str(&format!(
            "{}::{}({})",
            self.declaring_type.body()?,
            name,
            args.join(",")
        ));
        Ok(out)
    }
}

/// A property declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    pub declaring_type: TypeRef,
    pub name: String,
}

impl PropertyRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
        }
    }

    /// Canonical key, e.g. `P:App.Foo::Value()`
    pub fn key(&self) -> Result<String> {
        let name = checked_name(&self.name, "property")?;
        Ok(format!(
            "{}{}::{}()",
            PROPERTY_SIGIL,
            self.declaring_type.body()?,
            name
        ))
    }
}

/// A field declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub declaring_type: TypeRef,
    pub name: String,
}

impl FieldRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
        }
    }

    /// Canonical key, e.g. `F:App.Foo::count`
    pub fn key(&self) -> Result<String> {
        let name = checked_name(&self.name, "field")?;
        Ok(format!(
            "{}{}::{}",
            FIELD_SIGIL,
            self.declaring_type.body()?,
            name
        ))
    }
}

/// Any element that has a canonical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementRef {
    Type(TypeRef),
    Method(MethodRef),
    Property(PropertyRef),
    Field(FieldRef),
}

impl ElementRef {
    pub fn key(&self) -> Result<String> {
        match self {
            Self::Type(t) => t.key(),
            Self::Method(m) => m.key(),
            Self::Property(p) => p.key(),
            Self::Field(f) => f.key(),
        }
    }
}

/// Whether `key` names a property
pub fn is_property_key(key: &str) -> bool {
    key.starts_with(PROPERTY_SIGIL)
}

fn checked_name<'a>(name: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return Err(SymweaveError::Signature {
            message: format!("invalid {} name {:?}", what, name),
        });
    }
    Ok(trimmed)
}

/// `List`1` -> `List`
fn strip_arity(name: &str) -> &str {
    match name.find('`') {
        Some(pos) => &name[..pos],
        None => name,
    }
}
