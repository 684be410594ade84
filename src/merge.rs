//! Tree merge engine
//!
//! Merges one description request into a symbol document by finding or
//! creating the chain `Producer → Scope → Target` and appending a
//! description leaf under the target.
//!
//! Members (methods and property accessors) need disambiguation because the
//! external tool may already have recorded the same element under a broader
//! scope. Scopes are tried in this order, first match wins:
//!
//! | Match                    | Scope reference resolves to                          | type-scoped | accessor |
//! |--------------------------|------------------------------------------------------|-------------|----------|
//! | `DeclaringType`          | the element's declaring type                         | yes         | no       |
//! | `Element`                | the element itself                                   | no          | no       |
//! | `PropertyTarget`         | a property, explicit target naming the element       | yes         | yes      |
//! | `PropertyAccessorTarget` | a property, leaf naming the element, explicit target | yes         | yes      |
//! | `PropertyAccessor`       | a property, leaf naming the element, implicit target | no          | yes      |
//!
//! Type-scoped scopes hold one explicit target per element; narrow scopes
//! hold a single implicit target. Types, properties-as-declarations and
//! fields skip disambiguation entirely and use the single implicit target of
//! the scope keyed by the element itself.
//!
//! Every fallible step (key rendering, reserving fresh ids) runs before the
//! tree is touched, so a rejected request leaves the document unchanged.

use serde::Serialize;

use crate::document::{
    Element, LEAF, LEAF_ACCESSOR, LEAF_ORDINAL, LEAF_SEMANTIC, LEAF_SOURCE, LEAF_TEXT, PRODUCER,
    PRODUCER_REF, SCOPE, SCOPE_REF, SCOPE_TOKEN, TARGET, TARGET_REF,
};
use crate::error::Result;
use crate::signature::{is_property_key, AccessorKind, FieldRef, MethodRef, PropertyRef, TypeRef};
use crate::symbols::{format_bare, format_literal, reference_id, SymbolTable};

// FNV-1a constants for 64-bit hash
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Most fresh ids one request can consume: producer, scope, target, text
const IDS_PER_REQUEST: u64 = 4;

/// How a member request found its scope node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMatch {
    /// Scope names the element's declaring type
    DeclaringType,
    /// Scope names the element itself
    Element,
    /// Property scope with an explicit target naming the element
    PropertyTarget,
    /// Property scope with a leaf whose accessor names the element, under an
    /// implicit target
    PropertyAccessor,
    /// Same, with the leaf under an explicitly referenced target
    PropertyAccessorTarget,
    /// Scope names the explicitly supplied owning property
    Property,
    /// Scope keyed by a type, property or field declaration
    Declaration,
}

impl ScopeMatch {
    fn flags(self) -> ScopeFlags {
        let (type_scoped, accessor_of_property) = match self {
            Self::DeclaringType => (true, false),
            Self::Element | Self::Declaration => (false, false),
            Self::PropertyTarget | Self::PropertyAccessorTarget | Self::Property => (true, true),
            Self::PropertyAccessor => (false, true),
        };
        ScopeFlags {
            type_scoped,
            accessor_of_property,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScopeFlags {
    type_scoped: bool,
    accessor_of_property: bool,
}

/// What a single merge touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub created_producer: bool,
    pub created_scope: bool,
    pub created_target: bool,
    /// How the scope was found, or what a created scope stands for
    pub scope_match: ScopeMatch,
}

/// Applies requests to one document root, sharing one symbol table
pub struct Merger<'a> {
    root: &'a mut Element,
    table: &'a mut SymbolTable,
}

impl<'a> Merger<'a> {
    pub fn new(root: &'a mut Element, table: &'a mut SymbolTable) -> Self {
        Self { root, table }
    }

    /// Attach a description to a method or accessor.
    pub fn merge_method(
        &mut self,
        producer: &TypeRef,
        method: &MethodRef,
        description: &str,
    ) -> Result<MergeOutcome> {
        let producer_key = producer.key()?;
        let element_key = method.key()?;
        let declaring_key = method.declaring_type.key()?;
        self.table.reserve(IDS_PER_REQUEST)?;

        let (producer_index, created_producer) =
            find_or_create_producer(self.root, self.table, &producer_key)?;
        let producer_node = self.root.child_mut(producer_index);
        let producer_id = producer_id(self.table, producer_node, &producer_key);

        let (scope_index, scope_match, created_scope) =
            match find_member_scope(producer_node, self.table, &declaring_key, &element_key) {
                Some((index, found)) => (index, found, false),
                None => {
                    let index = create_scope(producer_node, self.table, &element_key)?;
                    (index, ScopeMatch::Element, true)
                }
            };

        let created_target = attach_member_leaf(
            producer_node.child_mut(scope_index),
            self.table,
            MemberLeaf {
                element_key: &element_key,
                accessor_kind: method.accessor_kind(),
                flags: scope_match.flags(),
                producer_id: producer_id.as_deref(),
                description,
            },
        )?;

        Ok(MergeOutcome {
            created_producer,
            created_scope,
            created_target,
            scope_match,
        })
    }

    /// Attach a description to a property accessor whose owning property is known.
    ///
    /// The property's own scope is preferred over a scope keyed by the
    /// accessor; a missing scope is created for the property.
    pub fn merge_property_accessor(
        &mut self,
        producer: &TypeRef,
        property: &PropertyRef,
        accessor: &MethodRef,
        description: &str,
    ) -> Result<MergeOutcome> {
        let producer_key = producer.key()?;
        let property_key = property.key()?;
        let element_key = accessor.key()?;
        self.table.reserve(IDS_PER_REQUEST)?;

        let (producer_index, created_producer) =
            find_or_create_producer(self.root, self.table, &producer_key)?;
        let producer_node = self.root.child_mut(producer_index);
        let producer_id = producer_id(self.table, producer_node, &producer_key);

        let found = {
            let table = &*self.table;
            producer_node
                .position(SCOPE, |scope| scope_refers_to(table, scope, &property_key))
                .map(|index| (index, ScopeMatch::Property))
                .or_else(|| {
                    producer_node
                        .position(SCOPE, |scope| scope_refers_to(table, scope, &element_key))
                        .map(|index| (index, ScopeMatch::Element))
                })
        };
        let (scope_index, scope_match, created_scope) = match found {
            Some((index, found)) => (index, found, false),
            None => {
                let index = create_scope(producer_node, self.table, &property_key)?;
                (index, ScopeMatch::Property, true)
            }
        };

        let created_target = attach_member_leaf(
            producer_node.child_mut(scope_index),
            self.table,
            MemberLeaf {
                element_key: &element_key,
                accessor_kind: accessor.accessor_kind(),
                flags: scope_match.flags(),
                producer_id: producer_id.as_deref(),
                description,
            },
        )?;

        Ok(MergeOutcome {
            created_producer,
            created_scope,
            created_target,
            scope_match,
        })
    }

    /// Attach a description to a whole type.
    pub fn merge_type(
        &mut self,
        producer: &TypeRef,
        ty: &TypeRef,
        description: &str,
    ) -> Result<MergeOutcome> {
        self.merge_declaration(&producer.key()?, &ty.key()?, description)
    }

    /// Attach a description to a property declaration.
    pub fn merge_property(
        &mut self,
        producer: &TypeRef,
        property: &PropertyRef,
        description: &str,
    ) -> Result<MergeOutcome> {
        self.merge_declaration(&producer.key()?, &property.key()?, description)
    }

    /// Attach a description to a field.
    pub fn merge_field(
        &mut self,
        producer: &TypeRef,
        field: &FieldRef,
        description: &str,
    ) -> Result<MergeOutcome> {
        self.merge_declaration(&producer.key()?, &field.key()?, description)
    }

    /// Single-slot merge: scope keyed by the element, first implicit target.
    fn merge_declaration(
        &mut self,
        producer_key: &str,
        element_key: &str,
        description: &str,
    ) -> Result<MergeOutcome> {
        self.table.reserve(IDS_PER_REQUEST)?;

        let (producer_index, created_producer) =
            find_or_create_producer(self.root, self.table, producer_key)?;
        let producer_node = self.root.child_mut(producer_index);

        let found = {
            let table = &*self.table;
            producer_node.position(SCOPE, |scope| scope_refers_to(table, scope, element_key))
        };
        let (scope_index, created_scope) = match found {
            Some(index) => (index, false),
            None => (create_scope(producer_node, self.table, element_key)?, true),
        };
        let scope = producer_node.child_mut(scope_index);

        let (target_index, created_target) = match scope.position(TARGET, is_implicit_target) {
            Some(index) => (index, false),
            None => (scope.push_element(Element::new(TARGET)), true),
        };

        let text = format_literal(&self.table.generate_id()?, description);
        scope
            .child_mut(target_index)
            .push_element(Element::new(LEAF).with_attr(LEAF_TEXT, text));

        Ok(MergeOutcome {
            created_producer,
            created_scope,
            created_target,
            scope_match: ScopeMatch::Declaration,
        })
    }
}

// ============================================================================
// Node resolution
// ============================================================================

fn refers_to(table: &SymbolTable, raw: Option<&str>, key: &str) -> bool {
    raw.and_then(|raw| table.resolve_key(raw)) == Some(key)
}

fn scope_refers_to(table: &SymbolTable, scope: &Element, key: &str) -> bool {
    refers_to(table, scope.attr(SCOPE_REF), key)
}

fn is_property_scope(table: &SymbolTable, scope: &Element) -> bool {
    scope
        .attr(SCOPE_REF)
        .and_then(|raw| table.resolve_key(raw))
        .is_some_and(is_property_key)
}

fn is_implicit_target(target: &Element) -> bool {
    target.attr(TARGET_REF).map_or(true, str::is_empty)
}

fn find_or_create_producer(
    root: &mut Element,
    table: &mut SymbolTable,
    producer_key: &str,
) -> Result<(usize, bool)> {
    let found = {
        let table = &*table;
        root.position(PRODUCER, |producer| {
            refers_to(table, producer.attr(PRODUCER_REF), producer_key)
        })
    };
    match found {
        Some(index) => Ok((index, false)),
        None => {
            tracing::debug!("Creating producer node for {}", producer_key);
            let reference = table.reference(producer_key)?;
            let index = root.push_element(Element::new(PRODUCER).with_attr(PRODUCER_REF, reference));
            Ok((index, true))
        }
    }
}

/// Id used for `Source`: first table id for the key, else the node's own id
fn producer_id(table: &SymbolTable, producer: &Element, producer_key: &str) -> Option<String> {
    table
        .resolve_id(producer_key)
        .or_else(|| producer.attr(PRODUCER_REF).and_then(reference_id))
        .map(str::to_string)
}

fn find_member_scope(
    producer: &Element,
    table: &SymbolTable,
    declaring_key: &str,
    element_key: &str,
) -> Option<(usize, ScopeMatch)> {
    if let Some(index) =
        producer.position(SCOPE, |scope| scope_refers_to(table, scope, declaring_key))
    {
        return Some((index, ScopeMatch::DeclaringType));
    }

    if let Some(index) = producer.position(SCOPE, |scope| scope_refers_to(table, scope, element_key))
    {
        return Some((index, ScopeMatch::Element));
    }

    if let Some(index) = producer.position(SCOPE, |scope| {
        is_property_scope(table, scope)
            && scope
                .elements_named(TARGET)
                .any(|target| refers_to(table, target.attr(TARGET_REF), element_key))
    }) {
        return Some((index, ScopeMatch::PropertyTarget));
    }

    let names_accessor = |target: &Element| {
        target
            .elements_named(LEAF)
            .any(|leaf| refers_to(table, leaf.attr(LEAF_ACCESSOR), element_key))
    };
    let index = producer.position(SCOPE, |scope| {
        is_property_scope(table, scope) && scope.elements_named(TARGET).any(names_accessor)
    })?;
    let explicit = producer
        .element_at(index)
        .and_then(|scope| scope.elements_named(TARGET).find(|&target| names_accessor(target)))
        .is_some_and(|target| !is_implicit_target(target));
    let found = if explicit {
        ScopeMatch::PropertyAccessorTarget
    } else {
        ScopeMatch::PropertyAccessor
    };
    Some((index, found))
}

fn create_scope(producer: &mut Element, table: &mut SymbolTable, key: &str) -> Result<usize> {
    tracing::debug!("Creating scope node for {}", key);
    let reference = table.reference(key)?;
    Ok(producer.push_element(
        Element::new(SCOPE)
            .with_attr(SCOPE_REF, reference)
            .with_attr(SCOPE_TOKEN, scope_token(key)),
    ))
}

/// Informational scope token: FNV-1a of the key
fn scope_token(key: &str) -> String {
    let mut hash = FNV_OFFSET;
    for byte in key.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{:016x}", hash)
}

// ============================================================================
// Member targets and leaves
// ============================================================================

struct MemberLeaf<'k> {
    element_key: &'k str,
    accessor_kind: Option<AccessorKind>,
    flags: ScopeFlags,
    producer_id: Option<&'k str>,
    description: &'k str,
}

/// Resolve the target under `scope` and append the leaf. Returns whether the
/// target was created.
fn attach_member_leaf(
    scope: &mut Element,
    table: &mut SymbolTable,
    leaf: MemberLeaf<'_>,
) -> Result<bool> {
    let ScopeFlags {
        type_scoped,
        accessor_of_property,
    } = leaf.flags;

    let found = {
        let table = &*table;
        scope
            .position(TARGET, |target| {
                refers_to(table, target.attr(TARGET_REF), leaf.element_key)
            })
            .or_else(|| {
                if type_scoped {
                    None
                } else {
                    scope.position(TARGET, is_implicit_target)
                }
            })
    };
    let (target_index, created_target) = match found {
        Some(index) => (index, false),
        None => {
            let mut target = Element::new(TARGET);
            if type_scoped {
                target.set_attr(TARGET_REF, table.reference(leaf.element_key)?);
            }
            (scope.push_element(target), true)
        }
    };
    let target = scope.child_mut(target_index);

    // Accessor naming overrides whatever the scope match implied
    let accessor_of_property = accessor_of_property || leaf.accessor_kind.is_some();

    let text = format_literal(&table.generate_id()?, leaf.description);
    let mut node = Element::new(LEAF).with_attr(LEAF_TEXT, text);

    if accessor_of_property {
        // Only ids the document already carried, never one minted above
        if let Some(id) = table.known_id(leaf.element_key) {
            node.set_attr(LEAF_ACCESSOR, format_bare(id));
        }
        if let Some(kind) = leaf.accessor_kind {
            node.set_attr(LEAF_SEMANTIC, kind.as_str());
        }
        // Ordinals are only inherited under type-scoped targets
        if type_scoped {
            if let Some(ordinal) = target
                .elements_named(LEAF)
                .find_map(|sibling| sibling.attr(LEAF_ORDINAL))
            {
                let ordinal = ordinal.to_string();
                node.set_attr(LEAF_ORDINAL, ordinal);
            }
        }
    } else if let Some(id) = leaf.producer_id {
        node.set_attr(LEAF_SOURCE, format_bare(id));
    }

    target.push_element(node);
    Ok(created_target)
}
