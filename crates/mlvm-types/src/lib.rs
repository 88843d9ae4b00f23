//! Type system for the MLVM compiler framework.
//!
//! A [`TypeSystem`] owns the set of valid type names and a directed
//! implicit-cast graph over them. Pointer types are not pre-registered:
//! any registered name followed by one or more `*` is a valid pointer type,
//! synthesized on demand by [`TypeSystem::is_type_valid`].

mod error;

pub use error::TypeError;

use rustc_hash::{FxHashMap, FxHashSet};

/// Returns true if `name` matches `^[A-Za-z_][A-Za-z0-9_]*(\*)*$`.
fn is_well_formed(name: &str) -> bool {
    let base = name.trim_end_matches('*');
    if base.is_empty() {
        return false;
    }
    let mut chars = base.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strips trailing `*`s, returning the pointee base name.
fn base_name(name: &str) -> &str {
    name.trim_end_matches('*')
}

/// The built-in type names seeded into every new [`TypeSystem`].
pub const BUILTIN_TYPES: &[&str] = &[
    "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "float", "double",
    "pred", "address", "void",
];

/// Owns the registered type names and the implicit-cast lattice over them.
#[derive(Debug, Clone)]
pub struct TypeSystem {
    names: FxHashSet<String>,
    implicit_cast: FxHashMap<String, FxHashSet<String>>,
    implicit_cast_rev: FxHashMap<String, FxHashSet<String>>,
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem {
    /// Builds a type system seeded with [`BUILTIN_TYPES`] and the default
    /// implicit-cast lattice: widening within same-sign integers, `pred` to
    /// any integer, `float` to `double`, and every built-in integer to and
    /// from `address`.
    #[must_use]
    #[allow(clippy::expect_used, reason = "BUILTIN_TYPES entries are well-formed by construction")]
    pub fn new() -> Self {
        let mut system = Self {
            names: FxHashSet::default(),
            implicit_cast: FxHashMap::default(),
            implicit_cast_rev: FxHashMap::default(),
        };
        for name in BUILTIN_TYPES {
            system.add_type(name).expect("builtin type names are well-formed");
        }
        system.seed_default_lattice();
        system
    }

    /// Registers a base type name. Idempotent. Pointer types are never
    /// registered directly; they are derived from a registered pointee.
    ///
    /// # Errors
    /// Returns [`TypeError::InvalidTypeName`] if `name` is not of the form
    /// `^[A-Za-z_][A-Za-z0-9_]*$` (pointer stars are rejected here; callers
    /// should register the pointee, not the pointer form).
    pub fn add_type(&mut self, name: &str) -> Result<(), TypeError> {
        if name.ends_with('*') || !is_well_formed(name) {
            return Err(TypeError::InvalidTypeName(name.to_string()));
        }
        self.names.insert(name.to_string());
        Ok(())
    }

    /// True iff `t` is a registered base type, or a chain of `*` over one.
    #[must_use]
    pub fn is_type_valid(&self, t: &str) -> bool {
        if !is_well_formed(t) {
            return false;
        }
        self.names.contains(base_name(t))
    }

    /// True iff `from` can be implicitly cast to `to`: identical types always
    /// coerce; otherwise the pair must be a registered lattice edge.
    #[must_use]
    pub fn can_implicit_cast(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        self.implicit_cast
            .get(from)
            .is_some_and(|successors| successors.contains(to))
    }

    /// Adds implicit-cast edges, validating every endpoint and maintaining
    /// transitive closure: for `src -> dst`, every type that already reaches
    /// `src` also gains a direct edge to `dst`.
    ///
    /// Because the graph is maintained as transitively closed after every
    /// call, the reverse-adjacency set of `src` already contains exactly the
    /// types that can reach it, so one pass over it (plus `src` itself)
    /// suffices; no further recursion is needed.
    ///
    /// # Errors
    /// Returns [`TypeError::InvalidTypeName`] for the first endpoint (source
    /// or destination) that is not [`is_type_valid`](Self::is_type_valid).
    pub fn update_implicit_cast<'a, I>(&mut self, edges: I) -> Result<(), TypeError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (src, dst) in edges {
            self.add_cast_edge(src, dst)?;
        }
        Ok(())
    }

    fn add_cast_edge(&mut self, src: &str, dst: &str) -> Result<(), TypeError> {
        if !self.is_type_valid(src) {
            return Err(TypeError::InvalidTypeName(src.to_string()));
        }
        if !self.is_type_valid(dst) {
            return Err(TypeError::InvalidTypeName(dst.to_string()));
        }

        let predecessors: Vec<String> = self
            .implicit_cast_rev
            .get(src)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        self.insert_edge(src, dst);
        for pred in predecessors {
            self.insert_edge(&pred, dst);
        }
        Ok(())
    }

    fn insert_edge(&mut self, src: &str, dst: &str) {
        self.implicit_cast
            .entry(src.to_string())
            .or_default()
            .insert(dst.to_string());
        self.implicit_cast_rev
            .entry(dst.to_string())
            .or_default()
            .insert(src.to_string());
    }

    #[allow(clippy::expect_used, reason = "builtin lattice edges are registered above")]
    fn seed_default_lattice(&mut self) {
        let signed = ["int8", "int16", "int32", "int64"];
        let unsigned = ["uint8", "uint16", "uint32", "uint64"];

        for family in [signed.as_slice(), unsigned.as_slice()] {
            for (i, narrow) in family.iter().enumerate() {
                for wider in &family[i + 1..] {
                    self.add_cast_edge(narrow, wider)
                        .expect("builtin integer names are registered");
                }
            }
        }

        for int_ty in signed.iter().chain(unsigned.iter()) {
            self.add_cast_edge("pred", int_ty)
                .expect("builtin pred/int names are registered");
        }

        self.add_cast_edge("float", "double")
            .expect("builtin float/double names are registered");

        for int_ty in signed.iter().chain(unsigned.iter()) {
            self.add_cast_edge(int_ty, "address")
                .expect("builtin int/address names are registered");
            self.add_cast_edge("address", int_ty)
                .expect("builtin int/address names are registered");
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_registered() {
        let ts = TypeSystem::new();
        for name in BUILTIN_TYPES {
            assert!(ts.is_type_valid(name), "{name} should be valid");
        }
    }

    #[test]
    fn pointer_chains_are_valid_without_registration() {
        let ts = TypeSystem::new();
        assert!(ts.is_type_valid("int32*"));
        assert!(ts.is_type_valid("int32**"));
        assert!(!ts.is_type_valid("bogus*"));
    }

    #[test]
    fn rejects_malformed_names() {
        let ts = TypeSystem::new();
        assert!(!ts.is_type_valid(""));
        assert!(!ts.is_type_valid("1int"));
        assert!(!ts.is_type_valid("int 32"));
    }

    #[test]
    fn add_type_rejects_pointer_forms() {
        let mut ts = TypeSystem::new();
        assert_eq!(
            ts.add_type("foo*"),
            Err(TypeError::InvalidTypeName("foo*".to_string()))
        );
    }

    #[test]
    fn same_type_always_coerces() {
        let ts = TypeSystem::new();
        assert!(ts.can_implicit_cast("int32", "int32"));
        assert!(ts.can_implicit_cast("bogus", "bogus"));
    }

    #[test]
    fn widening_within_signed_family() {
        let ts = TypeSystem::new();
        assert!(ts.can_implicit_cast("int8", "int16"));
        assert!(ts.can_implicit_cast("int8", "int64"));
        assert!(!ts.can_implicit_cast("int64", "int8"));
    }

    #[test]
    fn signed_and_unsigned_families_do_not_cross() {
        let ts = TypeSystem::new();
        assert!(!ts.can_implicit_cast("int8", "uint8"));
        assert!(!ts.can_implicit_cast("uint8", "int8"));
    }

    #[test]
    fn pred_widens_to_any_integer() {
        let ts = TypeSystem::new();
        assert!(ts.can_implicit_cast("pred", "int8"));
        assert!(ts.can_implicit_cast("pred", "uint64"));
    }

    #[test]
    fn float_widens_to_double_only() {
        let ts = TypeSystem::new();
        assert!(ts.can_implicit_cast("float", "double"));
        assert!(!ts.can_implicit_cast("double", "float"));
    }

    #[test]
    fn integers_cast_both_ways_with_address() {
        let ts = TypeSystem::new();
        assert!(ts.can_implicit_cast("int32", "address"));
        assert!(ts.can_implicit_cast("address", "int32"));
    }

    #[test]
    fn custom_edges_propagate_through_existing_predecessors() {
        let mut ts = TypeSystem::new();
        ts.add_type("handle").unwrap();
        ts.update_implicit_cast([("pred", "handle")]).unwrap();
        // pred already reaches every builtin integer; since handle is now a
        // direct successor of pred, pred -> handle holds, but unrelated
        // integers must not gain a spurious edge to handle.
        assert!(ts.can_implicit_cast("pred", "handle"));
        assert!(!ts.can_implicit_cast("int8", "handle"));

        ts.update_implicit_cast([("int8", "pred")]).unwrap();
        // int8 now reaches pred, which reaches handle, so closure must give
        // int8 -> handle directly.
        assert!(ts.can_implicit_cast("int8", "handle"));
        assert!(!ts.can_implicit_cast("int8", "uint8"));
    }

    #[test]
    fn update_implicit_cast_rejects_invalid_endpoints() {
        let mut ts = TypeSystem::new();
        assert_eq!(
            ts.update_implicit_cast([("bogus", "int8")]),
            Err(TypeError::InvalidTypeName("bogus".to_string()))
        );
        assert_eq!(
            ts.update_implicit_cast([("int8", "bogus")]),
            Err(TypeError::InvalidTypeName("bogus".to_string()))
        );
    }
}
