use std::fmt;

use crate::domain::assertion::{Check, PathAssertion};
use crate::domain::json_path::{JsonPath, Segment};
use crate::domain::value::Value;

/// What the pending path currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathContext {
    Root,
    Field,
    /// Named array holding only primitives.
    PrimitiveArray,
    /// Element of an array of primitives (`…[*]`).
    ArrayMember,
    /// Iterating the elements of an array that holds composites (`…[*]`).
    Iteration { nameless: bool, passing: bool },
}

/// A path still being extended. Finishing consumes it and yields a
/// [`PathAssertion`], so a finished path can never be extended again.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPath {
    path: JsonPath,
    context: PathContext,
}

impl PendingPath {
    pub fn root() -> Self {
        Self {
            path: JsonPath::root(),
            context: PathContext::Root,
        }
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    pub fn field(&self, name: &str) -> Self {
        Self::at(self.path.child(name), PathContext::Field)
    }

    pub fn array_field(&self, name: &str) -> Self {
        Self::at(self.path.child(name), PathContext::PrimitiveArray)
    }

    /// Generic iteration over an array of composites, either below field
    /// `name` or over the array at the current path.
    ///
    /// The array is nameless when it has no field of its own: the root, or an
    /// element of another array.
    pub fn array(&self, name: Option<&str>) -> Self {
        let owner = match name {
            Some(name) => self.path.child(name),
            None => self.path.clone(),
        };
        let nameless = !matches!(owner.last(), Some(Segment::Key(_)));
        Self::at(
            owner.wildcard(),
            PathContext::Iteration {
                nameless,
                passing: false,
            },
        )
    }

    /// Iteration over a homogeneous array of composites: every element is
    /// checked against the same schema path.
    pub fn iterate(&self) -> Self {
        Self::at(
            self.path.wildcard(),
            PathContext::Iteration {
                nameless: false,
                passing: true,
            },
        )
    }

    /// Elements of the array of primitives at the current path.
    pub fn element(&self) -> Self {
        Self::at(self.path.wildcard(), PathContext::ArrayMember)
    }

    /// The current iteration path, now treated as a single array member.
    pub fn as_member(&self) -> Self {
        Self::at(self.path.clone(), PathContext::ArrayMember)
    }

    pub fn is_root(&self) -> bool {
        self.context == PathContext::Root
    }

    pub fn is_iterating(&self) -> bool {
        matches!(self.context, PathContext::Iteration { .. })
    }

    pub fn is_nameless_iteration(&self) -> bool {
        matches!(self.context, PathContext::Iteration { nameless: true, .. })
    }

    pub fn is_member(&self) -> bool {
        self.context == PathContext::ArrayMember
    }

    /// True when the path addresses one concrete node rather than a wildcard.
    pub fn asserts_concrete_value(&self) -> bool {
        self.path.is_definite()
    }

    pub fn contains(self, value: Value) -> PathAssertion {
        self.finish(Check::Contains(value))
    }

    pub fn matches(self, pattern: impl Into<String>) -> PathAssertion {
        self.finish(Check::MatchesRegex(pattern.into()))
    }

    pub fn is_equal_to(self, value: Value) -> PathAssertion {
        self.finish(Check::Equals(value))
    }

    pub fn has_size(self, size: usize) -> PathAssertion {
        self.finish(Check::HasSize(size))
    }

    pub fn is_empty(self) -> PathAssertion {
        self.finish(Check::IsEmpty)
    }

    fn finish(self, check: Check) -> PathAssertion {
        PathAssertion::new(self.path, check)
    }

    fn at(path: JsonPath, context: PathContext) -> Self {
        Self { path, context }
    }
}

impl fmt::Display for PendingPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.path)
    }
}
