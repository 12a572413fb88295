//! Method descriptors and identifiers.
//!
//! A [`MethodDesc`] is the unit of interprocedural analysis: an opaque,
//! immutable identifier for a procedure plus the minimum metadata the
//! pipeline needs (package membership for the application boundary filter,
//! flags, and an optional body). Descriptors are supplied externally and
//! interned into a call graph, which assigns each one a stable [`MethodId`].

use std::fmt;

use bitflags::bitflags;

use crate::model::MethodBody;

/// A strongly-typed identifier for a method interned in a call graph.
///
/// `MethodId` wraps the method's index in the call graph's arena. All
/// analysis artifacts (reachability graphs, execution paths, CFGs, composite
/// paths) reference methods by id; the descriptor is resolved through the
/// owning [`CallGraph`](crate::callgraph::CallGraph) when display data is
/// needed.
///
/// # Thread Safety
///
/// `MethodId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(pub(crate) usize);

impl MethodId {
    /// Creates a new `MethodId` from a raw index value.
    ///
    /// Primarily intended for internal use and testing; normal usage obtains
    /// ids from [`CallGraph::add_method`](crate::callgraph::CallGraph::add_method).
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        MethodId(index)
    }

    /// Returns the raw 0-based arena index of this method identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({})", self.0)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

bitflags! {
    /// Modifier flags carried on a method descriptor.
    ///
    /// Only the modifiers the pipeline actually consults are modeled; the
    /// frontend may drop everything else.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u32 {
        /// Method is static (no receiver).
        const STATIC = 0x0001;
        /// Method is a constructor.
        const CONSTRUCTOR = 0x0002;
        /// Method was generated by the compiler (lambdas, access bridges).
        const SYNTHETIC = 0x0004;
        /// Method is abstract and can never have a body.
        const ABSTRACT = 0x0008;
        /// Method is implemented natively outside the analyzed code.
        const NATIVE = 0x0010;
    }
}

/// An immutable method descriptor.
///
/// Identifies one procedure by its declaring class and name, and carries the
/// optional [`MethodBody`] that Phase 2 analyses consume. Descriptors are
/// value objects: once interned into a call graph they are never mutated.
///
/// # Examples
///
/// ```rust
/// use sinktrace::model::{MethodDesc, MethodFlags};
///
/// let desc = MethodDesc::new("com.app.ui.MainActivity", "onCreate");
/// assert_eq!(desc.signature(), "com.app.ui.MainActivity::onCreate");
/// assert_eq!(desc.package(), "com.app.ui");
/// assert!(!desc.has_body());
/// assert!(!desc.flags().contains(MethodFlags::NATIVE));
/// ```
#[derive(Debug, Clone)]
pub struct MethodDesc {
    /// Fully qualified name of the declaring class.
    class_name: String,
    /// Simple method name within the class.
    name: String,
    /// Modifier flags.
    flags: MethodFlags,
    /// Analyzable body, when the frontend supplied one.
    body: Option<MethodBody>,
}

impl MethodDesc {
    /// Creates a new descriptor without a body.
    ///
    /// # Arguments
    ///
    /// * `class_name` - Fully qualified declaring class (e.g. `com.app.Repo`)
    /// * `name` - Simple method name (e.g. `load`)
    #[must_use]
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        MethodDesc {
            class_name: class_name.into(),
            name: name.into(),
            flags: MethodFlags::empty(),
            body: None,
        }
    }

    /// Sets the modifier flags, consuming and returning the descriptor.
    #[must_use]
    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attaches an analyzable body, consuming and returning the descriptor.
    #[must_use]
    pub fn with_body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the fully qualified name of the declaring class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the simple method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the modifier flags.
    #[must_use]
    pub const fn flags(&self) -> MethodFlags {
        self.flags
    }

    /// Returns the full signature in `Class::name` form.
    ///
    /// The signature is the interning key: two descriptors with the same
    /// signature denote the same method.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{}::{}", self.class_name, self.name)
    }

    /// Returns the package of the declaring class.
    ///
    /// Everything up to the last `.` of the class name; a class without a
    /// package yields the empty string.
    #[must_use]
    pub fn package(&self) -> &str {
        match self.class_name.rfind('.') {
            Some(idx) => &self.class_name[..idx],
            None => "",
        }
    }

    /// Returns `true` if the declaring class lives under the given package
    /// prefix.
    ///
    /// This is the sole admission filter for "is this an application method";
    /// anything outside the prefix is treated as an opaque framework or
    /// library boundary.
    #[must_use]
    pub fn is_in_package(&self, prefix: &str) -> bool {
        self.package().starts_with(prefix)
    }

    /// Returns `true` if this method has an analyzable body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Returns the method body, if one was supplied.
    #[must_use]
    pub const fn body(&self) -> Option<&MethodBody> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instruction, MethodBody};

    #[test]
    fn test_method_id_basics() {
        let id = MethodId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(format!("{id}"), "m7");
        assert_eq!(format!("{id:?}"), "MethodId(7)");
        assert!(MethodId::new(1) < MethodId::new(2));
    }

    #[test]
    fn test_signature_and_package() {
        let desc = MethodDesc::new("com.app.data.Repo", "load");
        assert_eq!(desc.signature(), "com.app.data.Repo::load");
        assert_eq!(desc.package(), "com.app.data");
        assert_eq!(desc.class_name(), "com.app.data.Repo");
        assert_eq!(desc.name(), "load");
    }

    #[test]
    fn test_default_package() {
        let desc = MethodDesc::new("Main", "run");
        assert_eq!(desc.package(), "");
        assert!(!desc.is_in_package("com.app"));
    }

    #[test]
    fn test_package_prefix_filter() {
        let desc = MethodDesc::new("com.app.ui.MainActivity", "onCreate");
        assert!(desc.is_in_package("com.app"));
        assert!(desc.is_in_package("com.app.ui"));
        assert!(!desc.is_in_package("com.other"));

        let framework = MethodDesc::new("android.util.Log", "d");
        assert!(!framework.is_in_package("com.app"));
    }

    #[test]
    fn test_flags_and_body() {
        let desc = MethodDesc::new("com.app.Repo", "init")
            .with_flags(MethodFlags::STATIC | MethodFlags::SYNTHETIC)
            .with_body(MethodBody::new(vec![Instruction::ret()]));

        assert!(desc.flags().contains(MethodFlags::STATIC));
        assert!(desc.flags().contains(MethodFlags::SYNTHETIC));
        assert!(!desc.flags().contains(MethodFlags::ABSTRACT));
        assert!(desc.has_body());
        assert_eq!(desc.body().unwrap().len(), 1);
    }
}
