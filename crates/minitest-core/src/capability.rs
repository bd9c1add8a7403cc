//! Member introspection.
//!
//! Objects describe their own members and the objects they delegate to.
//! Lookups walk the delegation chain depth-first; the first member found
//! under a name shadows any later one.

use std::collections::HashSet;

/// A named member of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Whether the member can be invoked.
    pub callable: bool,
}

impl Member {
    /// Creates a callable member.
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callable: true,
        }
    }

    /// Creates a non-callable member.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callable: false,
        }
    }
}

/// Something that exposes named members, directly or through delegation.
pub trait Capabilities {
    /// Label used in failure messages.
    fn label(&self) -> String {
        "object".to_string()
    }

    /// Members declared directly on this object, in declaration order.
    fn own_members(&self) -> Vec<Member>;

    /// Objects this one delegates to, in lookup order.
    fn delegates(&self) -> Vec<&dyn Capabilities> {
        Vec::new()
    }

    /// Every reachable member, own members first, each name once.
    fn members(&self) -> Vec<Member> {
        let mut seen_names = HashSet::new();
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        collect(self.own_members(), self.delegates(), &mut seen_names, &mut visited, &mut out);
        out
    }

    /// Returns true if a callable member with this name is reachable.
    fn responds_to(&self, name: &str) -> bool {
        self.members()
            .iter()
            .any(|member| member.callable && member.name == name)
    }
}

fn collect(
    own: Vec<Member>,
    delegates: Vec<&dyn Capabilities>,
    seen_names: &mut HashSet<String>,
    visited: &mut HashSet<*const ()>,
    out: &mut Vec<Member>,
) {
    for member in own {
        if seen_names.insert(member.name.clone()) {
            out.push(member);
        }
    }
    for delegate in delegates {
        // Delegation graphs may share bases or loop; visit each object once.
        let addr = std::ptr::from_ref(delegate).cast::<()>();
        if visited.insert(addr) {
            collect(delegate.own_members(), delegate.delegates(), seen_names, visited, out);
        }
    }
}
