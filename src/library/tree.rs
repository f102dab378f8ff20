use super::{ActivityResolver, Library};
use crate::model::{Activity, ChildSlot};
use std::fmt;

/// Renders an activity and its nested children as an ASCII tree.
///
/// ```text
/// Make tea (urn:demo:tea) [node.execution.sequential / node.operator.and]
/// ├── 1. Boil water (urn:demo:boil) [node.execution.none / node.operator.none]
/// └── 2. Steep (urn:demo:steep) [node.execution.none / node.operator.none]
/// ```
///
/// Children under parallel execution carry no order number. A child that repeats one of
/// its ancestors is printed once and marked `<cycle>`; a URN missing from the library is
/// marked `<unresolved>`.
pub struct LibraryTree<'a> {
    library: &'a Library,
    root: &'a str,
}

impl<'a> LibraryTree<'a> {
    pub fn new(library: &'a Library, root: &'a str) -> Self {
        Self { library, root }
    }

    fn fmt_children(
        &self,
        parent: &'a Activity,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        ancestors: &mut Vec<&'a str>,
    ) -> fmt::Result {
        let children = parent.children();
        for (index, slot) in children.iter().enumerate() {
            let is_last = index + 1 == children.len();
            let node_marker = if is_last { "└── " } else { "├── " };
            write!(f, "{}{}", prefix, node_marker)?;

            let order = parent.order_for_id(&slot.id);
            if order > 0 {
                write!(f, "{}. ", order)?;
            }

            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            match self.library.resolve(&slot.urn) {
                None => writeln!(f, "{} ({}) <unresolved>", slot.label(), slot.urn)?,
                Some(_) if ancestors.contains(&slot.urn.as_str()) => {
                    writeln!(f, "{} ({}) <cycle>", slot.label(), slot.urn)?
                }
                Some(child) => {
                    write_node(f, child, Some(slot))?;
                    ancestors.push(child.urn());
                    self.fmt_children(child, f, &child_prefix, ancestors)?;
                    ancestors.pop();
                }
            }
        }
        Ok(())
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, activity: &Activity, slot: Option<&ChildSlot>) -> fmt::Result {
    let label = slot
        .and_then(|s| s.name.as_deref())
        .unwrap_or(activity.name());
    write!(
        f,
        "{} ({}) [{} / {}]",
        label,
        activity.urn(),
        activity.execution(),
        activity.operator()
    )?;
    if slot.is_some_and(|s| s.iterable) {
        write!(f, " *")?;
    }
    writeln!(f)
}

impl fmt::Display for LibraryTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.library.resolve(self.root) else {
            return writeln!(f, "{} <unresolved>", self.root);
        };
        write_node(f, root, None)?;
        let mut ancestors = vec![root.urn()];
        self.fmt_children(root, f, "", &mut ancestors)
    }
}
